use std::time::Duration;

use panel_logging::{panel_debug, panel_warn};
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::{
    ActionReply, BackendError, CrawlStatusReply, DataReply, FailureKind, IpDetailsData,
    IpOperation, JobEndpoint, ProxySettingsData, SubmitReply, TaskStatusReply,
};

const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Root of the admin panel, e.g. `http://127.0.0.1:8000/`.
    pub base_url: String,
    pub csrf_token: Option<String>,
    /// Raw `Cookie` header value carrying the session (and CSRF cookie).
    pub session_cookie: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/".to_string(),
            csrf_token: None,
            session_cookie: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("proxy-panel/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP surface of the admin backend.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn submit_job(&self, job: JobEndpoint) -> Result<SubmitReply, BackendError>;

    async fn check_task(&self, task_id: &str) -> Result<TaskStatusReply, BackendError>;

    async fn crawl_status(&self) -> Result<CrawlStatusReply, BackendError>;

    async fn ip_details(&self, server: &str) -> Result<DataReply<IpDetailsData>, BackendError>;

    async fn mutate_ip(
        &self,
        operation: IpOperation,
        server: &str,
    ) -> Result<ActionReply, BackendError>;

    async fn load_settings(&self) -> Result<DataReply<ProxySettingsData>, BackendError>;

    async fn save_settings(&self, settings: &ProxySettingsData)
        -> Result<ActionReply, BackendError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: BackendSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let base = parse_base_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base
            .join(path)
            .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    /// `<base><prefix><server>/`, with the server name percent-encoded as one segment.
    fn server_endpoint(&self, prefix: &str, server: &str) -> Result<Url, BackendError> {
        let mut url = self.endpoint(prefix)?;
        url.path_segments_mut()
            .map_err(|()| BackendError::new(FailureKind::InvalidUrl, "base url cannot be a base"))?
            .pop_if_empty()
            .push(server)
            .push("");
        Ok(url)
    }

    fn with_session(&self, request: RequestBuilder) -> RequestBuilder {
        match self.settings.session_cookie.as_deref() {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    fn post(&self, url: Url) -> RequestBuilder {
        let request = self.with_session(self.client.post(url));
        match self.settings.csrf_token.as_deref() {
            Some(token) => request.header(CSRF_HEADER, token),
            None => request,
        }
    }

    fn get(&self, url: Url) -> RequestBuilder {
        self.with_session(self.client.get(url))
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn submit_job(&self, job: JobEndpoint) -> Result<SubmitReply, BackendError> {
        let url = self.endpoint(job.path())?;
        let request = self.post(url).header(CONTENT_TYPE, "application/json");
        send_json(request).await
    }

    async fn check_task(&self, task_id: &str) -> Result<TaskStatusReply, BackendError> {
        let mut url = self.endpoint("check_task/")?;
        url.query_pairs_mut().append_pair("task_id", task_id);
        send_json(self.get(url)).await
    }

    async fn crawl_status(&self) -> Result<CrawlStatusReply, BackendError> {
        let url = self.endpoint("crawl_status/")?;
        send_json(self.get(url)).await
    }

    async fn ip_details(&self, server: &str) -> Result<DataReply<IpDetailsData>, BackendError> {
        let url = self.server_endpoint("ip_details/", server)?;
        send_json(self.get(url)).await
    }

    async fn mutate_ip(
        &self,
        operation: IpOperation,
        server: &str,
    ) -> Result<ActionReply, BackendError> {
        let url = self.server_endpoint(operation.path(), server)?;
        let request = self.post(url).header(CONTENT_TYPE, "application/json");
        send_json(request).await
    }

    async fn load_settings(&self) -> Result<DataReply<ProxySettingsData>, BackendError> {
        let url = self.endpoint("proxy_settings/")?;
        send_json(self.get(url)).await
    }

    async fn save_settings(
        &self,
        settings: &ProxySettingsData,
    ) -> Result<ActionReply, BackendError> {
        let url = self.endpoint("proxy_settings/")?;
        let request = self
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(settings_form(settings));
        send_json(request).await
    }
}

/// Encodes the settings the way the HTML form posts them (`on`/`off` switches).
pub fn settings_form(settings: &ProxySettingsData) -> String {
    let switch = |enabled: bool| if enabled { "on" } else { "off" };
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("crawler_interval", &settings.crawler_interval.to_string())
        .append_pair("score_interval", &settings.score_interval.to_string())
        .append_pair("min_score", &settings.min_score.to_string())
        .append_pair("captcha_retries", &settings.captcha_retries.to_string())
        .append_pair("auto_crawler", switch(settings.auto_crawler))
        .append_pair("auto_score", switch(settings.auto_score))
        .finish()
}

fn parse_base_url(raw: &str) -> Result<Url, BackendError> {
    let trimmed = raw.trim();
    // Without a trailing slash `join` would replace the last path segment.
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&normalized)
        .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(BackendError::new(
            FailureKind::InvalidUrl,
            format!("unsupported base url {normalized}"),
        ));
    }
    Ok(url)
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, BackendError> {
    let response = request.send().await.map_err(map_reqwest_error)?;

    let status = response.status();
    let url = response.url().clone();
    if !status.is_success() {
        panel_warn!("{} answered {}", url, status);
        return Err(BackendError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }

    let body = response.bytes().await.map_err(map_reqwest_error)?;
    panel_debug!("{} answered {} bytes", url, body.len());
    serde_json::from_slice(&body)
        .map_err(|err| BackendError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return BackendError::new(FailureKind::Decode, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}
