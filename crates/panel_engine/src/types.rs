use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Backend job endpoints that start a long-running task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobEndpoint {
    CrawlOnce,
    ScoreOnce,
}

impl JobEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            JobEndpoint::CrawlOnce => "crawl_once/",
            JobEndpoint::ScoreOnce => "score_once/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpOperation {
    Update,
    Delete,
}

impl IpOperation {
    pub fn path(self) -> &'static str {
        match self {
            IpOperation::Update => "update_ip/",
            IpOperation::Delete => "delete_ip/",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SubmitReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TaskStatusReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: String,
    /// Task result; only an object with an `error` string is meaningful here.
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TaskStatusReply {
    pub fn result_error(&self) -> Option<String> {
        self.result
            .as_ref()
            .and_then(|result| result.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct CrawlStatusReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Reply of endpoints that only report success or an error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ActionReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Reply of endpoints that return a `data` payload on success.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataReply<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct IpDetailsData {
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub isp: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub ping: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProxySettingsData {
    pub crawler_interval: i64,
    pub score_interval: i64,
    pub min_score: i64,
    #[serde(default = "default_captcha_retries")]
    pub captcha_retries: i64,
    #[serde(default)]
    pub auto_crawler: bool,
    #[serde(default)]
    pub auto_score: bool,
}

fn default_captcha_retries() -> i64 {
    5
}

/// Results delivered back from spawned backend requests.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    JobSubmitted {
        job: JobEndpoint,
        result: Result<SubmitReply, BackendError>,
    },
    TaskChecked {
        tag: u64,
        task_id: String,
        result: Result<TaskStatusReply, BackendError>,
    },
    CrawlStatus {
        result: Result<CrawlStatusReply, BackendError>,
    },
    IpDetails {
        server: String,
        result: Result<DataReply<IpDetailsData>, BackendError>,
    },
    IpMutated {
        operation: IpOperation,
        server: String,
        result: Result<ActionReply, BackendError>,
    },
    SettingsLoaded {
        result: Result<DataReply<ProxySettingsData>, BackendError>,
    },
    SettingsSaved {
        result: Result<ActionReply, BackendError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: FailureKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
        }
    }
}
