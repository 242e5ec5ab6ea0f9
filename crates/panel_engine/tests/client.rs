use std::sync::Arc;
use std::time::Duration;

use panel_engine::{
    Backend, BackendSettings, EngineCommand, EngineEvent, EngineHandle, FailureKind, IpOperation,
    JobEndpoint, ProxySettingsData, ReqwestBackend,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> ReqwestBackend {
    ReqwestBackend::new(BackendSettings {
        base_url: server.uri(),
        csrf_token: Some("tok123".to_string()),
        session_cookie: Some("sessionid=abc; csrftoken=tok123".to_string()),
        request_timeout: Duration::from_secs(2),
        ..BackendSettings::default()
    })
    .expect("backend")
}

#[tokio::test]
async fn submit_job_posts_with_csrf_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/crawl_once/"))
        .and(header("X-CSRFToken", "tok123"))
        .and(header("Cookie", "sessionid=abc; csrftoken=tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "task_id": "abc123",
            "message": "Crawl task started"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = backend_for(&server)
        .submit_job(JobEndpoint::CrawlOnce)
        .await
        .expect("submit ok");
    assert!(reply.success);
    assert_eq!(reply.task_id.as_deref(), Some("abc123"));
    assert_eq!(reply.message.as_deref(), Some("Crawl task started"));
}

#[tokio::test]
async fn check_task_sends_task_id_and_reads_result_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/check_task/"))
        .and(query_param("task_id", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": "FAILURE",
            "result": {"error": "proxy source unreachable"}
        })))
        .mount(&server)
        .await;

    let reply = backend_for(&server)
        .check_task("abc123")
        .await
        .expect("check ok");
    assert_eq!(reply.status, "FAILURE");
    assert_eq!(
        reply.result_error().as_deref(),
        Some("proxy source unreachable")
    );
}

#[tokio::test]
async fn crawl_status_decodes_optional_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crawl_status/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": "running",
            "message": "Crawling 3 sources"
        })))
        .mount(&server)
        .await;

    let reply = backend_for(&server).crawl_status().await.expect("status ok");
    assert_eq!(reply.status, "running");
    assert_eq!(reply.message, "Crawling 3 sources");
    assert_eq!(reply.details, None);
    assert_eq!(reply.task_id, None);
}

#[tokio::test]
async fn server_error_maps_to_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crawl_status/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = backend_for(&server).crawl_status().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn non_json_body_maps_to_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crawl_status/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = backend_for(&server).crawl_status().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn unreachable_backend_maps_to_network() {
    let backend = ReqwestBackend::new(BackendSettings {
        base_url: "http://127.0.0.1:1/".to_string(),
        connect_timeout: Duration::from_millis(200),
        request_timeout: Duration::from_millis(500),
        ..BackendSettings::default()
    })
    .expect("backend");

    let err = backend.crawl_status().await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::Network | FailureKind::Timeout));
}

#[tokio::test]
async fn ip_actions_target_server_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip_details/1.2.3.4:8080/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "server": "1.2.3.4:8080",
                "country": "NL",
                "score": 87.5,
                "ping": 120.0
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/delete_ip/1.2.3.4:8080/"))
        .and(header("X-CSRFToken", "tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let details = backend.ip_details("1.2.3.4:8080").await.expect("details");
    let data = details.data.expect("data");
    assert_eq!(data.country.as_deref(), Some("NL"));
    assert_eq!(data.score, Some(87.5));
    assert_eq!(data.city, None);

    let reply = backend
        .mutate_ip(IpOperation::Delete, "1.2.3.4:8080")
        .await
        .expect("delete");
    assert!(reply.success);
}

#[tokio::test]
async fn settings_round_trip_through_form_post() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/proxy_settings/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "crawler_interval": 60,
                "score_interval": 30,
                "min_score": 60,
                "auto_crawler": true,
                "auto_score": false
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/proxy_settings/"))
        .and(body_string(
            "crawler_interval=120&score_interval=30&min_score=60&captcha_retries=5&auto_crawler=on&auto_score=off",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let loaded = backend.load_settings().await.expect("load");
    let mut settings = loaded.data.expect("data");
    assert_eq!(settings.captcha_retries, 5);
    assert!(settings.auto_crawler);

    settings.crawler_interval = 120;
    let reply = backend.save_settings(&settings).await.expect("save");
    assert!(reply.success);
}

#[tokio::test]
async fn engine_reports_results_as_events() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/check_task/"))
        .and(query_param("task_id", "t-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": "STARTED"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/proxy_settings/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "min_score out of range"
        })))
        .mount(&server)
        .await;

    let (engine, mut events) = EngineHandle::new(Arc::new(backend_for(&server)));
    engine.dispatch(EngineCommand::CheckTask {
        tag: 4,
        task_id: "t-9".to_string(),
    });
    match events.recv().await.expect("event") {
        EngineEvent::TaskChecked {
            tag,
            task_id,
            result,
        } => {
            assert_eq!(tag, 4);
            assert_eq!(task_id, "t-9");
            assert_eq!(result.expect("reply").status, "STARTED");
        }
        other => panic!("unexpected event {other:?}"),
    }

    engine.dispatch(EngineCommand::SaveSettings(ProxySettingsData::default()));
    match events.recv().await.expect("event") {
        EngineEvent::SettingsSaved { result } => {
            let reply = result.expect("reply");
            assert!(!reply.success);
            assert_eq!(reply.error.as_deref(), Some("min_score out of range"));
        }
        other => panic!("unexpected event {other:?}"),
    }
}
