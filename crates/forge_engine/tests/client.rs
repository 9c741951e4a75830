use std::time::Duration;

use forge_engine::{
    Backend, BackendSettings, ClientError, ReqwestBackend, SubmitOutcome, SubmitRequest,
    TaskStatusKind,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> ReqwestBackend {
    ReqwestBackend::new(&BackendSettings {
        base_url: server.uri(),
        ..BackendSettings::default()
    })
    .expect("backend")
}

fn request() -> SubmitRequest {
    SubmitRequest {
        idea: "AI scheduling tool".to_string(),
        industry: "healthcare".to_string(),
    }
}

#[tokio::test]
async fn submit_posts_idea_and_returns_task() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_idea"))
        .and(body_json(json!({"idea": "AI scheduling tool", "industry": "healthcare"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "task_123",
            "status": "queued",
            "message": "Task created"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = backend_for(&server).submit(&request()).await.unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Accepted {
            task_id: "task_123".to_string()
        }
    );
}

#[tokio::test]
async fn submit_error_carries_backend_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_idea"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"detail": "Pipeline at capacity"})),
        )
        .mount(&server)
        .await;

    let err = backend_for(&server).submit(&request()).await.unwrap_err();
    assert_eq!(
        err,
        ClientError::HttpStatus {
            status: 503,
            message: Some("Pipeline at capacity".to_string()),
        }
    );
    assert_eq!(err.backend_message(), Some("Pipeline at capacity"));
}

#[tokio::test]
async fn results_with_and_without_manifest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/results/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "t1",
            "status": "completed",
            "manifest": {
                "manifest_id": "gtmforge_1",
                "assets": [
                    {"asset_id": "img_1", "asset_type": "image", "url": "https://x/1.png", "quality_score": 0.9},
                    {"asset_id": "deck_1", "asset_type": "deck", "url": "https://x/deck"}
                ],
                "total_assets": 2,
                "created_at": "2025-06-19T10:30:00Z"
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/results/t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "t2",
            "status": "failed",
            "error": "Veo timeout"
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let manifest = backend.results("t1").await.unwrap().manifest.expect("manifest");
    assert_eq!(manifest.manifest_id, "gtmforge_1");
    assert_eq!(manifest.assets.len(), 2);
    assert_eq!(manifest.assets[1].quality_score, None);

    let failed = backend.results("t2").await.unwrap();
    assert_eq!(failed.manifest, None);
    assert_eq!(failed.status.as_deref(), Some("failed"));
    assert_eq!(failed.error.as_deref(), Some("Veo timeout"));
}

#[tokio::test]
async fn results_not_ready_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/results/t3"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Task not completed yet"})),
        )
        .mount(&server)
        .await;

    let err = backend_for(&server).results("t3").await.unwrap_err();
    assert!(matches!(err, ClientError::HttpStatus { status: 400, .. }));
}

#[tokio::test]
async fn status_and_health_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "t1",
            "status": "running",
            "progress": 42.5,
            "current_stage": "media_generation",
            "created_at": "2025-06-19T10:30:00",
            "updated_at": "2025-06-19T10:31:00"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "timestamp": "2025-06-19T10:30:00",
            "active_tasks": 3
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let status = backend.task_status("t1").await.unwrap();
    assert_eq!(status.status, TaskStatusKind::Running);
    assert_eq!(status.current_stage, "media_generation");

    let health = backend.health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.active_tasks, Some(3));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"status": "healthy"})),
        )
        .mount(&server)
        .await;

    let backend = ReqwestBackend::new(&BackendSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..BackendSettings::default()
    })
    .unwrap();
    assert_eq!(backend.health().await.unwrap_err(), ClientError::Timeout);
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReqwestBackend::new(&BackendSettings {
        base_url: "not a url".to_string(),
        ..BackendSettings::default()
    })
    .unwrap_err();
    assert!(matches!(err, ClientError::InvalidUrl(_)));
}
