//! End-to-end tests for the ingest surface
//!
//! Exercises the full router with an in-process mock generation
//! backend: gating, persona replies, escalation, report artifacts,
//! session admin and authentication.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use honeypot_config::Settings;
use honeypot_llm::{FinishReason, GenerationResult, LlmBackend, LlmError, Message};
use honeypot_server::{create_router, AppState};

/// Benign opener corpus
const NORMAL_MESSAGES: &[&str] = &[
    "Hi",
    "Hello there",
    "How are you?",
    "Good morning",
    "Are you available today?",
];

/// Scam opener corpus; every entry carries a strong intent signal
const SCAM_MESSAGES: &[&str] = &[
    "Your bank account is blocked",
    "Share your UPI ID to unlock account",
    "Urgent action required",
    "Send money now please",
];

struct MockLlm;

#[async_trait]
impl LlmBackend for MockLlm {
    async fn generate(&self, _messages: &[Message]) -> Result<GenerationResult, LlmError> {
        Ok(GenerationResult {
            text: "generated reply".to_string(),
            tokens: 2,
            total_time_ms: 1,
            finish_reason: FinishReason::Stop,
        })
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

fn test_settings(report_dir: &std::path::Path) -> Settings {
    let mut settings = Settings::default();
    settings.report.output_dir = report_dir.display().to_string();
    settings
}

fn app_with_mock_llm(report_dir: &std::path::Path) -> Router {
    let llm: Arc<dyn LlmBackend> = Arc::new(MockLlm);
    create_router(AppState::with_llm(test_settings(report_dir), llm))
}

fn app_without_llm(report_dir: &std::path::Path) -> Router {
    create_router(AppState::new(test_settings(report_dir)))
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
    bearer: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

async fn ingest(
    app: &Router,
    session_id: &str,
    message: &str,
) -> (StatusCode, serde_json::Value) {
    request(
        app,
        "POST",
        "/api/ingest",
        Some(serde_json::json!({ "session_id": session_id, "message": message })),
        None,
    )
    .await
}

#[tokio::test]
async fn test_clean_messages_never_reach_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_mock_llm(dir.path());

    for (i, message) in NORMAL_MESSAGES.iter().enumerate() {
        let (status, body) = ingest(&app, &format!("clean-{}", i), message).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scam_detected"], false);
        assert!(body["reply"].is_null());
        assert_eq!(body["intelligence"], serde_json::json!({}));
    }

    // No sessions were created and nothing was written
    let (_, sessions) = request(&app, "GET", "/api/sessions", None, None).await;
    assert_eq!(sessions["count"], 0);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_scam_messages_are_engaged() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_mock_llm(dir.path());

    for (i, message) in SCAM_MESSAGES.iter().enumerate() {
        let (status, body) = ingest(&app, &format!("scam-{}", i), message).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scam_detected"], true);
        assert!(body["reply"].is_string());
        assert!(!body["reply"].as_str().unwrap().is_empty());
        assert_eq!(body["intelligence"]["total_messages"], 2);
    }

    let (_, sessions) = request(&app, "GET", "/api/sessions", None, None).await;
    assert_eq!(sessions["count"], SCAM_MESSAGES.len());
}

#[tokio::test]
async fn test_session_context_keeps_gate_open() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_mock_llm(dir.path());

    // No signal on its own
    let (_, body) = ingest(&app, "ctx", "Verify your KYC immediately").await;
    assert_eq!(body["scam_detected"], false);

    // Prime the session, then the same weak message gets gated in
    ingest(&app, "ctx", "Your bank account is blocked").await;
    let (_, body) = ingest(&app, "ctx", "Verify your KYC immediately").await;
    assert_eq!(body["scam_detected"], true);

    // A different session is unaffected
    let (_, body) = ingest(&app, "other", "Verify your KYC immediately").await;
    assert_eq!(body["scam_detected"], false);
}

#[tokio::test]
async fn test_escalation_reaches_hard_refusal() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_mock_llm(dir.path());

    // Two turns escalate the session to the hard-control stage
    let (_, first) = ingest(&app, "esc", "send money now").await;
    let (_, second) = ingest(&app, "esc", "transfer money fast").await;
    assert_eq!(first["reply"], "generated reply");
    assert_eq!(second["reply"], "generated reply");

    // Money ask at stage 2 gets the scripted refusal, not the generator
    let (_, third) = ingest(&app, "esc", "just pay now").await;
    assert_eq!(third["reply"], "I'm not sending money. Why are you asking?");

    let (_, session) = request(&app, "GET", "/api/sessions/esc", None, None).await;
    assert_eq!(session["is_scam"], true);
    assert_eq!(session["stage"], 3);
}

#[tokio::test]
async fn test_scripted_fallback_without_backend() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_without_llm(dir.path());

    let (status, body) = ingest(&app, "nofb", "send money now").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Why do you need money from me? What is this for?");
}

#[tokio::test]
async fn test_report_artifacts_and_retrieval() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_mock_llm(dir.path());

    let (_, body) = ingest(
        &app,
        "case",
        "Send money now to account 123456789012 or use alice@pay",
    )
    .await;
    assert_eq!(body["intelligence"]["bank_accounts"][0], "123456789012");
    assert_eq!(body["intelligence"]["upi_ids"][0], "alice@pay");

    for suffix in ["json", "html", "print.html"] {
        assert!(dir.path().join(format!("case.{}", suffix)).exists());
    }

    let (status, report) = request(&app, "GET", "/api/reports/case", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["session_id"], "case");
    assert_eq!(report["total_messages"], 2);

    let (status, _) = request(&app, "GET", "/api/reports/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_admin_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_mock_llm(dir.path());

    ingest(&app, "adm", "Your bank account is blocked").await;

    let (status, session) = request(&app, "GET", "/api/sessions/adm", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["session_id"], "adm");
    assert_eq!(session["message_count"], 2);

    let (status, _) = request(&app, "DELETE", "/api/sessions/adm", None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Deletion is the only thing that clears the flag
    let (status, _) = request(&app, "GET", "/api/sessions/adm", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_session_id_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_mock_llm(dir.path());

    let (status, _) = ingest(&app, "  ", "send money now").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_api_key_authentication() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = test_settings(dir.path());
    settings.server.auth.enabled = true;
    settings.server.auth.api_key = Some("test-key".to_string());
    let llm: Arc<dyn LlmBackend> = Arc::new(MockLlm);
    let app = create_router(AppState::with_llm(settings, llm));

    let payload = serde_json::json!({ "session_id": "a", "message": "hi" });

    let (status, _) = request(&app, "POST", "/api/ingest", Some(payload.clone()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(
        &app,
        "POST",
        "/api/ingest",
        Some(payload.clone()),
        Some("wrong-key"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&app, "POST", "/api/ingest", Some(payload), Some("test-key")).await;
    assert_eq!(status, StatusCode::OK);

    // Health stays public
    let (status, body) = request(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_mixed_traffic_sweep() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let dir = tempfile::tempdir().unwrap();
    let app = app_with_mock_llm(dir.path());
    let mut rng = StdRng::seed_from_u64(42);

    for round in 0..30 {
        let scam = rng.gen_bool(0.5);
        let id = format!("sweep-{}-{}", if scam { "s" } else { "n" }, round);
        let message = if scam {
            SCAM_MESSAGES[rng.gen_range(0..SCAM_MESSAGES.len())]
        } else {
            NORMAL_MESSAGES[rng.gen_range(0..NORMAL_MESSAGES.len())]
        };

        let (status, body) = ingest(&app, &id, message).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scam_detected"], scam, "message: {}", message);
    }
}
