//! HTTP endpoints
//!
//! REST API for the honeypot: message ingest, session admin, report
//! retrieval, health and metrics.

use std::time::Duration;

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::metrics::{metrics_handler, record_ingest, record_report, record_report_failure};
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let (cors_origins, cors_enabled) = {
        let config = state.config.read();
        (
            config.server.cors_origins.clone(),
            config.server.cors_enabled,
        )
    };
    let cors_layer = build_cors_layer(&cors_origins, cors_enabled);
    let config = state.config.clone();

    Router::new()
        // Intake
        .route("/api/ingest", post(ingest))
        // Session admin
        .route("/api/sessions", get(list_sessions))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id", delete(delete_session))
        // Reports
        .route("/api/reports/:id", get(get_report))
        // Health
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        // Middleware
        .layer(middleware::from_fn(auth_middleware))
        .layer(Extension(config))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns a permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000 for safety
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    if origins.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static("http://localhost:3000"))
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static("http://localhost:3000"))
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(true)
}

/// Ingest request
#[derive(Debug, Deserialize)]
struct IngestRequest {
    session_id: String,
    message: String,
}

/// Ingest response
#[derive(Debug, Serialize)]
struct IngestResponse {
    scam_detected: bool,
    reply: Option<String>,
    intelligence: serde_json::Value,
}

/// Ingest endpoint
///
/// Gate first: messages with no scam indication in this session are
/// acknowledged without ever reaching the dialogue engine. Indicated
/// ones get a persona reply, and the session's report artifacts are
/// regenerated after the turn.
async fn ingest(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, StatusCode> {
    if request.session_id.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let scam_detected =
        state
            .detector
            .is_scam_indicative(&state.store, &request.session_id, &request.message);
    record_ingest(scam_detected);

    if !scam_detected {
        tracing::debug!(session_id = %request.session_id, "No scam indication, engine not invoked");
        return Ok(Json(IngestResponse {
            scam_detected: false,
            reply: None,
            intelligence: serde_json::json!({}),
        }));
    }

    let reply = state
        .engine
        .respond(&request.session_id, &request.message)
        .await
        .map_err(|e| {
            tracing::error!(session_id = %request.session_id, "Engine error: {}", e);
            StatusCode::from(ServerError::from(e))
        })?;

    let turns = state.store.history(&request.session_id);
    let report = match state.reports.generate_and_save(&request.session_id, &turns) {
        Ok(report) => {
            record_report();
            report
        }
        Err(e) => {
            // The turn already happened; a failed write must not lose it
            record_report_failure();
            tracing::error!(session_id = %request.session_id, "Report persistence failed: {}", e);
            state.reports.build(&request.session_id, &turns)
        }
    };

    Ok(Json(IngestResponse {
        scam_detected: true,
        reply: Some(reply),
        intelligence: serde_json::to_value(&report).unwrap_or_default(),
    }))
}

/// Get session info
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let session = state.store.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let snapshot = session.snapshot();

    Ok(Json(serde_json::json!({
        "session_id": session.id,
        "stage": snapshot.stage,
        "is_scam": snapshot.is_scam,
        "message_count": snapshot.turns.len(),
    })))
}

/// Delete session
///
/// The only way a scam flag is ever cleared.
async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.store.reset(&id);
    StatusCode::NO_CONTENT
}

/// List sessions
async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.store.list();
    Json(serde_json::json!({
        "sessions": sessions,
        "count": sessions.len(),
    }))
}

/// Regenerate and return a session's intelligence report
async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<honeypot_report::IntelligenceReport>, StatusCode> {
    let session = state.store.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let turns = session.snapshot().turns;

    match state.reports.generate_and_save(&id, &turns) {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            tracing::error!(session_id = %id, "Report generation failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check
///
/// Probes the generation backend; a down backend degrades readiness but
/// the service still answers, on the scripted fallback path.
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let endpoint = state.config.read().agent.llm.endpoint.clone();
    let llm_reachable = probe_llm(&endpoint).await;

    Json(serde_json::json!({
        "status": if llm_reachable { "ready" } else { "degraded" },
        "llm_reachable": llm_reachable,
        "sessions": state.store.count(),
    }))
}

async fn probe_llm(endpoint: &str) -> bool {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
    {
        Ok(client) => client,
        Err(_) => return false,
    };

    match client.get(format!("{}/api/tags", endpoint)).send().await {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use honeypot_config::Settings;

    #[test]
    fn test_router_creation() {
        let state = AppState::new(Settings::default());
        let _ = create_router(state);
    }

    #[test]
    fn test_cors_layer_with_invalid_origin_falls_back() {
        let _ = build_cors_layer(&["not a header value\n".to_string()], true);
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&[], false);
    }
}
