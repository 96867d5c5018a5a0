//! Honeypot server
//!
//! HTTP intake surface: authenticated message ingest, session admin,
//! report retrieval, health and metrics.

pub mod auth;
pub mod http;
pub mod metrics;
pub mod state;

pub use auth::auth_middleware;
pub use http::create_router;
pub use self::metrics::{init_metrics, record_ingest};
pub use state::AppState;

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session error: {0}")]
    Session(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Too many sessions")]
    Capacity,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<honeypot_engine::EngineError> for ServerError {
    fn from(err: honeypot_engine::EngineError) -> Self {
        match err {
            honeypot_engine::EngineError::Capacity(_) => ServerError::Capacity,
            honeypot_engine::EngineError::Session(msg) => ServerError::Session(msg),
        }
    }
}

impl From<ServerError> for axum::http::StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Session(_) => axum::http::StatusCode::NOT_FOUND,
            ServerError::Auth(_) => axum::http::StatusCode::UNAUTHORIZED,
            ServerError::Capacity => axum::http::StatusCode::SERVICE_UNAVAILABLE,
            ServerError::InvalidRequest(_) => axum::http::StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
