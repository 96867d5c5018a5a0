//! Scam honeypot engine
//!
//! The core of the honeypot:
//! - Signal classification (message -> intent category)
//! - Session-aware scam detection (the admission gate)
//! - Session store with per-session serialization and eviction policy
//! - Dialogue engine with tone escalation, hard-control override and
//!   deterministic fallbacks

pub mod detector;
pub mod engine;
pub mod script;
pub mod signals;
pub mod store;

pub use detector::ScamDetector;
pub use engine::DialogueEngine;
pub use script::{fallback_line, hard_refusal, tone_for_stage, GREETING_OPENER, MAX_STAGE};
pub use signals::{claims_identity_shift, classify, Category};
pub use store::{SessionHandle, SessionSnapshot, SessionStore};

use thiserror::Error;

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Session capacity reached ({0} sessions)")]
    Capacity(usize),

    #[error("Session error: {0}")]
    Session(String),
}
