//! Intelligence reporting for honeypot sessions
//!
//! Consumes a session's full transcript and produces a structured
//! intelligence record (extracted account numbers, payment handles,
//! URLs) plus rendered artifacts: a JSON record, an HTML timeline and a
//! paginated printable document. Artifacts are keyed by session id and
//! overwritten on regeneration.

pub mod extract;
pub mod generator;
pub mod render;

pub use extract::{extract_accounts, extract_handles, extract_urls};
pub use generator::{IntelligenceReport, ReportGenerator};

use thiserror::Error;

/// Report errors
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
