//! Report generation and artifact persistence

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use honeypot_config::ReportConfig;
use honeypot_core::Turn;

use crate::extract::{extract_accounts, extract_handles, extract_urls};
use crate::render;
use crate::ReportError;

/// Structured intelligence record for one session
///
/// A snapshot of the session at generation time: history grows, so the
/// record is derived on demand, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelligenceReport {
    pub session_id: String,
    pub generated_at: DateTime<Utc>,
    pub total_messages: usize,
    pub bank_accounts: Vec<String>,
    pub upi_ids: Vec<String>,
    pub urls: Vec<String>,
    pub conversation: Vec<Turn>,
}

/// Report generator
///
/// Writes three artifacts per session id into the output directory,
/// overwriting prior ones: `<id>.json`, `<id>.html` and
/// `<id>.print.html`.
pub struct ReportGenerator {
    output_dir: PathBuf,
    page_size: usize,
}

impl ReportGenerator {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            output_dir: PathBuf::from(&config.output_dir),
            page_size: config.page_size,
        }
    }

    /// Build the intelligence record from a transcript, without I/O
    pub fn build(&self, session_id: &str, turns: &[Turn]) -> IntelligenceReport {
        let text = turns
            .iter()
            .map(|t| t.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        IntelligenceReport {
            session_id: session_id.to_string(),
            generated_at: Utc::now(),
            total_messages: turns.len(),
            bank_accounts: extract_accounts(&text),
            upi_ids: extract_handles(&text),
            urls: extract_urls(&text),
            conversation: turns.to_vec(),
        }
    }

    /// Build the record and persist all artifacts
    pub fn generate_and_save(
        &self,
        session_id: &str,
        turns: &[Turn],
    ) -> Result<IntelligenceReport, ReportError> {
        let report = self.build(session_id, turns);

        fs::create_dir_all(&self.output_dir).map_err(|e| ReportError::Io {
            path: self.output_dir.display().to_string(),
            source: e,
        })?;

        let json = serde_json::to_string_pretty(&report)?;
        self.write_artifact(&format!("{}.json", session_id), &json)?;

        let html = render::timeline_html(&report);
        self.write_artifact(&format!("{}.html", session_id), &html)?;

        let printable = render::printable_html(&report, self.page_size);
        self.write_artifact(&format!("{}.print.html", session_id), &printable)?;

        tracing::info!(
            session_id = %session_id,
            messages = report.total_messages,
            accounts = report.bank_accounts.len(),
            handles = report.upi_ids.len(),
            urls = report.urls.len(),
            "Report artifacts written"
        );

        Ok(report)
    }

    fn write_artifact(&self, name: &str, content: &str) -> Result<(), ReportError> {
        let path = self.output_dir.join(name);
        fs::write(&path, content).map_err(|e| ReportError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Artifact directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
