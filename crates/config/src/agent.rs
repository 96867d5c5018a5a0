//! Dialogue engine configuration

use serde::{Deserialize, Serialize};

/// Dialogue engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// How many recent turns are handed to the generation capability
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// How many recent counterparty turns the scam detector inspects
    #[serde(default = "default_detector_window")]
    pub detector_window: usize,

    /// LLM settings for the free-text generation capability
    #[serde(default)]
    pub llm: LlmSettings,
}

fn default_history_window() -> usize {
    8
}

fn default_detector_window() -> usize {
    3
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            detector_window: default_detector_window(),
            llm: LlmSettings::default(),
        }
    }
}

/// Generation backend settings (serialized form)
///
/// The llm crate carries its own runtime `LlmConfig` with `Duration`
/// fields; this is the file/env-friendly shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Model name/ID
    #[serde(default = "default_model")]
    pub model: String,

    /// API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key (optional)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Temperature — higher favors more natural-sounding variability
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum retry attempts for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_model() -> String {
    "qwen2.5:7b-instruct-q4_K_M".to_string()
}
fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}
fn default_max_tokens() -> usize {
    120
}
fn default_temperature() -> f32 {
    0.9
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_max_retries() -> u32 {
    2
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}
