//! Configuration management for the scam honeypot
//!
//! Supports loading configuration from:
//! - config files (`config/default`, `config/{env}`)
//! - Environment variables (HONEYPOT__ prefix, `__` separator)

pub mod agent;
pub mod settings;

pub use agent::{AgentConfig, LlmSettings};
pub use settings::{
    load_settings, AuthConfig, ReportConfig, RuntimeEnvironment, ServerConfig, SessionConfig,
    Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
