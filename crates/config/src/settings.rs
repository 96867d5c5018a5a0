//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{AgentConfig, ConfigError};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Dialogue engine configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Session lifecycle policy
    #[serde(default)]
    pub sessions: SessionConfig,

    /// Report artifact configuration
    #[serde(default)]
    pub report: ReportConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.history_window == 0 {
            return Err(ConfigError::InvalidValue {
                field: "agent.history_window".to_string(),
                message: "History window must be at least 1 turn".to_string(),
            });
        }

        if self.agent.detector_window == 0 {
            return Err(ConfigError::InvalidValue {
                field: "agent.detector_window".to_string(),
                message: "Detector window must be at least 1 message".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.agent.llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "agent.llm.temperature".to_string(),
                message: format!(
                    "Must be between 0.0 and 2.0, got {}",
                    self.agent.llm.temperature
                ),
            });
        }

        if self.agent.llm.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "agent.llm.timeout_secs".to_string(),
                message: "Generation timeout must be bounded and non-zero".to_string(),
            });
        }

        if self.sessions.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sessions.max_sessions".to_string(),
                message: "At least one session must be allowed".to_string(),
            });
        }

        if self.report.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "report.page_size".to_string(),
                message: "Printable page size must be at least 1 message".to_string(),
            });
        }

        // Strict environments must not run an open ingest surface
        if self.environment.is_strict() && !self.server.auth.enabled {
            return Err(ConfigError::InvalidValue {
                field: "server.auth.enabled".to_string(),
                message: "Authentication must be enabled outside development".to_string(),
            });
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS origin checking
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_port() -> u16 {
    8080
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            auth: AuthConfig::default(),
        }
    }
}

/// API key authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Enable authentication
    #[serde(default)]
    pub enabled: bool,

    /// Expected API key (Bearer token)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Path prefixes that bypass authentication
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_public_paths() -> Vec<String> {
    vec![
        "/health".to_string(),
        "/ready".to_string(),
        "/metrics".to_string(),
    ]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            public_paths: default_public_paths(),
        }
    }
}

/// Session lifecycle policy
///
/// The reference behavior retains sessions for the process lifetime;
/// an idle timeout of 0 keeps that behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum concurrent sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Idle timeout in seconds; 0 disables eviction
    #[serde(default)]
    pub idle_timeout_secs: u64,

    /// Cleanup task interval in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_max_sessions() -> usize {
    1000
}
fn default_cleanup_interval() -> u64 {
    300
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            idle_timeout_secs: 0,
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

/// Report artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory where artifacts are written
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Messages per page in the printable artifact
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_output_dir() -> String {
    "reports".to_string()
}
fn default_page_size() -> usize {
    25
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            page_size: default_page_size(),
        }
    }
}

/// Load settings from files and environment
///
/// Priority: env vars > config/{env} > config/default > defaults.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("HONEYPOT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.agent.history_window, 8);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_history_window_rejected() {
        let mut settings = Settings::default();
        settings.agent.history_window = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_strict_env_requires_auth() {
        let mut settings = Settings::default();
        settings.environment = RuntimeEnvironment::Production;
        settings.server.auth.enabled = false;
        assert!(settings.validate().is_err());

        settings.server.auth.enabled = true;
        settings.server.auth.api_key = Some("secret".to_string());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_unbounded_timeout_rejected() {
        let mut settings = Settings::default();
        settings.agent.llm.timeout_secs = 0;
        assert!(settings.validate().is_err());
    }
}
