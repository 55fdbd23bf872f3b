//! Run configuration
//!
//! A run is configured from a TOML file whose sections all default, so an
//! empty file (or none) is valid. The management token never lives in the
//! file: it is read from `ENVSYNC_MANAGEMENT_TOKEN`, with a `.env` file in
//! the working directory honoured.

use std::fs;
use std::path::Path;

use envsync_core_types::Sensitive;
use serde::{Deserialize, Serialize};

use crate::errors::{config_invalid, io_error, Result};

/// Environment variable holding the management token
pub const TOKEN_ENV_VAR: &str = "ENVSYNC_MANAGEMENT_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub target: TargetSettings,
    pub retry: RetrySettings,
    pub timeouts: TimeoutSettings,
    pub logging: LoggingSettings,
}

/// Where `apply` writes to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSettings {
    pub base_url: String,
    pub space_id: Option<String>,
    pub environment_id: String,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.contentful.com".to_string(),
            space_id: None,
            environment_id: "master".to_string(),
        }
    }
}

/// Backoff for rate-limited calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

/// Per-phase time limits, in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    pub load_secs: u64,
    pub preflight_secs: u64,
    pub apply_secs: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            load_secs: 300,
            preflight_secs: 300,
            apply_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `development` or `production`
    pub profile: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            profile: "development".to_string(),
        }
    }
}

impl RunConfig {
    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// - `InvalidInput` on malformed TOML or out-of-range values
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RunConfig = toml::from_str(content)
            .map_err(|e| config_invalid(&format!("Config parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(config_invalid("retry.max_attempts must be at least 1"));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(config_invalid(
                "retry.base_delay_ms must not exceed retry.max_delay_ms",
            ));
        }
        if self.target.base_url.trim().is_empty() {
            return Err(config_invalid("target.base_url must not be empty"));
        }
        Ok(())
    }
}

/// Load a configuration file; `None` yields the defaults
///
/// # Errors
///
/// - `Io` when the file cannot be read
/// - `InvalidInput` when it does not parse
pub fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    match path {
        None => Ok(RunConfig::default()),
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|e| io_error("config_load", e))?;
            RunConfig::from_toml_str(&content)
        }
    }
}

/// Management token from the environment (or `.env`)
///
/// # Errors
///
/// - `InvalidInput` when the variable is unset or blank
pub fn management_token() -> Result<Sensitive<String>> {
    dotenvy::dotenv().ok();
    match std::env::var(TOKEN_ENV_VAR) {
        Ok(token) if !token.trim().is_empty() => Ok(Sensitive::new(token)),
        _ => Err(config_invalid(&format!(
            "{} is not set; export a management token to apply changes",
            TOKEN_ENV_VAR
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RunConfig::from_toml_str("").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.target.environment_id, "master");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = RunConfig::from_toml_str(
            r#"
            [target]
            space_id = "space-1"

            [timeouts]
            apply_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.target.space_id.as_deref(), Some("space-1"));
        assert_eq!(config.target.environment_id, "master");
        assert_eq!(config.timeouts.apply_secs, 60);
        assert_eq!(config.timeouts.load_secs, 300);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = RunConfig::from_toml_str("[retry]\nmax_attempts = 0\n").unwrap_err();
        assert!(err.message().contains("max_attempts"));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = RunConfig::from_toml_str("[retry]\nmax_attempts = \"many\"\n").unwrap_err();
        assert_eq!(err.op(), Some("config_load"));
    }
}
