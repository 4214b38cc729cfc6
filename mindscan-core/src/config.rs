//! Application configuration.
//!
//! Settings are read from an optional TOML file, every section falls back to
//! defaults, and a handful of environment variables override the result.

use crate::{ConfigError, SortMode};
use serde::Deserialize;
use std::path::Path;

pub const MAX_POST_LIMIT: u32 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub reddit: RedditConfig,
    pub inference: InferenceConfig,
    pub fetch: FetchConfig,
    pub export: ExportConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub base_url: String,
    /// Prefix prepended to every content URL. Empty disables the relay.
    pub cors_relay: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.reddit.com".to_string(),
            cors_relay: "https://corsproxy.io/?".to_string(),
            user_agent: concat!("mindscan/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub endpoint: String,
    pub api_name: String,
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:7860".to_string(),
            api_name: "predict".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub default_limit: u32,
    pub default_sort: SortMode,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            default_sort: SortMode::New,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_path: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: "reddit_analysis.pdf".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://mindscan.db?mode=rwc".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path` when given, otherwise start from defaults; then apply
    /// environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("MINDSCAN_INFERENCE_URL") {
            tracing::debug!("Inference endpoint overridden from environment");
            self.inference.endpoint = endpoint;
        }
        if let Some(url) = lookup("MINDSCAN_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(relay) = lookup("MINDSCAN_CORS_RELAY") {
            self.reddit.cors_relay = relay;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reddit.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "reddit.base_url".to_string(),
            });
        }
        if self.inference.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "inference.endpoint".to_string(),
            });
        }
        if self.inference.api_name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "inference.api_name".to_string(),
            });
        }
        if !(1..=MAX_POST_LIMIT).contains(&self.fetch.default_limit) {
            return Err(ConfigError::InvalidValue {
                field: "fetch.default_limit".to_string(),
                value: self.fetch.default_limit.to_string(),
            });
        }
        if self.reddit.timeout_secs == 0 || self.inference.timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "timeouts must be at least one second".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fetch.default_limit, 10);
        assert_eq!(config.fetch.default_sort, SortMode::New);
        assert_eq!(config.inference.api_name, "predict");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [inference]
            endpoint = "https://example.gradio.live"

            [fetch]
            default_sort = "top"
            "#,
        )
        .unwrap();

        assert_eq!(config.inference.endpoint, "https://example.gradio.live");
        assert_eq!(config.inference.api_name, "predict");
        assert_eq!(config.fetch.default_sort, SortMode::Top);
        assert_eq!(config.fetch.default_limit, 10);
        assert_eq!(config.reddit.cors_relay, "https://corsproxy.io/?");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let result = AppConfig::from_toml_str("[fetch\ndefault_limit = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MINDSCAN_INFERENCE_URL", "http://gpu-box:7860"),
            ("MINDSCAN_CORS_RELAY", ""),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.inference.endpoint, "http://gpu-box:7860");
        assert_eq!(config.reddit.cors_relay, "");
        assert_eq!(config.database.url, DatabaseConfig::default().url);
    }

    #[test]
    fn test_validation_rejects_bad_limit() {
        let mut config = AppConfig::default();
        config.fetch.default_limit = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        config.fetch.default_limit = MAX_POST_LIMIT + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_endpoint() {
        let mut config = AppConfig::default();
        config.inference.endpoint = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField { field }) if field == "inference.endpoint"
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = AppConfig::from_file(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }
}
