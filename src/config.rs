use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::utils::retry::RetryConfig;

// ============================================================================
// Storefront Configuration
// ============================================================================
//
// Every field has a default, so an empty file (or no file) is a valid config.
// `STOREFRONT_CONFIG` points at an optional TOML file.
//
// ============================================================================

pub const CONFIG_ENV_VAR: &str = "STOREFRONT_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub log_filter: LogFilter,
    pub timings: TimingConfig,
    pub catalog: CatalogConfig,
    pub routes: RouteConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogFilter(pub String);

impl Default for LogFilter {
    fn default() -> Self {
        Self("info,storefront=debug".to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between pressing "Add" and the cart commit
    pub add_to_cart_delay_ms: u64,
    /// How long the return confirmation stays up before resetting
    pub confirmation_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            add_to_cart_delay_ms: 600,
            confirmation_delay_ms: 3000,
        }
    }
}

impl TimingConfig {
    pub fn add_to_cart_delay(&self) -> Duration {
        Duration::from_millis(self.add_to_cart_delay_ms)
    }

    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_millis(self.confirmation_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub currency_symbol: String,
    pub retry: RetrySettings,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            retry: RetrySettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 2_000,
            multiplier: 2.0,
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        RetryConfig {
            max_attempts: settings.max_attempts,
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            multiplier: settings.multiplier,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub products: String,
    pub login: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            products: "/products".to_string(),
            login: "/login".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9090,
        }
    }
}

impl StorefrontConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `$STOREFRONT_CONFIG` when set, otherwise use defaults
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                message: "catalog.retry.max_attempts must be at least 1".to_string(),
            });
        }
        if self.catalog.retry.multiplier < 1.0 {
            return Err(ConfigError::Invalid {
                message: "catalog.retry.multiplier must be >= 1.0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_storefront_behaviour() {
        let config = StorefrontConfig::default();
        assert_eq!(config.timings.add_to_cart_delay(), Duration::from_millis(600));
        assert_eq!(config.timings.confirmation_delay(), Duration::from_millis(3000));
        assert_eq!(config.catalog.currency_symbol, "₹");
        assert_eq!(config.routes.products, "/products");
        assert_eq!(config.routes.login, "/login");
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = StorefrontConfig::from_toml_str("").unwrap();
        assert_eq!(config.timings.confirmation_delay_ms, 3000);
        assert_eq!(config.log_filter.0, "info,storefront=debug");
    }

    #[test]
    fn test_partial_override() {
        let config = StorefrontConfig::from_toml_str(
            r#"
            log_filter = "warn"

            [timings]
            confirmation_delay_ms = 1500

            [metrics]
            enabled = true
            port = 9100
            "#,
        )
        .unwrap();

        assert_eq!(config.log_filter.0, "warn");
        assert_eq!(config.timings.confirmation_delay_ms, 1500);
        assert_eq!(config.timings.add_to_cart_delay_ms, 600);
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.port, 9100);
    }

    #[test]
    fn test_zero_retry_attempts_is_invalid() {
        let err = StorefrontConfig::from_toml_str("[catalog.retry]\nmax_attempts = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let err = StorefrontConfig::from_toml_str("[timings\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_retry_settings_convert() {
        let retry = RetryConfig::from(&RetrySettings::default());
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.initial_delay, Duration::from_millis(100));
    }
}
