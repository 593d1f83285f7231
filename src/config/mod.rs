use std::path::PathBuf;
use std::time::Duration;
use std::{env, fs};

use serde::{Deserialize, Serialize};

use crate::routing::RoutingConfig;

pub mod error;

pub use error::{ConfigError, ConfigResult};

const CONFIG_PATH_ENV: &str = "DEPTROUTE_CONFIG";

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_advisory_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Connection string of the shared store. Absent means the cache runs
    /// process-local only.
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_advisory_base_url")]
    pub base_url: String,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_advisory_base_url(),
        }
    }
}

/// Deployment configuration: an optional TOML file overlaid by environment
/// variables. Nothing here is hard-coded at call sites; the engine receives
/// the loaded object at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub advisory: AdvisoryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            routing: RoutingConfig::default(),
            cache: CacheConfig::default(),
            advisory: AdvisoryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads the config file if present, overlays environment variables and
    /// validates the result.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.apply_overrides(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Environment variables take precedence over the file.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        if let Some(key) = var("GEMINI_API_KEY") {
            self.advisory.api_key = Some(key);
        }
        if let Some(url) = var("REDIS_URL") {
            self.cache.redis_url = Some(url);
        }
        if let Some(dir) = var("MODEL_DIR") {
            self.model_dir = PathBuf::from(dir);
        }
        if let Some(raw) = var("CONFIDENCE_THRESHOLD") {
            self.routing.confidence_threshold =
                raw.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "CONFIDENCE_THRESHOLD".to_string(),
                    value: raw,
                })?;
        }
        if let Some(raw) = var("CACHE_TTL_SECS") {
            self.cache.ttl_secs = raw.parse().map_err(|_| ConfigError::InvalidValue {
                field: "CACHE_TTL_SECS".to_string(),
                value: raw,
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.routing.confidence_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "confidence_threshold".to_string(),
                value: self.routing.confidence_threshold.to_string(),
            });
        }
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ttl_secs".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    fn config_path() -> ConfigResult<PathBuf> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| ConfigError::NoHomeDirectory)?;
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("deptroute");
        path.push("config.toml");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_name: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let mut config = AppConfig::default();
        config.apply_overrides(no_env).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.model_dir, PathBuf::from("models"));
        assert_eq!(config.cache.ttl_secs, 300);
        assert!(config.advisory.api_key.is_none());
        assert!((config.routing.confidence_threshold - 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_parses_full_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            model_dir = "/srv/models"

            [routing]
            confidence_threshold = 0.75
            max_input_chars = 4096

            [cache]
            redis_url = "redis://cache:6379/0"
            ttl_secs = 120

            [advisory]
            api_key = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.model_dir, PathBuf::from("/srv/models"));
        assert!((config.routing.confidence_threshold - 0.75).abs() < 1e-12);
        assert_eq!(
            config.cache.redis_url.as_deref(),
            Some("redis://cache:6379/0")
        );
        assert_eq!(config.cache.ttl(), Duration::from_secs(120));
        assert_eq!(config.advisory.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut env = HashMap::new();
        env.insert("GEMINI_API_KEY", "env-key");
        env.insert("REDIS_URL", "redis://other:6379/1");
        env.insert("MODEL_DIR", "/env/models");
        env.insert("CONFIDENCE_THRESHOLD", "0.5");
        env.insert("CACHE_TTL_SECS", "60");

        let mut config = AppConfig::from_toml_str("[advisory]\napi_key = \"file-key\"").unwrap();
        config
            .apply_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.advisory.api_key.as_deref(), Some("env-key"));
        assert_eq!(
            config.cache.redis_url.as_deref(),
            Some("redis://other:6379/1")
        );
        assert_eq!(config.model_dir, PathBuf::from("/env/models"));
        assert!((config.routing.confidence_threshold - 0.5).abs() < 1e-12);
        assert_eq!(config.cache.ttl_secs, 60);
    }

    #[test]
    fn test_unparseable_threshold_is_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(|name| {
                (name == "CONFIDENCE_THRESHOLD").then(|| "almost one".to_string())
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        let err = AppConfig::from_toml_str("[routing]\nconfidence_threshold = 1.2").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let err = AppConfig::from_toml_str("[cache]\nttl_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
