//! Configuration types.
//!
//! ```toml
//! [api]
//! url = "https://api.intersul.com.br"
//! timeout_secs = 10
//!
//! [app]
//! name = "Intersul"
//! environment = "production"
//!
//! [cache]
//! max_entries = 1000
//! cleanup_interval_secs = 60
//!
//! [storage]
//! data_dir = "~/.local/share/intersul"
//! ```
//!
//! # Environment Variables
//!
//! - `INTERSUL_API_URL` - Override `api.url`
//! - `INTERSUL_APP_NAME` - Override `app.name`
//! - `INTERSUL_ENV` - Override `app.environment` (`development`, `production`, `test`)

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Default application name.
pub const DEFAULT_APP_NAME: &str = "Intersul";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default upper bound on cached query results.
pub const DEFAULT_MAX_CACHE_ENTRIES: usize = 1_000;

pub const ENV_API_URL: &str = "INTERSUL_API_URL";
pub const ENV_APP_NAME: &str = "INTERSUL_APP_NAME";
pub const ENV_ENVIRONMENT: &str = "INTERSUL_ENV";

/// Root configuration.
///
/// Every section is optional in a file; accessors fall back to defaults so a
/// missing file behaves like an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<AppConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,
}

impl ConsoleConfig {
    /// Create an empty config (all defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: ConsoleConfig) {
        if other.api.is_some() {
            self.api = other.api;
        }
        if other.app.is_some() {
            self.app = other.app;
        }
        if other.cache.is_some() {
            self.cache = other.cache;
        }
        if other.storage.is_some() {
            self.storage = other.storage;
        }
    }

    /// Effective API settings.
    pub fn api(&self) -> ApiConfig {
        self.api.clone().unwrap_or_default()
    }

    /// Effective application settings.
    pub fn app(&self) -> AppConfig {
        self.app.clone().unwrap_or_default()
    }

    /// Effective cache settings.
    pub fn cache(&self) -> CacheSettings {
        self.cache.clone().unwrap_or_default()
    }

    /// Directory holding the persisted session and theme.
    ///
    /// Resolution order: configured `storage.data_dir`, the platform data
    /// directory, then `./.intersul`.
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .as_ref()
            .and_then(|s| s.data_dir.clone())
            .or_else(|| dirs::data_dir().map(|d| d.join("intersul")))
            .unwrap_or_else(|| PathBuf::from(".intersul"))
    }

    /// Apply `INTERSUL_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `INTERSUL_*` overrides using `lookup` to read variables.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api.get_or_insert_with(ApiConfig::default).url = url;
        }
        if let Some(name) = lookup(ENV_APP_NAME).filter(|v| !v.is_empty()) {
            self.app.get_or_insert_with(AppConfig::default).name = name;
        }
        if let Some(env) = lookup(ENV_ENVIRONMENT).filter(|v| !v.is_empty()) {
            let parsed = env.parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_ENVIRONMENT.to_string(),
                value: env.clone(),
            })?;
            self.app.get_or_insert_with(AppConfig::default).environment = parsed;
        }
        Ok(())
    }

    /// Check the settings that would otherwise fail at first use.
    pub fn validate(&self) -> Result<()> {
        let api = self.api();
        match url::Url::parse(&api.url) {
            Ok(url) if url.has_host() => {}
            _ => return Err(ConfigError::InvalidApiUrl(api.url)),
        }
        if self.app().name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "name".to_string(),
                context: "[app]".to_string(),
            });
        }
        Ok(())
    }
}

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API.
    pub url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Application identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub environment: Environment,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_APP_NAME.to_string(),
            environment: Environment::default(),
        }
    }
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_test(&self) -> bool {
        matches!(self, Environment::Test)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        };
        f.write_str(s)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

/// Query cache sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Maximum number of cached query results before LRU eviction.
    pub max_entries: usize,
    /// Run the periodic garbage-collection task.
    pub enable_cleanup_task: bool,
    /// Interval between garbage-collection passes in seconds.
    pub cleanup_interval_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_CACHE_ENTRIES,
            enable_cleanup_task: true,
            cleanup_interval_secs: 60,
        }
    }
}

impl CacheSettings {
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

/// Local persistence settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::new();
        assert_eq!(config.api().url, DEFAULT_API_URL);
        assert_eq!(config.api().timeout(), Duration::from_secs(10));
        assert_eq!(config.app().name, "Intersul");
        assert!(config.app().environment.is_development());
        assert_eq!(config.cache().max_entries, DEFAULT_MAX_CACHE_ENTRIES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_sections() {
        let config = ConsoleConfig::from_toml(
            r#"
[api]
url = "https://api.example.com"

[app]
environment = "production"
"#,
        )
        .unwrap();

        assert_eq!(config.api().url, "https://api.example.com");
        assert_eq!(config.api().timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.app().environment.is_production());
        assert_eq!(config.app().name, DEFAULT_APP_NAME);
    }

    #[test]
    fn test_merge_overrides_present_sections_only() {
        let mut base = ConsoleConfig::from_toml("[api]\nurl = \"http://a:1\"\n[app]\nname = \"A\"\n").unwrap();
        let overlay = ConsoleConfig::from_toml("[api]\nurl = \"http://b:2\"\n").unwrap();
        base.merge(overlay);

        assert_eq!(base.api().url, "http://b:2");
        assert_eq!(base.app().name, "A");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ConsoleConfig::new();
        config
            .apply_env_from(lookup(&[
                (ENV_API_URL, "https://prod.example.com"),
                (ENV_APP_NAME, "Intersul Norte"),
                (ENV_ENVIRONMENT, "test"),
            ]))
            .unwrap();

        assert_eq!(config.api().url, "https://prod.example.com");
        assert_eq!(config.app().name, "Intersul Norte");
        assert!(config.app().environment.is_test());
    }

    #[test]
    fn test_env_rejects_unknown_environment() {
        let mut config = ConsoleConfig::new();
        let err = config
            .apply_env_from(lookup(&[(ENV_ENVIRONMENT, "staging")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = ConsoleConfig::new();
        config.api = Some(ApiConfig {
            url: "not a url".to_string(),
            timeout_secs: 10,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidApiUrl(_))
        ));
    }

    #[test]
    fn test_validate_rejects_blank_app_name() {
        let mut config = ConsoleConfig::new();
        config.app = Some(AppConfig {
            name: "  ".to_string(),
            environment: Environment::Development,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField { .. })
        ));
    }

    #[test]
    fn test_configured_data_dir() {
        let mut config = ConsoleConfig::new();
        config.storage = Some(StorageConfig {
            data_dir: Some(PathBuf::from("/srv/intersul")),
        });
        assert_eq!(config.data_dir(), PathBuf::from("/srv/intersul"));
    }
}
