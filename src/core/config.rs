use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

pub const DEFAULT_RECORD_KEY: &str = "budget-data.json";
pub const DEFAULT_TOKEN_ENV: &str = "BIRR_BLOB_TOKEN";

fn default_currency() -> String {
    "ETB".to_string()
}

fn default_record_key() -> String {
    DEFAULT_RECORD_KEY.to_string()
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_retries() -> usize {
    1
}

fn default_debounce_ms() -> u64 {
    1000
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    #[serde(default = "default_record_key")]
    pub key: String,
    /// Name of the environment variable holding the bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts for the startup fetch.
    #[serde(default = "default_retries")]
    pub retries: usize,
}

impl RemoteConfig {
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SyncConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    pub data_path: Option<String>,
    pub remote: Option<RemoteConfig>,
    #[serde(default)]
    pub sync: SyncConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            currency: default_currency(),
            data_path: None,
            remote: None,
            sync: SyncConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, falling back to defaults when it does
    /// not exist yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "birr").context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs =
            ProjectDirs::from("", "", "birr").context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn record_key(&self) -> &str {
        self.remote
            .as_ref()
            .map_or(DEFAULT_RECORD_KEY, |r| r.key.as_str())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
currency: "USD"
data_path: "/tmp/birr"
remote:
  base_url: "https://blob.example.com/store"
  key: "household.json"
  token_env: "HOUSEHOLD_TOKEN"
  timeout_secs: 3
  retries: 0
sync:
  debounce_ms: 250
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.currency, "USD");
        assert_eq!(config.data_path.as_deref(), Some("/tmp/birr"));
        let remote = config.remote.as_ref().expect("Expected remote config");
        assert_eq!(remote.base_url, "https://blob.example.com/store");
        assert_eq!(remote.key, "household.json");
        assert_eq!(remote.token_env, "HOUSEHOLD_TOKEN");
        assert_eq!(remote.timeout(), Duration::from_secs(3));
        assert_eq!(remote.retries, 0);
        assert_eq!(config.sync.debounce(), Duration::from_millis(250));
        assert_eq!(config.record_key(), "household.json");
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/birr")
        );
    }

    #[test]
    fn test_config_defaults() {
        let yaml_str = r#"
remote:
  base_url: "http://localhost:9000"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.currency, "ETB");
        assert_eq!(config.sync.debounce_ms, 1000);
        let remote = config.remote.unwrap();
        assert_eq!(remote.key, DEFAULT_RECORD_KEY);
        assert_eq!(remote.token_env, DEFAULT_TOKEN_ENV);
        assert_eq!(remote.timeout_secs, 10);
        assert_eq!(remote.retries, 1);
    }

    #[test]
    fn test_local_only_config() {
        let config: AppConfig = serde_yaml::from_str("currency: \"ETB\"\n").unwrap();
        assert!(config.remote.is_none());
        assert_eq!(config.record_key(), DEFAULT_RECORD_KEY);
    }

    #[test]
    fn test_missing_token_env_yields_no_token() {
        let remote = RemoteConfig {
            base_url: "http://localhost".to_string(),
            key: default_record_key(),
            token_env: "BIRR_TEST_TOKEN_THAT_IS_NEVER_SET".to_string(),
            timeout_secs: 1,
            retries: 0,
        };
        assert!(remote.token().is_none());
    }
}
