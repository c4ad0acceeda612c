use crate::error::{AppError, Result};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_DIR_PREFIX: &str = "sheets-kit";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    pub google: GoogleConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GoogleConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Service account key file; takes precedence over the OAuth client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_key: Option<PathBuf>,
    /// Account to impersonate with the service account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_timeout_secs: Option<u64>,
}

/// How the session authenticates.
#[derive(Debug, Clone, PartialEq)]
pub enum Credentials {
    ServiceAccount {
        key_path: PathBuf,
        subject: Option<String>,
    },
    InstalledApp {
        client_id: String,
        client_secret: String,
    },
}

impl GoogleConfig {
    pub fn credentials(&self) -> Result<Credentials> {
        if let Some(key_path) = &self.service_account_key {
            return Ok(Credentials::ServiceAccount {
                key_path: key_path.clone(),
                subject: self.subject.clone().filter(|s| !s.is_empty()),
            });
        }

        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(AppError::Config(
                "Google service_account_key, or client_id and client_secret, must be set in config file"
                    .to_string(),
            ));
        }

        Ok(Credentials::InstalledApp {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        })
    }

    /// Identity remote calls are made as, for log lines.
    pub fn subject(&self) -> String {
        self.subject.clone().unwrap_or_default()
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Fixed 2.5s wait with no attempt limit. The only unbounded schedule.
    pub legacy: bool,
    pub max_retries: u32,
    /// At least 2500.
    pub initial_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            legacy: false,
            max_retries: policy.max_retries().unwrap_or_default(),
            initial_delay_ms: policy.initial_delay().as_millis() as u64,
            multiplier: policy.multiplier(),
            max_delay_ms: policy.max_delay().as_millis() as u64,
            jitter: policy.jitter(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> Result<RetryPolicy> {
        if self.legacy {
            return Ok(RetryPolicy::legacy());
        }

        RetryPolicy::new(
            Some(self.max_retries),
            Duration::from_millis(self.initial_delay_ms),
            self.multiplier,
            Duration::from_millis(self.max_delay_ms),
            self.jitter,
        )
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file()?;

        if !config_path.exists() {
            return Err(AppError::Config(format!(
                "Config file not found at {:?}. Please create one.",
                config_path
            )));
        }

        let contents = fs::read_to_string(&config_path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))?;

        config.google.credentials()?;
        config.retry.policy()?;

        Ok(config)
    }

    fn xdg_dirs() -> xdg::BaseDirectories {
        xdg::BaseDirectories::with_prefix(CONFIG_DIR_PREFIX)
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        let xdg_dirs = Self::xdg_dirs();
        xdg_dirs
            .place_config_file("config.toml")
            .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))
    }

    /// Get the cache directory path
    pub fn cache_dir() -> Result<PathBuf> {
        let xdg = Self::xdg_dirs();
        xdg.get_cache_home()
            .ok_or_else(|| AppError::Config("Failed to determine cache directory".to_string()))
    }

    /// Get a cache file path
    pub fn cache_file(filename: &str) -> Result<PathBuf> {
        let xdg = Self::xdg_dirs();
        xdg.place_cache_file(filename)
            .map_err(|e| AppError::Config(format!("Failed to create cache file path: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = Config {
            google: GoogleConfig {
                client_id: "test_client_id".to_string(),
                client_secret: "test_client_secret".to_string(),
                call_timeout_secs: Some(30),
                ..Default::default()
            },
            retry: RetryConfig::default(),
        };

        let serialized = toml::to_string(&config).unwrap();
        let deserialized = Config::parse(&serialized).unwrap();

        assert_eq!(config.google.client_id, deserialized.google.client_id);
        assert_eq!(deserialized.google.call_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.retry, deserialized.retry);
    }

    #[test]
    fn test_service_account_takes_precedence() {
        let config = Config::parse(
            r#"
            [google]
            client_id = "id"
            client_secret = "secret"
            service_account_key = "/etc/key.json"
            subject = "robot@example.com"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.google.credentials().unwrap(),
            Credentials::ServiceAccount {
                key_path: PathBuf::from("/etc/key.json"),
                subject: Some("robot@example.com".to_string()),
            }
        );
        assert_eq!(config.google.subject(), "robot@example.com");
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let err = Config::parse("[google]\nclient_id = \"id\"\n").unwrap_err();
        assert!(matches!(err, AppError::Config(_)), "got {:?}", err);
    }

    #[test]
    fn test_retry_defaults_when_omitted() {
        let config = Config::parse(
            r#"
            [google]
            service_account_key = "key.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.retry.policy().unwrap(), RetryPolicy::default());
    }

    #[test]
    fn test_legacy_retry() {
        let config = Config::parse(
            r#"
            [google]
            service_account_key = "key.json"

            [retry]
            legacy = true
            "#,
        )
        .unwrap();

        assert_eq!(config.retry.policy().unwrap(), RetryPolicy::legacy());
    }

    #[test]
    fn test_invalid_multiplier_rejected() {
        let retry = RetryConfig {
            multiplier: 0.5,
            ..Default::default()
        };
        assert!(matches!(retry.policy(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_initial_delay_below_quota_backoff_rejected() {
        let err = Config::parse(
            r#"
            [google]
            service_account_key = "key.json"

            [retry]
            initial_delay_ms = 500
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Config(_)), "got {:?}", err);
    }

    #[test]
    fn test_invalid_jitter_rejected() {
        let retry = RetryConfig {
            jitter: 2.0,
            ..Default::default()
        };
        assert!(matches!(retry.policy(), Err(AppError::Config(_))));
    }
}
