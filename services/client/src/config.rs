//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Base URLs of the three backends the client talks to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceEndpoints {
    pub auth: Url,
    pub test: Url,
    pub content: Url,
}

impl ServiceEndpoints {
    /// Points all three services at the same base URL.
    pub fn uniform(base: Url) -> Self {
        Self {
            auth: base.clone(),
            test: base.clone(),
            content: base,
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub endpoints: ServiceEndpoints,
    pub log_level: Level,
    /// Directory for the file-backed mirror. `None` keeps the mirror in memory.
    pub mirror_dir: Option<PathBuf>,
    /// No timeout unless one is configured.
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // --- Load Service Endpoints ---
        let api_url = lookup("API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let service_url = |var: &str| {
            let raw = lookup(var).unwrap_or_else(|| api_url.clone());
            parse_url(var, raw)
        };
        let auth = service_url("AUTH_API_URL")?;
        let test = service_url("TEST_API_URL")?;
        let content = service_url("CONTENT_API_URL")?;

        // --- Load Logging ---
        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Mirror & Transport Settings ---
        let mirror_dir = lookup("MIRROR_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| {
                    ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            endpoints: ServiceEndpoints { auth, test, content },
            log_level,
            mirror_dir,
            request_timeout,
        })
    }
}

fn parse_url(var: &str, raw: String) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue(
            var.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_every_service_at_the_local_api() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.endpoints.auth.as_str(), DEFAULT_API_URL);
        assert_eq!(config.endpoints.test, config.endpoints.content);
        assert_eq!(config.log_level, Level::INFO);
        assert!(config.mirror_dir.is_none());
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn each_service_can_be_configured_independently() {
        let config = Config::from_lookup(lookup(&[
            ("API_URL", "http://api.local/api"),
            ("CONTENT_API_URL", "https://content.local/v1"),
            ("MIRROR_DIR", "/tmp/mirror"),
            ("REQUEST_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(config.endpoints.auth.as_str(), "http://api.local/api");
        assert_eq!(config.endpoints.content.as_str(), "https://content.local/v1");
        assert_eq!(config.mirror_dir, Some(PathBuf::from("/tmp/mirror")));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("AUTH_API_URL", "ftp://x")])),
            Err(ConfigError::InvalidValue(var, _)) if var == "AUTH_API_URL"
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("RUST_LOG", "loud")])),
            Err(ConfigError::InvalidValue(var, _)) if var == "RUST_LOG"
        ));
    }
}
