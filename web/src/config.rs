use std::time::Duration;

use thiserror::Error;

use crate::push::PushSettings;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be an http(s) url, got {value:?}")]
    InvalidUrl { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base of the ride backend REST API, e.g. `http://localhost:9000/api`.
    pub backend_url: String,
    pub backend_timeout: Duration,
    /// Trip shown when the link carries no `tripId`.
    pub default_trip_id: Option<String>,
    pub push: PushSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:9000/api".to_string(),
            backend_timeout: Duration::from_secs(10),
            default_trip_id: None,
            push: PushSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend_url = match var("BACKEND_URL") {
            Some(url) => http_url("BACKEND_URL", url)?,
            None => defaults.backend_url,
        };
        let socket_url = match var("SOCKET_URL") {
            Some(url) => http_url("SOCKET_URL", url)?,
            None => defaults.push.url,
        };

        Ok(AppConfig {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            backend_timeout: Duration::from_secs(number(
                "BACKEND_TIMEOUT_SECS",
                var("BACKEND_TIMEOUT_SECS"),
                defaults.backend_timeout.as_secs(),
            )?),
            default_trip_id: var("DEFAULT_TRIP_ID"),
            push: PushSettings {
                url: socket_url,
                reconnection: defaults.push.reconnection,
                reconnection_delay_ms: number(
                    "SOCKET_RECONNECTION_DELAY_MS",
                    var("SOCKET_RECONNECTION_DELAY_MS"),
                    defaults.push.reconnection_delay_ms,
                )?,
                reconnection_delay_max_ms: defaults.push.reconnection_delay_max_ms,
                reconnection_attempts: number(
                    "SOCKET_RECONNECTION_ATTEMPTS",
                    var("SOCKET_RECONNECTION_ATTEMPTS"),
                    defaults.push.reconnection_attempts,
                )?,
            },
        })
    }
}

fn http_url(key: &'static str, value: String) -> Result<String, ConfigError> {
    let lower = value.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(value)
    } else {
        Err(ConfigError::InvalidUrl { key, value })
    }
}

fn number<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        None => Ok(default),
    }
}

#[cfg(feature = "ssr")]
static CONFIG: std::sync::OnceLock<AppConfig> = std::sync::OnceLock::new();

#[cfg(feature = "ssr")]
pub fn init_config() -> Result<&'static AppConfig, ConfigError> {
    let config = AppConfig::from_env()?;
    tracing::info!(
        backend_url = %config.backend_url,
        socket_url = %config.push.url,
        "configuration loaded"
    );
    Ok(CONFIG.get_or_init(|| config))
}

#[cfg(feature = "ssr")]
pub fn get_config() -> &'static AppConfig {
    CONFIG.get_or_init(|| {
        tracing::warn!("configuration read before init_config, using defaults");
        AppConfig::default()
    })
}
