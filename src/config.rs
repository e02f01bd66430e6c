use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://coursehub.db";
const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Server-side settings, read once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub storage: Option<StorageConfig>,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

/// Where the course-creation client sends its submissions.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 5)?;
        let bind_addr = parse_var("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 5000)))?;

        let storage = match non_blank(env::var("STORAGE_BASE_URL").ok()) {
            Some(base_url) => Some(StorageConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                token: non_blank(env::var("STORAGE_TOKEN").ok()),
                timeout: Duration::from_secs(parse_var("STORAGE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?),
            }),
            None => None,
        };

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
            storage,
        })
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn new_from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let timeout = Duration::from_secs(parse_var("API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?);
        Ok(Self::new(base_url, timeout))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            name,
            value,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_treated_as_unset() {
        assert_eq!(non_blank(Some(String::new())), None);
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" s3cret ".to_string())), Some("s3cret".to_string()));
    }

    #[test]
    fn api_config_trims_trailing_slash() {
        let config = ApiConfig::new("http://localhost:5000/api/", Duration::from_secs(5));
        assert_eq!(config.base_url, "http://localhost:5000/api");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
