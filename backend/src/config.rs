//! Server and submission settings, read from the environment.
//!
//! A `.env` file next to the binary is honoured (loaded in `main.rs` before
//! `AppConfig::from_env`). Recognised variables:
//!
//! - `FREIGHT_HOST` / `FREIGHT_PORT`: bind address, default `127.0.0.1:8080`.
//! - `FREIGHT_MAX_ROWS`: data rows kept from an upload, default 100.
//! - `CLIMATIQ_API_KEY` / `CLIMATIQ_API_BASE_URL`: credentials for the
//!   emissions API. They are optional at startup and only required once a
//!   submission is started; see [`AppConfig::submission`].

use freight_common::parser::DEFAULT_MAX_ROWS;
use std::env;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

/// A server setting that is present but unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Missing credentials for the submission stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Climatiq API key not found in environment variables (CLIMATIQ_API_KEY)")]
    MissingApiKey,
    #[error("Climatiq API base URL not found in environment variables (CLIMATIQ_API_BASE_URL)")]
    MissingBaseUrl,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_rows: usize,
    pub climatiq_api_key: Option<String>,
    pub climatiq_base_url: Option<String>,
}

/// Credentials needed by `ClimatiqClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionConfig {
    pub api_key: String,
    pub base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("FREIGHT_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "FREIGHT_PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let max_rows = match get("FREIGHT_MAX_ROWS") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(0) => {
                    return Err(ConfigError::InvalidValue {
                        key: "FREIGHT_MAX_ROWS",
                        value: raw,
                        reason: "must be a positive integer".to_string(),
                    })
                }
                Ok(n) => n,
                Err(e) => {
                    return Err(ConfigError::InvalidValue {
                        key: "FREIGHT_MAX_ROWS",
                        value: raw,
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_MAX_ROWS,
        };

        Ok(AppConfig {
            host: get("FREIGHT_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            max_rows,
            climatiq_api_key: get("CLIMATIQ_API_KEY"),
            climatiq_base_url: get("CLIMATIQ_API_BASE_URL"),
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Returns the submission credentials, failing if either one is missing.
    pub fn submission(&self) -> Result<SubmissionConfig, ConfigurationError> {
        let api_key = self
            .climatiq_api_key
            .clone()
            .ok_or(ConfigurationError::MissingApiKey)?;
        let base_url = self
            .climatiq_base_url
            .clone()
            .ok_or(ConfigurationError::MissingBaseUrl)?;
        Ok(SubmissionConfig { api_key, base_url })
    }
}
