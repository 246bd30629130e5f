//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use crate::adapters::TutorSettings;
use nihongo_core::store::StoreLatency;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

const DEFAULT_QWEN_API_URL: &str =
    "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub cors_origin: String,
    pub lessons_path: Option<PathBuf>,
    pub qwen_api_key: Option<String>,
    pub qwen_api_url: String,
    pub qwen_model: String,
    pub tutor_timeout: Duration,
    pub login_latency: Duration,
    pub register_latency: Duration,
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

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // --- Server Settings ---
        let bind_address = parse_or(&lookup, "BIND_ADDRESS", "0.0.0.0:3000")?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());

        let lessons_path = lookup("LESSONS_PATH").map(PathBuf::from);

        // --- Completion API (key is optional) ---
        let qwen_api_key = lookup("QWEN_API_KEY").filter(|key| !key.trim().is_empty());
        let qwen_api_url =
            lookup("QWEN_API_URL").unwrap_or_else(|| DEFAULT_QWEN_API_URL.to_string());
        let qwen_model = lookup("QWEN_MODEL").unwrap_or_else(|| "qwen-turbo".to_string());
        let tutor_timeout = Duration::from_secs(parse_or(&lookup, "TUTOR_TIMEOUT_SECS", "30")?);

        // --- Simulated Auth Latency ---
        let login_latency = Duration::from_millis(parse_or(&lookup, "LOGIN_LATENCY_MS", "500")?);
        let register_latency =
            Duration::from_millis(parse_or(&lookup, "REGISTER_LATENCY_MS", "1000")?);

        Ok(Self {
            bind_address,
            log_level,
            cors_origin,
            lessons_path,
            qwen_api_key,
            qwen_api_url,
            qwen_model,
            tutor_timeout,
            login_latency,
            register_latency,
        })
    }

    pub fn tutor_settings(&self) -> TutorSettings {
        TutorSettings {
            api_url: self.qwen_api_url.clone(),
            api_key: self.qwen_api_key.clone(),
            model: self.qwen_model.clone(),
            timeout: self.tutor_timeout,
        }
    }

    pub fn store_latency(&self) -> StoreLatency {
        StoreLatency {
            login: self.login_latency,
            register: self.register_latency,
        }
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}
