use std::{env, path::PathBuf, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000/api/product/";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    /// Unset means a lookup may wait indefinitely.
    pub timeout: Option<Duration>,
    pub feed: Option<PathBuf>,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = get("HEALTH_API_BASE_URL").unwrap_or_else(|| {
            info!("HEALTH_API_BASE_URL not set, using default: {DEFAULT_API_BASE_URL}");
            DEFAULT_API_BASE_URL.to_string()
        });

        let timeout = match get("HEALTH_API_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                    warn!("Invalid HEALTH_API_TIMEOUT_SECS value: {e}");
                    ConfigError::Invalid {
                        key: "HEALTH_API_TIMEOUT_SECS",
                        value: raw.clone(),
                        reason: e.to_string(),
                    }
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        let feed = get("HEALTH_SCANNER_FEED")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self { api_base_url, timeout, feed })
    }
}
