//! Service configuration.
//!
//! Layered, lowest priority first: built-in defaults, an optional
//! `marimon.toml` next to the binary, then environment variables
//! (`FROST_BASE_URL`, `FROST_CACHE_TTL_SECS`, `FROST_HTTP_TIMEOUT_SECS`).
//! The binary loads a `.env` file via dotenv before reading the environment,
//! so deployments can keep overrides out of the unit file.

use serde::Deserialize;
use std::path::Path;

use crate::cache::DEFAULT_TTL_SECS;
use crate::frost::DEFAULT_BASE_URL;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "marimon.toml";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// FROST SensorThings API base URL, without trailing slash.
    pub base_url: String,
    /// Response cache time-to-live.
    pub cache_ttl_secs: i64,
    /// Per-request HTTP timeout.
    pub http_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl_secs: DEFAULT_TTL_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

// TOML sections; every key optional so a partial file overrides selectively.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    frost: Option<FrostSection>,
}

#[derive(Debug, Default, Deserialize)]
struct FrostSection {
    base_url: Option<String>,
    cache_ttl_secs: Option<i64>,
    http_timeout_secs: Option<u64>,
}

impl ServiceConfig {
    /// Loads `marimon.toml` if present, then applies environment overrides.
    /// A missing file is not an error; a malformed one is.
    pub fn load() -> Result<Self, String> {
        Self::load_from(Path::new(DEFAULT_CONFIG_PATH))
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let config = if path.exists() {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
            Self::parse_toml(&text)?
        } else {
            ServiceConfig::default()
        };
        Ok(config.apply_env_from(|key| std::env::var(key).ok()))
    }

    /// Parses a TOML config over the defaults.
    pub fn parse_toml(text: &str) -> Result<Self, String> {
        let file: FileConfig =
            toml::from_str(text).map_err(|e| format!("invalid configuration: {}", e))?;
        let mut config = ServiceConfig::default();
        if let Some(frost) = file.frost {
            if let Some(base_url) = frost.base_url {
                config.base_url = base_url;
            }
            if let Some(ttl) = frost.cache_ttl_secs {
                config.cache_ttl_secs = ttl;
            }
            if let Some(timeout) = frost.http_timeout_secs {
                config.http_timeout_secs = timeout;
            }
        }
        Ok(config)
    }

    /// Applies environment overrides through an injected lookup, so tests
    /// stay deterministic without touching the process environment.
    fn apply_env_from(mut self, get: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = get("FROST_BASE_URL") {
            self.base_url = url;
        }
        if let Some(ttl) = get("FROST_CACHE_TTL_SECS").and_then(|v| v.parse().ok()) {
            self.cache_ttl_secs = ttl;
        }
        if let Some(timeout) = get("FROST_HTTP_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.http_timeout_secs = timeout;
        }
        self
    }
}
