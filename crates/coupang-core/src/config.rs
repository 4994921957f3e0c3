//! Client configuration, assembled explicitly or from `COUPANG_*` variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::error::ConfigError;
use crate::gateway::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::signer::Credentials;

pub const ACCESS_KEY_VAR: &str = "COUPANG_ACCESS_KEY";
pub const SECRET_KEY_VAR: &str = "COUPANG_SECRET_KEY";
pub const BASE_URL_VAR: &str = "COUPANG_API_BASE_URL";
pub const TIMEOUT_MS_VAR: &str = "COUPANG_TIMEOUT_MS";
pub const LINK_CACHE_TTL_VAR: &str = "COUPANG_LINK_CACHE_TTL_SECS";
pub const LINK_CACHE_CAPACITY_VAR: &str = "COUPANG_LINK_CACHE_CAPACITY";

/// Everything a [`crate::GatewayClient`] and [`crate::LinkResolver`] need.
///
/// Credentials are validated when constructed, so a `ClientConfig` value
/// always holds non-empty keys.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: Credentials,
    pub base_url: String,
    pub timeout: Duration,
    pub link_cache_ttl: Duration,
    pub link_cache_capacity: usize,
}

impl ClientConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: String::from(DEFAULT_BASE_URL),
            timeout: DEFAULT_TIMEOUT,
            link_cache_ttl: DEFAULT_TTL,
            link_cache_capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_key = lookup(ACCESS_KEY_VAR).ok_or(ConfigError::MissingVar {
            name: ACCESS_KEY_VAR,
        })?;
        let secret_key = lookup(SECRET_KEY_VAR).ok_or(ConfigError::MissingVar {
            name: SECRET_KEY_VAR,
        })?;

        let mut config = Self::new(Credentials::new(access_key, secret_key)?);

        if let Some(base_url) = lookup(BASE_URL_VAR).filter(|value| !value.trim().is_empty()) {
            config = config.with_base_url(base_url.trim());
        }
        if let Some(timeout_ms) = parse_var::<u64, _>(&lookup, TIMEOUT_MS_VAR)? {
            if timeout_ms == 0 {
                return Err(ConfigError::InvalidValue {
                    name: TIMEOUT_MS_VAR,
                    value: String::from("0"),
                });
            }
            config.timeout = Duration::from_millis(timeout_ms);
        }
        if let Some(ttl_secs) = parse_var::<u64, _>(&lookup, LINK_CACHE_TTL_VAR)? {
            config.link_cache_ttl = Duration::from_secs(ttl_secs);
        }
        if let Some(capacity) = parse_var::<usize, _>(&lookup, LINK_CACHE_CAPACITY_VAR)? {
            config.link_cache_capacity = capacity;
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// A zero TTL turns the short-link cache off.
    pub fn with_link_cache(mut self, ttl: Duration, capacity: usize) -> Self {
        self.link_cache_ttl = ttl;
        self.link_cache_capacity = capacity;
        self
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue { name, value: raw })
}
