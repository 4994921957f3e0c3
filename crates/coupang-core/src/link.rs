//! Turns raw product URLs into tracked short links, best effort.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use regex::Regex;

use crate::cache::ShortLinkCache;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::gateway::GatewayClient;

pub const PRODUCT_PAGE_BASE: &str = "https://www.coupang.com/vp/products/";

fn product_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"pageKey=(\d+)").expect("product key pattern is valid"))
}

/// Numeric product key carried in a `pageKey=` query parameter, if any.
pub fn extract_product_key(product_url: &str) -> Option<&str> {
    product_key_pattern()
        .captures(product_url)
        .and_then(|captures| captures.get(1))
        .map(|key| key.as_str())
}

pub fn canonical_product_url(product_key: &str) -> String {
    format!("{PRODUCT_PAGE_BASE}{product_key}")
}

type Inflight = Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>;

/// Resolves product URLs to short links through the deep-link endpoint.
///
/// `resolve` never fails: any problem yields the input URL. Successful links
/// are cached per product key, and concurrent resolutions of the same key
/// share a single gateway call.
#[derive(Clone)]
pub struct LinkResolver {
    gateway: GatewayClient,
    cache: ShortLinkCache,
    inflight: Inflight,
}

impl LinkResolver {
    pub fn new(gateway: GatewayClient, cache: ShortLinkCache) -> Self {
        Self {
            gateway,
            cache,
            inflight: Arc::default(),
        }
    }

    /// Uses the cache TTL and capacity from `config`.
    pub fn from_config(gateway: GatewayClient, config: &ClientConfig) -> Self {
        Self::new(
            gateway,
            ShortLinkCache::new(config.link_cache_ttl, config.link_cache_capacity),
        )
    }

    pub fn cache(&self) -> &ShortLinkCache {
        &self.cache
    }

    pub async fn resolve(&self, product_url: &str) -> String {
        let Some(product_key) = extract_product_key(product_url) else {
            return product_url.to_owned();
        };

        if let Some(short_url) = self.cache.get(product_key).await {
            return short_url;
        }

        let flight = self.join_flight(product_key);
        let _turn = flight.slot.lock().await;

        // Another caller may have finished while we waited.
        if let Some(short_url) = self.cache.get(product_key).await {
            return short_url;
        }

        match self.shorten(product_key).await {
            Ok(short_url) => {
                self.cache.put(product_key, short_url.clone()).await;
                short_url
            }
            Err(error) => {
                tracing::warn!(
                    product_key,
                    code = error.code(),
                    %error,
                    "short link unavailable, keeping product url"
                );
                product_url.to_owned()
            }
        }
    }

    async fn shorten(&self, product_key: &str) -> Result<String, ClientError> {
        let response = self
            .gateway
            .create_deep_link(&canonical_product_url(product_key))
            .await?;

        response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|link| link.shorten_url)
            .find(|short_url| !short_url.trim().is_empty())
            .ok_or_else(|| ClientError::Decode(String::from("deep link response had no links")))
    }

    fn join_flight(&self, product_key: &str) -> FlightGuard {
        let slot = {
            let mut inflight = lock(&self.inflight);
            Arc::clone(inflight.entry(product_key.to_owned()).or_default())
        };
        FlightGuard {
            inflight: Arc::clone(&self.inflight),
            product_key: product_key.to_owned(),
            slot,
        }
    }
}

/// Membership in the per-key flight; the last member out removes the entry.
struct FlightGuard {
    inflight: Inflight,
    product_key: String,
    slot: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut inflight = lock(&self.inflight);
        let last = inflight
            .get(&self.product_key)
            .is_some_and(|slot| Arc::ptr_eq(slot, &self.slot) && Arc::strong_count(slot) <= 2);
        if last {
            inflight.remove(&self.product_key);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
