//! In-memory short-link cache keyed by product key.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use time::OffsetDateTime;

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_CAPACITY: usize = 1_024;

/// A resolved short link, as handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLinkCacheEntry {
    pub product_key: String,
    pub short_url: String,
    pub resolved_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
struct StoredLink {
    short_url: String,
    resolved_at: OffsetDateTime,
    inserted: Instant,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<String, StoredLink>,
    ttl: Duration,
    capacity: usize,
}

impl CacheInner {
    fn get(&self, key: &str) -> Option<&StoredLink> {
        self.map
            .get(key)
            .filter(|entry| Instant::now() <= entry.expires_at)
    }

    fn put(&mut self, key: String, short_url: String) {
        let now = Instant::now();
        if !self.map.contains_key(&key) && self.map.len() >= self.capacity {
            self.clear_expired();
            if self.map.len() >= self.capacity {
                self.evict_oldest();
            }
        }

        self.map.insert(
            key,
            StoredLink {
                short_url,
                resolved_at: OffsetDateTime::now_utc(),
                inserted: now,
                expires_at: now + self.ttl,
            },
        );
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .map
            .iter()
            .min_by_key(|(_, entry)| entry.inserted)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.map.remove(&key);
        }
    }

    fn clear_expired(&mut self) {
        let now = Instant::now();
        self.map.retain(|_, entry| entry.expires_at > now);
    }
}

/// Thread-safe TTL cache with a size bound.
///
/// When full, expired entries are dropped first and then the oldest insert.
/// A zero TTL or zero capacity disables the cache.
#[derive(Debug, Clone)]
pub struct ShortLinkCache {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl ShortLinkCache {
    /// Cache keeping up to `capacity` links for `ttl` each.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                map: HashMap::new(),
                ttl,
                capacity,
            })),
        }
    }

    /// Cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, 0)
    }

    /// Short link for `product_key`, unless missing or expired.
    pub async fn get(&self, product_key: &str) -> Option<String> {
        let store = self.inner.read().await;
        store.get(product_key).map(|entry| entry.short_url.clone())
    }

    /// Like [`Self::get`], with the resolution time attached.
    pub async fn entry(&self, product_key: &str) -> Option<ShortLinkCacheEntry> {
        let store = self.inner.read().await;
        store.get(product_key).map(|entry| ShortLinkCacheEntry {
            product_key: product_key.to_owned(),
            short_url: entry.short_url.clone(),
            resolved_at: entry.resolved_at,
        })
    }

    /// Stores a successful resolution. No-op when the cache is disabled.
    pub async fn put(&self, product_key: impl Into<String>, short_url: impl Into<String>) {
        let mut store = self.inner.write().await;
        if store.ttl.is_zero() || store.capacity == 0 {
            return;
        }
        store.put(product_key.into(), short_url.into());
    }

    /// Drops entries past their TTL.
    pub async fn clear_expired(&self) {
        self.inner.write().await.clear_expired();
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        self.inner.write().await.map.clear();
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn is_disabled(&self) -> bool {
        let store = self.inner.read().await;
        store.ttl.is_zero() || store.capacity == 0
    }
}

impl Default for ShortLinkCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}
