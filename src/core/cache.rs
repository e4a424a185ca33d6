use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::core::client::constants::DEFAULT_CACHE_TTL;

#[derive(Debug)]
struct CacheEntry<V> {
    payload: V,
    stored_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self) -> bool {
        self.stored_at.elapsed() < self.ttl
    }
}

/// Short-lived memoization of successful responses.
///
/// Expired entries are treated as absent and evicted on the read that finds
/// them.
#[derive(Debug)]
pub struct ResponseCache<V = String> {
    map: RwLock<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        {
            let guard = self.map.read().await;
            match guard.get(key) {
                None => return None,
                Some(entry) if entry.is_fresh() => return Some(entry.payload.clone()),
                Some(_) => {}
            }
        }

        let mut guard = self.map.write().await;
        // Someone may have refreshed it between the two locks.
        if let Some(entry) = guard.get(key)
            && entry.is_fresh()
        {
            return Some(entry.payload.clone());
        }
        guard.remove(key);
        None
    }

    pub async fn set(&self, key: impl Into<String>, payload: V, ttl: Duration) {
        let entry = CacheEntry {
            payload,
            stored_at: Instant::now(),
            ttl,
        };
        self.map.write().await.insert(key.into(), entry);
    }

    pub async fn clear(&self) {
        self.map.write().await.clear();
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.map.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
