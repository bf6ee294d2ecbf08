// Freshness cache: memoizes raw external payloads per (endpoint, params) key.
// Stale entries are overwritten on the next successful fetch, never evicted.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace};

use super::adapters::MarketDataSource;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    payload: Value,
    fetched_at: Instant,
}

pub struct FreshnessCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for FreshnessCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl FreshnessCache {
    /// TTL is configurable so tests can force stale hits.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Fresh hit returns the cached payload without contacting `source`.
    /// Miss or stale hit performs the fetch: success stores and returns the
    /// payload, failure returns None and leaves any previous entry in place.
    pub async fn fetch(
        &self,
        source: &dyn MarketDataSource,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Option<Value> {
        let key = cache_key(endpoint, params);

        // Scoped so the lock is released before the await below.
        let hit = {
            let entries = self.entries.lock();
            entries
                .get(&key)
                .filter(|e| e.fetched_at.elapsed() < self.ttl)
                .map(|e| e.payload.clone())
        };
        if let Some(payload) = hit {
            trace!(%key, "cache hit");
            return Some(payload);
        }

        match source.fetch(endpoint, params).await {
            Ok(payload) => {
                debug!(%key, "fetched and cached external payload");
                self.entries.lock().insert(
                    key,
                    CacheEntry {
                        payload: payload.clone(),
                        fetched_at: Instant::now(),
                    },
                );
                Some(payload)
            }
            Err(e) => {
                debug!(endpoint, error = %e, "external fetch failed");
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

fn cache_key(endpoint: &str, params: &[(String, String)]) -> String {
    let mut key = String::from(endpoint);
    for (k, v) in params {
        key.push_str(&format!("&{k}={v}"));
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::adapters::FetchError;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Counts calls; optionally fails every fetch.
    struct CountingSource {
        calls: AtomicUsize,
        failing: AtomicBool,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl MarketDataSource for CountingSource {
        async fn fetch(
            &self,
            _endpoint: &str,
            _params: &[(String, String)],
        ) -> Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                Err(FetchError::Disabled)
            } else {
                Ok(json!({"price": 42.0}))
            }
        }
    }

    fn params(sym: &str) -> Vec<(String, String)> {
        vec![("name".to_string(), sym.to_string())]
    }

    #[tokio::test]
    async fn second_call_within_ttl_hits_the_cache() {
        let source = CountingSource::new();
        let cache = FreshnessCache::default();
        let a = cache.fetch(&source, "/stock", &params("TCS")).await;
        let b = cache.fetch(&source, "/stock", &params("TCS")).await;
        assert_eq!(a, b);
        assert!(a.is_some());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn expired_ttl_triggers_a_second_external_call() {
        let source = CountingSource::new();
        let cache = FreshnessCache::new(Duration::ZERO);
        cache.fetch(&source, "/stock", &params("TCS")).await;
        cache.fetch(&source, "/stock", &params("TCS")).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn distinct_params_get_distinct_keys() {
        let source = CountingSource::new();
        let cache = FreshnessCache::default();
        cache.fetch(&source, "/stock", &params("TCS")).await;
        cache.fetch(&source, "/stock", &params("INFY")).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn failure_returns_none_and_keeps_the_old_entry() {
        let source = CountingSource::new();
        let cache = FreshnessCache::new(Duration::ZERO);
        let first = cache.fetch(&source, "/stock", &params("TCS")).await;
        assert!(first.is_some());

        source.failing.store(true, Ordering::SeqCst);
        let second = cache.fetch(&source, "/stock", &params("TCS")).await;
        assert!(second.is_none());
        // Previous payload is still stored, just stale.
        assert_eq!(cache.len(), 1);
    }
}
