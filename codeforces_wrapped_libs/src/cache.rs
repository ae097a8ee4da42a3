use serde_json::Value;
use std::collections::HashMap;
use tokio::{
    sync::RwLock,
    time::{Duration, Instant},
};

/// Cache key made of the endpoint and its parameters sorted by name, so the
/// order in which parameters were given does not matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    endpoint: String,
    params: Vec<(String, String)>,
}

impl CacheKey {
    pub fn new(endpoint: &str, params: &[(&str, &str)]) -> Self {
        let mut params: Vec<(String, String)> = params
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        params.sort();

        Self {
            endpoint: String::from(endpoint),
            params,
        }
    }
}

struct CacheEntry {
    payload: Value,
    inserted_at: Instant,
}

/// In-memory response cache with a fixed time-to-live.
///
/// Expired entries are never served: `get` checks the age on read, and `insert`
/// purges whatever has expired before making room.
pub struct ResponseCache {
    ttl: Duration,
    capacity: usize,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Value> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| entry.payload.clone())
    }

    pub async fn insert(&self, key: CacheKey, payload: Value) {
        if self.capacity == 0 {
            return;
        }

        let mut entries = self.entries.write().await;
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                tracing::debug!("evict cached response {:?}", oldest);
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                payload,
                inserted_at: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use tokio::time;

    #[test]
    fn test_key_ignores_parameter_order() {
        let a = CacheKey::new("user.info", &[("handles", "tourist"), ("lang", "en")]);
        let b = CacheKey::new("user.info", &[("lang", "en"), ("handles", "tourist")]);
        let c = CacheKey::new("user.status", &[("handles", "tourist"), ("lang", "en")]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn test_hit_within_ttl() {
        time::pause();
        let cache = ResponseCache::new(Duration::from_secs(60), 10);
        let key = CacheKey::new("user.info", &[("handles", "tourist")]);

        cache.insert(key.clone(), json!({"status": "OK"})).await;
        time::advance(Duration::from_secs(59)).await;

        assert_eq!(cache.get(&key).await, Some(json!({"status": "OK"})));
    }

    #[tokio::test]
    async fn test_expired_entry_is_not_served() {
        time::pause();
        let cache = ResponseCache::new(Duration::from_secs(60), 10);
        let key = CacheKey::new("user.info", &[("handles", "tourist")]);

        cache.insert(key.clone(), json!({"status": "OK"})).await;
        time::advance(Duration::from_secs(60)).await;

        assert_eq!(cache.get(&key).await, None);
    }

    #[tokio::test]
    async fn test_insert_purges_expired_entries() {
        time::pause();
        let cache = ResponseCache::new(Duration::from_secs(60), 10);

        cache
            .insert(CacheKey::new("user.info", &[("handles", "a")]), json!(1))
            .await;
        cache
            .insert(CacheKey::new("user.info", &[("handles", "b")]), json!(2))
            .await;
        time::advance(Duration::from_secs(61)).await;
        cache
            .insert(CacheKey::new("user.info", &[("handles", "c")]), json!(3))
            .await;

        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_evict_oldest_when_full() {
        time::pause();
        let cache = ResponseCache::new(Duration::from_secs(600), 2);
        let a = CacheKey::new("user.info", &[("handles", "a")]);
        let b = CacheKey::new("user.info", &[("handles", "b")]);
        let c = CacheKey::new("user.info", &[("handles", "c")]);

        cache.insert(a.clone(), json!("a")).await;
        time::advance(Duration::from_secs(1)).await;
        cache.insert(b.clone(), json!("b")).await;
        time::advance(Duration::from_secs(1)).await;
        cache.insert(c.clone(), json!("c")).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get(&a).await, None);
        assert_eq!(cache.get(&b).await, Some(json!("b")));
        assert_eq!(cache.get(&c).await, Some(json!("c")));
    }

    #[tokio::test]
    async fn test_overwrite_does_not_evict() {
        time::pause();
        let cache = ResponseCache::new(Duration::from_secs(600), 2);
        let a = CacheKey::new("user.info", &[("handles", "a")]);
        let b = CacheKey::new("user.info", &[("handles", "b")]);

        cache.insert(a.clone(), json!(1)).await;
        cache.insert(b.clone(), json!(2)).await;
        cache.insert(a.clone(), json!(3)).await;

        assert_eq!(cache.get(&a).await, Some(json!(3)));
        assert_eq!(cache.get(&b).await, Some(json!(2)));
    }

    #[tokio::test]
    async fn test_zero_capacity_disables_cache() {
        let cache = ResponseCache::new(Duration::from_secs(600), 0);
        let key = CacheKey::new("user.info", &[("handles", "a")]);

        cache.insert(key.clone(), json!(1)).await;

        assert!(cache.is_empty().await);
        assert_eq!(cache.get(&key).await, None);
    }
}
