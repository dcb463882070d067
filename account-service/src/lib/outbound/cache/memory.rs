use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;

use crate::domain::session::errors::CacheError;
use crate::domain::session::ports::SessionCache;

/// Process-local session cache for tests and local development.
///
/// Expired entries are dropped on every write. Entries do not survive restarts
/// and are not shared between instances; deployments use
/// [`super::RedisSessionCache`].
#[derive(Debug, Default)]
pub struct InMemorySessionCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl InMemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining time to live of a live entry.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.lock().ok()?;
        entries
            .get(key)
            .and_then(|(_, expires_at)| expires_at.checked_duration_since(Instant::now()))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .map(|entries| entries.values().filter(|(_, exp)| *exp > now).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, (String, Instant)>>, CacheError> {
        self.entries
            .lock()
            .map_err(|e| CacheError::Unavailable(format!("cache lock poisoned: {}", e)))
    }
}

#[async_trait]
impl SessionCache for InMemorySessionCache {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.lock()?;
        let now = Instant::now();
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_string(), (value.to_string(), now + ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut entries = self.lock()?;
        Ok(entries
            .remove(key)
            .is_some_and(|(_, expires_at)| expires_at > Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = InMemorySessionCache::new();

        cache
            .set("session:a", "alice@example.com", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            cache.get("session:a").await.unwrap(),
            Some("alice@example.com".to_string())
        );
        assert_eq!(cache.len(), 1);

        assert!(cache.delete("session:a").await.unwrap());
        assert!(!cache.delete("session:a").await.unwrap());
        assert_eq!(cache.get("session:a").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = InMemorySessionCache::new();

        cache
            .set("session:a", "alice@example.com", Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(cache.get("session:a").await.unwrap(), None);
        assert!(!cache.delete("session:a").await.unwrap());
    }

    #[tokio::test]
    async fn test_write_drops_expired_entries() {
        let cache = InMemorySessionCache::new();

        for key in ["session:a", "session:b", "session:c"] {
            cache
                .set(key, "alice@example.com", Duration::from_millis(20))
                .await
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(40)).await;

        cache
            .set("session:d", "bob@example.com", Duration::from_secs(60))
            .await
            .unwrap();

        let entries = cache.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key("session:d"));
    }
}
