use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::RedisError;

use crate::domain::session::errors::CacheError;
use crate::domain::session::ports::SessionCache;

/// Session cache backed by Redis.
///
/// Expiry is delegated to Redis (`SET ... PX`), so no sweeper is needed.
/// The connection manager reconnects on its own and is cheap to clone.
#[derive(Clone)]
pub struct RedisSessionCache {
    connection: ConnectionManager,
}

impl RedisSessionCache {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    /// Open a managed connection to the Redis server at `url`.
    ///
    /// # Errors
    /// * `Unavailable` - URL is invalid or the server cannot be reached
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let connection = ConnectionManager::new(client).await.map_err(unavailable)?;
        Ok(Self::new(connection))
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        let ttl_millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);

        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_millis)
            .query_async::<_, ()>(&mut connection)
            .await
            .map_err(unavailable)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut connection = self.connection.clone();
        connection
            .get::<_, Option<String>>(key)
            .await
            .map_err(unavailable)
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut connection = self.connection.clone();
        let removed: u64 = connection.del(key).await.map_err(unavailable)?;
        Ok(removed > 0)
    }
}

fn unavailable(err: RedisError) -> CacheError {
    tracing::error!(error = %err, "Redis session cache error");
    CacheError::Unavailable(err.to_string())
}
