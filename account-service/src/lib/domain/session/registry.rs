use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::SessionId;
use crate::domain::session::ports::SessionCache;
use crate::domain::user::models::EmailAddress;

const MIN_SESSION_TTL: Duration = Duration::from_secs(1);

/// Records which sessions are live.
///
/// A token is only honoured while its session id resolves here, which is what
/// makes logout and refresh rotation effective before the token expires.
pub struct SessionRegistry<C>
where
    C: SessionCache,
{
    cache: Arc<C>,
}

impl<C> SessionRegistry<C>
where
    C: SessionCache,
{
    pub fn new(cache: Arc<C>) -> Self {
        Self { cache }
    }

    /// Register a session that lives until `expires_at`.
    ///
    /// # Errors
    /// * `CacheUnavailable` - Cache write failed
    pub async fn register_session(
        &self,
        session_id: &SessionId,
        user_id: &EmailAddress,
        expires_at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        let ttl = (expires_at - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO)
            .max(MIN_SESSION_TTL);

        self.cache
            .set(&session_id.cache_key(), user_id.as_str(), ttl)
            .await?;

        Ok(())
    }

    /// Confirm a session is live.
    ///
    /// # Returns
    /// The user owning the session
    ///
    /// # Errors
    /// * `SessionNotFound` - Session is unknown, revoked, or expired
    /// * `CacheUnavailable` - Cache read failed
    pub async fn confirm_session(&self, session_id: &SessionId) -> Result<EmailAddress, SessionError> {
        let value = self
            .cache
            .get(&session_id.cache_key())
            .await?
            .ok_or(SessionError::SessionNotFound)?;

        EmailAddress::new(value).map_err(|e| {
            tracing::warn!(session = %session_id, error = %e, "Unreadable user id in session cache");
            SessionError::SessionNotFound
        })
    }

    /// Confirm a session and remove it in one step.
    ///
    /// Of several concurrent callers for the same session, only the one whose
    /// delete removed the entry succeeds.
    ///
    /// # Errors
    /// * `SessionNotFound` - Session is not live, or another caller consumed it first
    /// * `CacheUnavailable` - Cache access failed
    pub async fn consume_session(&self, session_id: &SessionId) -> Result<EmailAddress, SessionError> {
        let user_id = self.confirm_session(session_id).await?;

        if !self.cache.delete(&session_id.cache_key()).await? {
            return Err(SessionError::SessionNotFound);
        }

        Ok(user_id)
    }

    /// Revoke a session. Revoking an unknown session is not an error.
    ///
    /// # Errors
    /// * `CacheUnavailable` - Cache delete failed
    pub async fn revoke_session(&self, session_id: &SessionId) -> Result<(), SessionError> {
        self.cache.delete(&session_id.cache_key()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::cache::memory::InMemorySessionCache;

    fn alice() -> EmailAddress {
        EmailAddress::new("alice@example.com".to_string()).unwrap()
    }

    fn registry() -> (SessionRegistry<InMemorySessionCache>, Arc<InMemorySessionCache>) {
        let cache = Arc::new(InMemorySessionCache::new());
        (SessionRegistry::new(Arc::clone(&cache)), cache)
    }

    #[tokio::test]
    async fn test_register_and_confirm() {
        let (registry, _) = registry();
        let session_id = SessionId::from("sid-1".to_string());

        registry
            .register_session(&session_id, &alice(), Utc::now() + chrono::Duration::minutes(30))
            .await
            .unwrap();

        assert_eq!(registry.confirm_session(&session_id).await.unwrap(), alice());
    }

    #[tokio::test]
    async fn test_confirm_unknown_session() {
        let (registry, _) = registry();
        let result = registry
            .confirm_session(&SessionId::from("missing".to_string()))
            .await;
        assert_eq!(result, Err(SessionError::SessionNotFound));
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let (registry, _) = registry();
        let session_id = SessionId::from("sid-1".to_string());

        registry
            .register_session(&session_id, &alice(), Utc::now() + chrono::Duration::minutes(30))
            .await
            .unwrap();

        registry.revoke_session(&session_id).await.unwrap();
        registry.revoke_session(&session_id).await.unwrap();

        assert_eq!(
            registry.confirm_session(&session_id).await,
            Err(SessionError::SessionNotFound)
        );
    }

    #[tokio::test]
    async fn test_consume_session_only_once() {
        let (registry, _) = registry();
        let session_id = SessionId::from("sid-1".to_string());

        registry
            .register_session(&session_id, &alice(), Utc::now() + chrono::Duration::days(30))
            .await
            .unwrap();

        assert_eq!(registry.consume_session(&session_id).await.unwrap(), alice());
        assert_eq!(
            registry.consume_session(&session_id).await,
            Err(SessionError::SessionNotFound)
        );
    }

    #[tokio::test]
    async fn test_ttl_follows_token_expiry() {
        let (registry, cache) = registry();
        let session_id = SessionId::from("sid-1".to_string());

        registry
            .register_session(&session_id, &alice(), Utc::now() + chrono::Duration::minutes(30))
            .await
            .unwrap();

        let ttl = cache.ttl(&session_id.cache_key()).unwrap();
        assert!(ttl <= Duration::from_secs(30 * 60));
        assert!(ttl > Duration::from_secs(29 * 60));
    }

    #[tokio::test]
    async fn test_already_expired_token_gets_minimum_ttl() {
        let (registry, cache) = registry();
        let session_id = SessionId::from("sid-1".to_string());

        registry
            .register_session(&session_id, &alice(), Utc::now() - chrono::Duration::minutes(1))
            .await
            .unwrap();

        let ttl = cache.ttl(&session_id.cache_key()).unwrap();
        assert!(ttl <= MIN_SESSION_TTL);
    }

    #[tokio::test]
    async fn test_corrupt_cache_value_is_not_found() {
        let (registry, cache) = registry();
        let session_id = SessionId::from("sid-1".to_string());

        cache
            .set(&session_id.cache_key(), "not-an-email", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            registry.confirm_session(&session_id).await,
            Err(SessionError::SessionNotFound)
        );
    }
}
