use std::time::Duration;

use async_trait::async_trait;

use crate::domain::session::errors::CacheError;
use crate::domain::session::errors::SessionError;
use crate::domain::session::models::AuthenticatedSession;
use crate::domain::session::models::IssuedTokens;
use crate::domain::user::models::EmailAddress;

/// Expiring key-value store holding live sessions.
///
/// Each operation is atomic on its key; no multi-key transactions are needed.
#[async_trait]
pub trait SessionCache: Send + Sync + 'static {
    /// Store `value` under `key`, expiring after `ttl`.
    ///
    /// # Errors
    /// * `Unavailable` - Cache could not be reached
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Fetch the live value for `key`.
    ///
    /// # Returns
    /// None if the key is absent or expired
    ///
    /// # Errors
    /// * `Unavailable` - Cache could not be reached
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Remove `key`.
    ///
    /// # Returns
    /// True if this call removed a live entry
    ///
    /// # Errors
    /// * `Unavailable` - Cache could not be reached
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;
}

/// Port for session lifecycle operations.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Issue a token pair for an authenticated user and register both sessions.
    ///
    /// # Errors
    /// * `SigningFailed` - Tokens could not be signed
    /// * `CacheUnavailable` - Sessions could not be registered; no tokens are returned
    async fn start_session(&self, user_id: &EmailAddress) -> Result<IssuedTokens, SessionError>;

    /// Resolve an access token to a live session.
    ///
    /// # Errors
    /// * `InvalidToken` - Token is malformed, forged, of the wrong purpose, or expired
    /// * `SessionNotFound` - Session was revoked or has expired in the cache
    /// * `CacheUnavailable` - Cache could not be reached
    async fn authorize(&self, access_token: &str) -> Result<AuthenticatedSession, SessionError>;

    /// Exchange a refresh token for a new token pair.
    ///
    /// The presented refresh session is consumed, so each refresh token works once.
    ///
    /// # Errors
    /// * `InvalidToken` - Token is not a valid refresh token
    /// * `SessionNotFound` - Refresh token was already used or revoked
    /// * `SigningFailed` / `CacheUnavailable` - Server-side failure
    async fn refresh_session(&self, refresh_token: &str) -> Result<IssuedTokens, SessionError>;

    /// Revoke the current access session, and the given refresh session if it
    /// belongs to the same user.
    ///
    /// # Errors
    /// * `CacheUnavailable` - Cache could not be reached
    async fn end_session(
        &self,
        session: &AuthenticatedSession,
        refresh_token: Option<String>,
    ) -> Result<(), SessionError>;
}
