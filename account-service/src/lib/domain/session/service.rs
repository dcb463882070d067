use std::sync::Arc;

use async_trait::async_trait;
use auth::TokenIssuer;
use auth::TokenPurpose;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::AuthenticatedSession;
use crate::domain::session::models::IssuedTokens;
use crate::domain::session::models::SessionId;
use crate::domain::session::ports::SessionCache;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::session::registry::SessionRegistry;
use crate::domain::user::models::EmailAddress;

/// Domain service implementation for session operations.
///
/// Token issuance and session registration are a unit: tokens only leave
/// this service once both of their sessions are in the cache.
pub struct SessionService<C>
where
    C: SessionCache,
{
    issuer: Arc<TokenIssuer>,
    registry: SessionRegistry<C>,
}

impl<C> SessionService<C>
where
    C: SessionCache,
{
    /// Create a new session service.
    ///
    /// # Arguments
    /// * `issuer` - Token issuer holding the access and refresh secrets
    /// * `cache` - Session cache implementation
    pub fn new(issuer: Arc<TokenIssuer>, cache: Arc<C>) -> Self {
        Self {
            issuer,
            registry: SessionRegistry::new(cache),
        }
    }
}

#[async_trait]
impl<C> SessionServicePort for SessionService<C>
where
    C: SessionCache,
{
    async fn start_session(&self, user_id: &EmailAddress) -> Result<IssuedTokens, SessionError> {
        let pair = self.issuer.issue_token_pair(user_id.as_str())?;
        let access_session = SessionId::from(pair.access_session_id);
        let refresh_session = SessionId::from(pair.refresh_session_id);

        self.registry
            .register_session(&access_session, user_id, pair.access_expires_at)
            .await?;

        if let Err(e) = self
            .registry
            .register_session(&refresh_session, user_id, pair.refresh_expires_at)
            .await
        {
            if let Err(revoke_err) = self.registry.revoke_session(&access_session).await {
                tracing::warn!(
                    session = %access_session,
                    error = %revoke_err,
                    "Failed to roll back access session"
                );
            }
            return Err(e);
        }

        tracing::debug!(
            user = %user_id,
            access_session = %access_session,
            refresh_session = %refresh_session,
            "Session started"
        );

        Ok(IssuedTokens {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            access_expires_at: pair.access_expires_at,
            refresh_expires_at: pair.refresh_expires_at,
        })
    }

    async fn authorize(&self, access_token: &str) -> Result<AuthenticatedSession, SessionError> {
        let claims = self.issuer.validate(access_token, TokenPurpose::Access)?;
        let session_id = SessionId::from(claims.sid);
        let user_id = self.registry.confirm_session(&session_id).await?;

        if claims.sub != user_id.as_str() {
            tracing::warn!(
                session = %session_id,
                token_subject = %claims.sub,
                cached_user = %user_id,
                "Token subject differs from cached session owner"
            );
        }

        Ok(AuthenticatedSession {
            session_id,
            user_id,
        })
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<IssuedTokens, SessionError> {
        let claims = self.issuer.validate(refresh_token, TokenPurpose::Refresh)?;
        let session_id = SessionId::from(claims.sid);
        let user_id = self.registry.consume_session(&session_id).await?;

        tracing::debug!(user = %user_id, refresh_session = %session_id, "Refresh session consumed");

        self.start_session(&user_id).await
    }

    async fn end_session(
        &self,
        session: &AuthenticatedSession,
        refresh_token: Option<String>,
    ) -> Result<(), SessionError> {
        self.registry.revoke_session(&session.session_id).await?;

        if let Some(token) = refresh_token {
            match self.issuer.validate(&token, TokenPurpose::Refresh) {
                Ok(claims) => {
                    let refresh_session = SessionId::from(claims.sid);
                    match self.registry.confirm_session(&refresh_session).await {
                        Ok(owner) if owner == session.user_id => {
                            self.registry.revoke_session(&refresh_session).await?;
                        }
                        Ok(_) => {
                            tracing::warn!(
                                user = %session.user_id,
                                refresh_session = %refresh_session,
                                "Refusing to revoke refresh session owned by another user"
                            );
                        }
                        Err(SessionError::SessionNotFound) => {}
                        Err(e) => return Err(e),
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring invalid refresh token on logout");
                }
            }
        }

        tracing::debug!(user = %session.user_id, session = %session.session_id, "Session ended");

        Ok(())
    }
}
