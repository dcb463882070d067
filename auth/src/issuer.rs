use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::SessionClaims;
use crate::jwt::TokenPurpose;

/// Default access token lifetime.
pub const DEFAULT_ACCESS_TOKEN_LIFETIME_MINUTES: i64 = 30;

/// Default refresh token lifetime.
pub const DEFAULT_REFRESH_TOKEN_LIFETIME_DAYS: i64 = 30;

/// Issues and validates access/refresh token pairs.
///
/// Each purpose has its own signing secret, so a refresh token can never be
/// verified as an access token and vice versa. The issuer is pure: it never
/// touches session state.
pub struct TokenIssuer {
    access: JwtHandler,
    refresh: JwtHandler,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

/// Freshly issued access and refresh tokens with their session metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_session_id: String,
    pub refresh_session_id: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl TokenIssuer {
    /// Create an issuer with the default lifetimes (30 minutes / 30 days).
    ///
    /// # Arguments
    /// * `access_secret` - Secret for access tokens
    /// * `refresh_secret` - Secret for refresh tokens, must differ from `access_secret`
    ///
    /// # Errors
    /// * `MissingSecret` - A secret is empty, or both secrets are identical
    pub fn new(access_secret: &[u8], refresh_secret: &[u8]) -> Result<Self, JwtError> {
        if access_secret == refresh_secret {
            return Err(JwtError::MissingSecret(
                "access and refresh secrets must differ".to_string(),
            ));
        }

        Ok(Self {
            access: JwtHandler::new(access_secret)?,
            refresh: JwtHandler::new(refresh_secret)?,
            access_lifetime: Duration::minutes(DEFAULT_ACCESS_TOKEN_LIFETIME_MINUTES),
            refresh_lifetime: Duration::days(DEFAULT_REFRESH_TOKEN_LIFETIME_DAYS),
        })
    }

    /// Override token lifetimes.
    pub fn with_lifetimes(mut self, access: Duration, refresh: Duration) -> Self {
        self.access_lifetime = access;
        self.refresh_lifetime = refresh;
        self
    }

    pub fn access_lifetime(&self) -> Duration {
        self.access_lifetime
    }

    pub fn refresh_lifetime(&self) -> Duration {
        self.refresh_lifetime
    }

    /// Issue a new token pair for a user.
    ///
    /// # Errors
    /// * `SigningFailed` - Token signing failed
    pub fn issue_token_pair(&self, user_id: &str) -> Result<TokenPair, JwtError> {
        self.issue_token_pair_at(user_id, Utc::now())
    }

    /// Issue a new token pair as if the current time were `now`.
    pub fn issue_token_pair_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, JwtError> {
        let access_claims = SessionClaims::new(
            TokenPurpose::Access,
            Uuid::new_v4(),
            user_id,
            now,
            self.access_lifetime,
        );
        let refresh_claims = SessionClaims::new(
            TokenPurpose::Refresh,
            Uuid::new_v4(),
            user_id,
            now,
            self.refresh_lifetime,
        );

        let access_token = self.access.encode(&access_claims)?;
        let refresh_token = self.refresh.encode(&refresh_claims)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at: access_claims.expires_at(),
            refresh_expires_at: refresh_claims.expires_at(),
            access_session_id: access_claims.sid,
            refresh_session_id: refresh_claims.sid,
        })
    }

    /// Validate a raw token for the expected purpose.
    ///
    /// # Errors
    /// * `MalformedToken` - Token cannot be parsed
    /// * `SignatureMismatch` - Not signed with the secret of `expected`
    /// * `PurposeMismatch` - Purpose claim differs from `expected`
    /// * `Expired` - Token is past its expiry
    pub fn validate(&self, token: &str, expected: TokenPurpose) -> Result<SessionClaims, JwtError> {
        self.validate_at(token, expected, Utc::now())
    }

    /// Validate a raw token as if the current time were `now`.
    pub fn validate_at(
        &self,
        token: &str,
        expected: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims, JwtError> {
        let claims: SessionClaims = self.handler_for(expected).decode(token)?;

        if claims.typ != expected {
            return Err(JwtError::PurposeMismatch {
                expected: expected.to_string(),
                actual: claims.typ.to_string(),
            });
        }

        if claims.is_expired(now.timestamp()) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }

    fn handler_for(&self, purpose: TokenPurpose) -> &JwtHandler {
        match purpose {
            TokenPurpose::Access => &self.access,
            TokenPurpose::Refresh => &self.refresh,
        }
    }
}
