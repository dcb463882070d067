use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// What a token may be used for.
///
/// Access and refresh tokens are signed with different secrets; the purpose is
/// also carried in the `typ` claim so a token can never be accepted for the
/// other use, even if both secrets were to leak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Access,
    Refresh,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Access => "access",
            TokenPurpose::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims embedded in every session token.
///
/// All fields are required: decoding fails if any is missing, so consumers
/// never have to inspect an untyped claim map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Token purpose
    pub typ: TokenPurpose,

    /// Session identifier, also the session cache key
    pub sid: String,

    /// Subject (owning user identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Create claims for a session that expires `lifetime` after `issued_at`.
    ///
    /// # Arguments
    /// * `purpose` - Access or refresh
    /// * `session_id` - Random session identifier
    /// * `user_id` - Owning user identifier
    /// * `issued_at` - Issuance instant
    /// * `lifetime` - Validity duration
    pub fn new(
        purpose: TokenPurpose,
        session_id: impl ToString,
        user_id: impl ToString,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            typ: purpose,
            sid: session_id.to_string(),
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + lifetime).timestamp(),
        }
    }

    /// Expiration as a UTC instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Check if token is expired.
    ///
    /// A token is still valid during its `exp` second.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}
