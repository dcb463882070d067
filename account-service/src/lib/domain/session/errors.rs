use auth::JwtError;
use thiserror::Error;

/// Error for session cache operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Session cache unavailable: {0}")]
    Unavailable(String),
}

/// Top-level error for session operations
///
/// Every variant except `CacheUnavailable` and `SigningFailed` means the
/// caller is not authorized; handlers must not tell them apart in responses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid token: {0}")]
    InvalidToken(JwtError),

    #[error("Session not found")]
    SessionNotFound,

    #[error("Session cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Token signing failed: {0}")]
    SigningFailed(String),
}

impl From<JwtError> for SessionError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::MissingSecret(msg) | JwtError::SigningFailed(msg) => {
                SessionError::SigningFailed(msg)
            }
            other => SessionError::InvalidToken(other),
        }
    }
}

impl From<CacheError> for SessionError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Unavailable(msg) => SessionError::CacheUnavailable(msg),
        }
    }
}
