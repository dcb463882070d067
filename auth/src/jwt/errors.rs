use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Signing secret is missing or unusable: {0}")]
    MissingSecret(String),

    #[error("Failed to sign token: {0}")]
    SigningFailed(String),

    #[error("Token is malformed: {0}")]
    MalformedToken(String),

    #[error("Token signature does not match")]
    SignatureMismatch,

    #[error("Token purpose mismatch: expected {expected}, got {actual}")]
    PurposeMismatch { expected: String, actual: String },

    #[error("Token is expired")]
    Expired,
}
