//! Authentication utilities library
//!
//! Provides the session-token and credential primitives used by the account
//! service:
//! - Password hashing (Argon2id, adjustable cost)
//! - Typed session claims and HS256 signing
//! - Access/refresh token pair issuance and validation with separate secrets
//!
//! Session state (which session ids are still live) is not kept here; the
//! service pairs these primitives with its own session cache.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::with_cost(1024, 1, 1).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Token Pairs
//! ```
//! use auth::{TokenIssuer, TokenPurpose};
//!
//! let issuer = TokenIssuer::new(
//!     b"access_secret_key_at_least_32_bytes!",
//!     b"refresh_secret_key_at_least_32_bytes",
//! )
//! .unwrap();
//!
//! let pair = issuer.issue_token_pair("alice@example.com").unwrap();
//! let claims = issuer.validate(&pair.access_token, TokenPurpose::Access).unwrap();
//! assert_eq!(claims.sid, pair.access_session_id);
//!
//! // A refresh token is never accepted where an access token is expected
//! assert!(issuer.validate(&pair.refresh_token, TokenPurpose::Access).is_err());
//! ```

pub mod issuer;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use issuer::TokenIssuer;
pub use issuer::TokenPair;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SessionClaims;
pub use jwt::TokenPurpose;
pub use password::PasswordError;
pub use password::PasswordHasher;
