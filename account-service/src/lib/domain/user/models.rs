use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::BankInstitutionError;
use crate::user::errors::DisplayNameError;
use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;

/// User aggregate entity.
///
/// The email address is the user's identity. The password hash is not part of
/// this type: it only exists in [`StoredCredentials`], which is loaded for the
/// password comparison at login and never leaves the domain.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub email: EmailAddress,
    pub name: DisplayName,
    pub created_at: DateTime<Utc>,
    pub setup_complete: bool,
    pub banks: Vec<BankInstitution>,
}

/// Email address type, doubling as the user identifier.
///
/// Validates email format using RFC 5322 compliant parser. Colons are rejected
/// because they delimit the identity from the password in Basic credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    /// * `ContainsCredentialDelimiter` - Email contains ':'
    pub fn new(email: String) -> Result<Self, EmailError> {
        if email.contains(':') {
            return Err(EmailError::ContainsCredentialDelimiter);
        }

        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name value type
///
/// Trimmed, non-empty, at most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    const MAX_LENGTH: usize = 100;

    pub fn new(name: String) -> Result<Self, DisplayNameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();

        if length == 0 {
            Err(DisplayNameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(DisplayNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext password accepted at registration.
///
/// Only carries the password to the hasher; it is never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;

    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        Ok(Self(password))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// A bank institution entered during account setup.
#[derive(Debug, Clone, PartialEq)]
pub struct BankInstitution {
    pub id: Uuid,
    pub name: String,
    pub institution_type: String,
    pub initial_amount: f64,
}

impl BankInstitution {
    /// Create a new institution with a fresh identifier.
    ///
    /// # Errors
    /// * `EmptyName` / `EmptyType` - Blank name or type
    /// * `InvalidAmount` - Amount is NaN or infinite
    pub fn new(
        name: String,
        institution_type: String,
        initial_amount: f64,
    ) -> Result<Self, BankInstitutionError> {
        let name = name.trim().to_string();
        let institution_type = institution_type.trim().to_string();

        if name.is_empty() {
            return Err(BankInstitutionError::EmptyName);
        }
        if institution_type.is_empty() {
            return Err(BankInstitutionError::EmptyType);
        }
        if !initial_amount.is_finite() {
            return Err(BankInstitutionError::InvalidAmount);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            institution_type,
            initial_amount,
        })
    }
}

/// Credential projection of a stored user, used only for login.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub email: EmailAddress,
    pub password_hash: String,
}

/// A user record ready to be inserted, with its hashed password.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user: User,
    pub password_hash: String,
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterUserCommand {
    pub email: EmailAddress,
    pub name: DisplayName,
    pub password: Password,
}

impl RegisterUserCommand {
    /// Construct a new register command.
    ///
    /// # Arguments
    /// * `email` - Validated email address
    /// * `name` - Validated display name
    /// * `password` - Plain text password (will be hashed by service)
    pub fn new(email: EmailAddress, name: DisplayName, password: Password) -> Self {
        Self {
            email,
            name,
            password,
        }
    }
}

/// Command to update a user's profile.
///
/// All fields are optional to support partial updates.
#[derive(Debug, Default)]
pub struct UpdateProfileCommand {
    pub name: Option<DisplayName>,
}

/// Command to complete the one-time account setup.
#[derive(Debug)]
pub struct AccountSetupCommand {
    pub banks: Vec<BankInstitution>,
}

/// Partial set of profile fields to change.
///
/// `None` leaves the stored value untouched. Setup state is not part of this:
/// it only changes through [`super::ports::UserRepository::complete_setup_by_email`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<DisplayName>,
}
