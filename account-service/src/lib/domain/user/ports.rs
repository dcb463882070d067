use async_trait::async_trait;

use crate::domain::user::models::AccountSetupCommand;
use crate::domain::user::models::BankInstitution;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::StoredCredentials;
use crate::domain::user::models::UpdateProfileCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Arguments
    /// * `command` - Validated command containing email, name, and password
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `DuplicateUser` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Check a user's password.
    ///
    /// # Returns
    /// User entity when the password matches
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown user or wrong password (indistinguishable)
    /// * `DatabaseError` - Database operation failed
    async fn verify_credentials(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<User, UserError>;

    /// Retrieve user by email.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, email: &EmailAddress) -> Result<User, UserError>;

    /// Update profile fields.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_profile(
        &self,
        email: &EmailAddress,
        command: UpdateProfileCommand,
    ) -> Result<User, UserError>;

    /// Run the one-time account setup.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `SetupAlreadyComplete` - Setup has already been run
    /// * `DatabaseError` - Database operation failed
    async fn complete_setup(
        &self,
        email: &EmailAddress,
        command: AccountSetupCommand,
    ) -> Result<User, UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `DuplicateUser` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn insert(&self, new_user: NewUser) -> Result<User, UserError>;

    /// Retrieve user by email, without the password hash.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;

    /// Retrieve the stored password hash for an email.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserError>;

    /// Apply a partial update.
    ///
    /// # Returns
    /// Updated user entity
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_by_email(
        &self,
        email: &EmailAddress,
        changes: UserChanges,
    ) -> Result<User, UserError>;

    /// Store the setup banks and mark setup complete, only if it is not
    /// complete yet. The check and the write are one atomic step.
    ///
    /// # Returns
    /// Updated user entity
    ///
    /// # Errors
    /// * `SetupAlreadyComplete` - Setup was already completed, nothing is written
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn complete_setup_by_email(
        &self,
        email: &EmailAddress,
        banks: Vec<BankInstitution>,
    ) -> Result<User, UserError>;
}
