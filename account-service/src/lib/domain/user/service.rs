use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use chrono::Utc;
use tokio::sync::OnceCell;

use crate::domain::user::models::AccountSetupCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateProfileCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Plaintext behind the hash that unknown-user logins are verified against.
const UNKNOWN_USER_PASSWORD: &str = "unknown-user-placeholder";

/// Domain service implementation for user operations.
///
/// Password hashing and verification are CPU-bound and run on the blocking
/// thread pool.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: PasswordHasher,
    unknown_user_hash: OnceCell<String>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `password_hasher` - Hasher configured with the deployment's cost
    pub fn new(repository: Arc<UR>, password_hasher: PasswordHasher) -> Self {
        Self {
            repository,
            password_hasher,
            unknown_user_hash: OnceCell::new(),
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, UserError> {
        let hasher = self.password_hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(UserError::from)
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, UserError> {
        let hasher = self.password_hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))?
            .map_err(UserError::from)
    }

    /// Run a full verification for an email with no account, so that a login
    /// for an unknown user costs the same as one with a wrong password.
    async fn verify_unknown_user(&self, password: &str) -> Result<(), UserError> {
        let hash = self
            .unknown_user_hash
            .get_or_try_init(|| self.hash_password(UNKNOWN_USER_PASSWORD.to_string()))
            .await?
            .clone();

        self.verify_password(password.to_string(), hash).await?;
        Ok(())
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        let password_hash = self
            .hash_password(command.password.expose().to_string())
            .await?;

        let user = User {
            email: command.email,
            name: command.name,
            created_at: Utc::now(),
            setup_complete: false,
            banks: Vec::new(),
        };

        let created_user = self
            .repository
            .insert(NewUser {
                user,
                password_hash,
            })
            .await?;

        tracing::info!(user = %created_user.email, "User registered");

        Ok(created_user)
    }

    async fn verify_credentials(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<User, UserError> {
        let credentials = match self.repository.find_credentials(email).await? {
            Some(credentials) => credentials,
            None => {
                tracing::debug!(user = %email, "Login attempt for unknown user");
                self.verify_unknown_user(password).await?;
                return Err(UserError::InvalidCredentials);
            }
        };

        let matches = self
            .verify_password(password.to_string(), credentials.password_hash)
            .await?;
        if !matches {
            tracing::debug!(user = %email, "Login attempt with wrong password");
            return Err(UserError::InvalidCredentials);
        }

        self.repository
            .find_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)
    }

    async fn get_user(&self, email: &EmailAddress) -> Result<User, UserError> {
        self.repository
            .find_by_email(email)
            .await?
            .ok_or(UserError::NotFound(email.to_string()))
    }

    async fn update_profile(
        &self,
        email: &EmailAddress,
        command: UpdateProfileCommand,
    ) -> Result<User, UserError> {
        let changes = UserChanges { name: command.name };

        self.repository.update_by_email(email, changes).await
    }

    async fn complete_setup(
        &self,
        email: &EmailAddress,
        command: AccountSetupCommand,
    ) -> Result<User, UserError> {
        let updated_user = self
            .repository
            .complete_setup_by_email(email, command.banks)
            .await?;
        tracing::info!(
            user = %updated_user.email,
            banks = updated_user.banks.len(),
            "Account setup completed"
        );

        Ok(updated_user)
    }
}
