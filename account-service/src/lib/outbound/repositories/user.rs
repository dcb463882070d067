use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::models::BankInstitution;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::StoredCredentials;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Stored shape of a user, without the password hash.
#[derive(Debug, FromRow)]
struct UserRow {
    email: String,
    name: String,
    created_at: DateTime<Utc>,
    setup_complete: bool,
    banks: Json<Vec<BankRow>>,
}

#[derive(Debug, FromRow)]
struct CredentialsRow {
    email: String,
    password_hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct BankRow {
    id: Uuid,
    institution_name: String,
    institution_type: String,
    initial_amount: f64,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            email: EmailAddress::new(row.email)?,
            name: DisplayName::new(row.name)?,
            created_at: row.created_at,
            setup_complete: row.setup_complete,
            banks: row.banks.0.into_iter().map(BankInstitution::from).collect(),
        })
    }
}

impl From<BankRow> for BankInstitution {
    fn from(row: BankRow) -> Self {
        BankInstitution {
            id: row.id,
            name: row.institution_name,
            institution_type: row.institution_type,
            initial_amount: row.initial_amount,
        }
    }
}

impl From<&BankInstitution> for BankRow {
    fn from(bank: &BankInstitution) -> Self {
        BankRow {
            id: bank.id,
            institution_name: bank.name.clone(),
            institution_type: bank.institution_type.clone(),
            initial_amount: bank.initial_amount,
        }
    }
}

fn bank_rows(banks: &[BankInstitution]) -> Json<Vec<BankRow>> {
    Json(banks.iter().map(BankRow::from).collect())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, new_user: NewUser) -> Result<User, UserError> {
        let user = new_user.user;

        sqlx::query(
            r#"
            INSERT INTO users (email, name, password_hash, created_at, setup_complete, banks)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.email.as_str())
        .bind(user.name.as_str())
        .bind(&new_user.password_hash)
        .bind(user.created_at)
        .bind(user.setup_complete)
        .bind(bank_rows(&user.banks))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return UserError::DuplicateUser(user.email.to_string());
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT email, name, created_at, setup_complete, banks
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            SELECT email, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(StoredCredentials {
                email: EmailAddress::new(r.email)?,
                password_hash: r.password_hash,
            })),
            None => Ok(None),
        }
    }

    async fn update_by_email(
        &self,
        email: &EmailAddress,
        changes: UserChanges,
    ) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name)
            WHERE email = $1
            RETURNING email, name, created_at, setup_complete, banks
            "#,
        )
        .bind(email.as_str())
        .bind(changes.name.as_ref().map(DisplayName::as_str))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        match row {
            Some(r) => User::try_from(r),
            None => Err(UserError::NotFound(email.to_string())),
        }
    }

    async fn complete_setup_by_email(
        &self,
        email: &EmailAddress,
        banks: Vec<BankInstitution>,
    ) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET setup_complete = TRUE,
                banks = $2
            WHERE email = $1 AND setup_complete = FALSE
            RETURNING email, name, created_at, setup_complete, banks
            "#,
        )
        .bind(email.as_str())
        .bind(bank_rows(&banks))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if let Some(r) = row {
            return User::try_from(r);
        }

        // No row updated: either the user is missing or setup already ran
        match self.find_by_email(email).await? {
            Some(_) => Err(UserError::SetupAlreadyComplete(email.to_string())),
            None => Err(UserError::NotFound(email.to_string())),
        }
    }
}
