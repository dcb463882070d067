use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::IssuedTokens;
use crate::domain::user::models::BankInstitution;
use crate::domain::user::models::User;
use crate::user::errors::UserError;

pub mod get_account;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;
pub mod setup_account;
pub mod update_account;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
}

impl ApiError {
    pub fn invalid_token() -> Self {
        ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(detail) => {
                tracing::error!(error = %detail, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidEmail(_)
            | UserError::InvalidName(_)
            | UserError::InvalidPassword(_)
            | UserError::InvalidBankInstitution(_) => ApiError::BadRequest(err.to_string()),
            UserError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            UserError::SetupAlreadyComplete(_) => ApiError::Forbidden(err.to_string()),
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::DuplicateUser(_) => ApiError::Conflict(err.to_string()),
            UserError::Password(_) | UserError::DatabaseError(_) | UserError::Unknown(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidToken(ref e) => {
                tracing::debug!(error = %e, "Token rejected");
                ApiError::invalid_token()
            }
            SessionError::SessionNotFound => {
                tracing::debug!("Token refers to a session that is not live");
                ApiError::invalid_token()
            }
            SessionError::CacheUnavailable(_) | SessionError::SigningFailed(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Outbound representation of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserData {
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub setup_complete: bool,
    pub banks: Vec<BankData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankData {
    pub id: String,
    pub institution_name: String,
    pub institution_type: String,
    pub initial_amount: f64,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.as_str().to_string(),
            name: user.name.as_str().to_string(),
            created_at: user.created_at,
            setup_complete: user.setup_complete,
            banks: user.banks.iter().map(BankData::from).collect(),
        }
    }
}

impl From<&BankInstitution> for BankData {
    fn from(bank: &BankInstitution) -> Self {
        Self {
            id: bank.id.to_string(),
            institution_name: bank.name.clone(),
            institution_type: bank.institution_type.clone(),
            initial_amount: bank.initial_amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl From<IssuedTokens> for TokenData {
    fn from(tokens: IssuedTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            access_expires_at: tokens.access_expires_at,
            refresh_expires_at: tokens.refresh_expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use auth::JwtError;
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response =
            ApiError::from(UserError::DatabaseError("connection refused on 10.0.0.3".into()))
                .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["status_code"], 500);
        assert_eq!(body["data"]["message"], "Internal server error");
    }

    #[test]
    fn test_user_error_status_mapping() {
        assert!(matches!(
            ApiError::from(UserError::DuplicateUser("a@b.co".into())),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::SetupAlreadyComplete("a@b.co".into())),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::NotFound("a@b.co".into())),
            ApiError::NotFound(_)
        ));
        assert_eq!(
            ApiError::from(UserError::InvalidCredentials),
            ApiError::Unauthorized("Invalid credentials".to_string())
        );
    }

    #[test]
    fn test_session_errors_are_indistinguishable_to_clients() {
        let expired = ApiError::from(SessionError::InvalidToken(JwtError::Expired));
        let forged = ApiError::from(SessionError::InvalidToken(JwtError::SignatureMismatch));
        let revoked = ApiError::from(SessionError::SessionNotFound);

        assert_eq!(expired, ApiError::invalid_token());
        assert_eq!(forged, ApiError::invalid_token());
        assert_eq!(revoked, ApiError::invalid_token());
        assert!(matches!(
            ApiError::from(SessionError::CacheUnavailable("down".into())),
            ApiError::InternalServerError(_)
        ));
    }
}
