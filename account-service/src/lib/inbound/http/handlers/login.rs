use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::TokenData;
use super::UserData;
use crate::domain::user::models::EmailAddress;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Login with credentials in the JSON body.
pub async fn login_with_body(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let Json(body) = body?;
    login(&state, body.email, &body.password).await
}

/// Login with `Authorization: Basic base64(email:password)`.
pub async fn login_with_basic(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let (email, password) = basic_credentials(&headers).ok_or_else(invalid_credentials)?;
    login(&state, email, &password).await
}

async fn login(
    state: &AppState,
    email: String,
    password: &str,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let email = EmailAddress::new(email).map_err(|_| invalid_credentials())?;

    let user = state
        .user_service
        .verify_credentials(&email, password)
        .await?;

    let tokens = state.session_service.start_session(&user.email).await?;

    tracing::info!(user = %user.email, "User logged in");

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData {
            user: (&user).into(),
            tokens: tokens.into(),
        },
    ))
}

fn invalid_credentials() -> ApiError {
    ApiError::from(UserError::InvalidCredentials)
}

/// Decode the Basic credentials of a request.
///
/// Returns None for a missing header, another scheme, bad base64, non UTF-8
/// content, or a payload without ':'.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (email, password) = decoded.split_once(':')?;
    Some((email.to_string(), password.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginResponseData {
    pub user: UserData,
    pub tokens: TokenData,
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_basic_credentials_decoded() {
        let encoded = STANDARD.encode("alice@example.com:pa:ss word");
        let credentials = basic_credentials(&headers_with(&format!("Basic {}", encoded)));
        assert_eq!(
            credentials,
            Some(("alice@example.com".to_string(), "pa:ss word".to_string()))
        );
    }

    #[test]
    fn test_basic_credentials_rejects_malformed_headers() {
        let no_colon = STANDARD.encode("alice@example.com");
        let bearer = STANDARD.encode("alice@example.com:secret123");

        assert_eq!(basic_credentials(&HeaderMap::new()), None);
        assert_eq!(basic_credentials(&headers_with(&format!("Bearer {}", bearer))), None);
        assert_eq!(basic_credentials(&headers_with("Basic !!not-base64!!")), None);
        assert_eq!(basic_credentials(&headers_with(&format!("Basic {}", no_colon))), None);
    }
}
