use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::TokenData;
use crate::inbound::http::middleware::bearer_token;
use crate::inbound::http::router::AppState;

/// Exchange the refresh token in the Authorization header for a new pair.
///
/// The presented refresh token stops working once this succeeds.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiSuccess<TokenData>, ApiError> {
    let refresh_token = bearer_token(&headers)?;

    let tokens = state.session_service.refresh_session(refresh_token).await?;

    Ok(ApiSuccess::new(StatusCode::OK, tokens.into()))
}
