use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use crate::domain::session::models::AuthenticatedSession;
use crate::inbound::http::router::AppState;

pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<AuthenticatedSession>,
    body: Option<Json<LogoutRequest>>,
) -> Result<StatusCode, ApiError> {
    let refresh_token = body.and_then(|Json(body)| body.refresh_token);

    state
        .session_service
        .end_session(&session, refresh_token)
        .await?;

    tracing::info!(user = %session.user_id, "User logged out");

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogoutRequest {
    refresh_token: Option<String>,
}
