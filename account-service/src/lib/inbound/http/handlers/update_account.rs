use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::session::models::AuthenticatedSession;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::UpdateProfileCommand;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// HTTP request body for updating the profile (raw JSON)
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
}

impl UpdateAccountRequest {
    fn try_into_command(self) -> Result<UpdateProfileCommand, UserError> {
        let name = self.name.map(DisplayName::new).transpose()?;
        Ok(UpdateProfileCommand { name })
    }
}

pub async fn update_account(
    State(state): State<AppState>,
    Extension(session): Extension<AuthenticatedSession>,
    body: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let Json(req) = body?;
    let command = req.try_into_command()?;

    state
        .user_service
        .update_profile(&session.user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
