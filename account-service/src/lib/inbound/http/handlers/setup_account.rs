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
use crate::domain::user::models::AccountSetupCommand;
use crate::domain::user::models::BankInstitution;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// HTTP request body for the one-time account setup (raw JSON)
#[derive(Debug, Deserialize)]
pub struct SetupAccountRequest {
    pub banks: Vec<BankRequest>,
}

#[derive(Debug, Deserialize)]
pub struct BankRequest {
    pub institution_name: String,
    pub institution_type: String,
    pub initial_amount: f64,
}

impl SetupAccountRequest {
    fn try_into_command(self) -> Result<AccountSetupCommand, UserError> {
        let banks = self
            .banks
            .into_iter()
            .map(|bank| {
                BankInstitution::new(
                    bank.institution_name,
                    bank.institution_type,
                    bank.initial_amount,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AccountSetupCommand { banks })
    }
}

pub async fn setup_account(
    State(state): State<AppState>,
    Extension(session): Extension<AuthenticatedSession>,
    body: Result<Json<SetupAccountRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let Json(req) = body?;
    let command = req.try_into_command()?;

    state
        .user_service
        .complete_setup(&session.user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
