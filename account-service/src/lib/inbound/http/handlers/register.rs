use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::parse_role;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::RegisterUserCommand;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    let Json(body) = body?;

    state
        .user_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|user| {
            ApiSuccess::new(
                StatusCode::CREATED,
                "register successfully",
                RegisterResponseData {
                    user_id: user.id.to_string(),
                },
            )
        })
}

/// HTTP request body for registration (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    user_type: String,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterUserCommand, UserError> {
        Ok(RegisterUserCommand {
            email: EmailAddress::new(self.email)?,
            password: Password::new(self.password)?,
            first_name: PersonName::first(self.first_name)?,
            last_name: PersonName::last(self.last_name)?,
            role: parse_role(&self.user_type)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub user_id: String,
}
