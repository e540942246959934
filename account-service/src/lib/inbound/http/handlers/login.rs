use auth::TokenPair;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::Credentials;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<TokenResponseData>, ApiError> {
    let Json(body) = body?;

    let tokens = state
        .user_service
        .login(Credentials {
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        "Login successfully",
        tokens.into(),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

/// Token pair as rendered to clients. The refresh token key contains a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenResponseData {
    pub token: String,
    #[serde(rename = "refresh token")]
    pub refresh_token: String,
}

impl From<TokenPair> for TokenResponseData {
    fn from(tokens: TokenPair) -> Self {
        Self {
            token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}
