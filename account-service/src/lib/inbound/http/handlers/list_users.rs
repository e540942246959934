use auth::AccessPolicy;
use auth::Role;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::inbound::http::middleware::RequestIdentity;
use crate::inbound::http::router::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
) -> Result<ApiSuccess<ListUsersResponseData>, ApiError> {
    AccessPolicy::require_role(&identity, Role::Admin)?;

    let users = state.user_service.list_users().await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        "Users retrieved successfully",
        ListUsersResponseData {
            users: users.iter().map(UserData::from).collect(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListUsersResponseData {
    pub users: Vec<UserData>,
}
