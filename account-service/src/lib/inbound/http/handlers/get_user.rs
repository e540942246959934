use auth::AccessPolicy;
use auth::Role;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::UserId;
use crate::inbound::http::middleware::RequestIdentity;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Owners may read their own record; admins may read any.
pub async fn get_user(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<GetUserResponseData>, ApiError> {
    AccessPolicy::require_owner_or_role(&identity, &user_id, Role::Admin)?;

    let user_id = UserId::from_string(&user_id).map_err(UserError::from)?;

    state
        .user_service
        .get_user(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| {
            ApiSuccess::new(
                StatusCode::OK,
                "User retrieved successfully",
                GetUserResponseData { user: user.into() },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetUserResponseData {
    pub user: UserData,
}
