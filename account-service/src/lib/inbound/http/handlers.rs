use auth::AuthzError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::user::models::User;
use crate::user::errors::UserError;

pub mod get_user;
pub mod list_users;
pub mod login;
pub mod refresh;
pub mod register;

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
    pub fn new(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, message, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Failure taxonomy of the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, Json(ApiErrorBody::new(status, message))).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidUserId(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidName(_)
            | UserError::InvalidPassword(_)
            | UserError::InvalidRole(_) => ApiError::BadRequest(err.to_string()),
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::EmailAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            UserError::InvalidCredentials | UserError::InvalidRefreshToken => {
                ApiError::Unauthorized(err.to_string())
            }
            UserError::Hashing(_)
            | UserError::TokenIssue(_)
            | UserError::DatabaseError(_)
            | UserError::Timeout(_)
            | UserError::Unknown(_) => {
                tracing::error!(error = %err, "Request failed with an internal error");
                ApiError::InternalServerError("internal server error".to_string())
            }
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status: u16,
    message: String,
    #[serde(flatten)]
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    pub status: u16,
    pub error: String,
}

impl ApiErrorBody {
    pub fn new(status: StatusCode, error: String) -> Self {
        Self {
            status: status.as_u16(),
            error,
        }
    }
}

/// Public view of a user record; never includes the hash or tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            first_name: user.first_name.as_str().to_string(),
            last_name: user.last_name.as_str().to_string(),
            user_type: user.role.to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::errors::EmailError;

    #[test]
    fn test_user_error_status_mapping() {
        let cases = [
            (
                UserError::InvalidEmail(EmailError::InvalidFormat("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (UserError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (UserError::InvalidRefreshToken, StatusCode::UNAUTHORIZED),
            (
                UserError::EmailAlreadyExists("a@example.com".into()),
                StatusCode::CONFLICT,
            ),
            (UserError::NotFound("id".into()), StatusCode::NOT_FOUND),
            (
                UserError::DatabaseError("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (UserError::Timeout(100), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            let response = ApiError::from(error).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let error = ApiError::from(UserError::DatabaseError("password=hunter2".into()));
        assert_eq!(
            error,
            ApiError::InternalServerError("internal server error".to_string())
        );
    }

    #[test]
    fn test_credential_message_is_generic() {
        assert_eq!(
            ApiError::from(UserError::InvalidCredentials),
            ApiError::Unauthorized("email or password is incorrect".to_string())
        );
    }

    #[test]
    fn test_success_body_flattens_data() {
        #[derive(Debug, Clone, PartialEq, Serialize)]
        struct Data {
            token: String,
        }

        let body = ApiResponseBody::new(
            StatusCode::OK,
            "Login successfully",
            Data {
                token: "abc".to_string(),
            },
        );
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["status"], 200);
        assert_eq!(value["message"], "Login successfully");
        assert_eq!(value["token"], "abc");
    }
}
