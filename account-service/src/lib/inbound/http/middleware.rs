use std::ops::Deref;

use auth::Identity;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Header carrying the raw access token (no `Bearer` prefix).
pub const TOKEN_HEADER: &str = "token";

/// Identity recovered from a valid access token, stored in request extensions
#[derive(Debug, Clone)]
pub struct RequestIdentity(pub Identity);

impl Deref for RequestIdentity {
    type Target = Identity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Middleware that validates the access token and attaches the caller's identity.
///
/// Rejections never reach the wrapped handler.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)?;

    let claims = state
        .authenticator
        .validate_access_token(token)
        .map_err(|e| {
            tracing::warn!(reason = %e, "Access token rejected");
            ApiError::Unauthorized(e.to_string()).into_response()
        })?;

    tracing::debug!(uid = %claims.identity.uid, role = %claims.identity.role, "Request authenticated");

    req.extensions_mut()
        .insert(RequestIdentity(claims.identity));

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let missing =
        || ApiError::Unauthorized("No Authorization header provided".to_string()).into_response();

    let header = req.headers().get(TOKEN_HEADER).ok_or_else(missing)?;

    let token = header.to_str().map_err(|_| {
        ApiError::Unauthorized("Invalid Authorization header".to_string()).into_response()
    })?;

    if token.is_empty() {
        return Err(missing());
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use auth::Authenticator;
    use auth::Role;
    use axum::body::Body;
    use axum::http::Request;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::user::service::UserService;
    use crate::inbound::http::router::create_router;
    use crate::outbound::repositories::InMemoryUserRepository;

    const SECRET: &[u8] = b"middleware-test-secret-key-32-bytes!";

    fn app() -> (axum::Router, Arc<Authenticator>) {
        let authenticator = Arc::new(Authenticator::new(SECRET));
        let user_service = Arc::new(UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::clone(&authenticator),
            Duration::from_secs(5),
        ));
        (
            create_router(user_service, Arc::clone(&authenticator)),
            authenticator,
        )
    }

    fn identity(role: Role) -> Identity {
        Identity {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            uid: "11111111-1111-4111-8111-111111111111".to_string(),
            role,
        }
    }

    async fn error_of(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        body["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_missing_and_empty_header_are_rejected() {
        let (router, _) = app();

        for request in [
            Request::get("/users").body(Body::empty()).unwrap(),
            Request::get("/users")
                .header(TOKEN_HEADER, "")
                .body(Body::empty())
                .unwrap(),
        ] {
            let response = router.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(error_of(response).await, "No Authorization header provided");
        }
    }

    #[tokio::test]
    async fn test_foreign_signature_is_rejected() {
        let (router, _) = app();
        let foreign = Authenticator::new(b"some-other-secret-key-of-32-bytes!!")
            .issue_tokens(&identity(Role::Admin))
            .unwrap();

        let response = router
            .oneshot(
                Request::get("/users")
                    .header(TOKEN_HEADER, foreign.access_token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_of(response).await, "Token signature is invalid");
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let (router, authenticator) = app();
        let tokens = authenticator.issue_tokens(&identity(Role::Admin)).unwrap();

        let response = router
            .oneshot(
                Request::get("/users")
                    .header(TOKEN_HEADER, tokens.access_token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_bearer_prefix_is_not_stripped() {
        let (router, authenticator) = app();
        let tokens = authenticator.issue_tokens(&identity(Role::Admin)).unwrap();

        let response = router
            .oneshot(
                Request::get("/users")
                    .header(TOKEN_HEADER, format!("Bearer {}", tokens.access_token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
