use std::sync::Arc;
use std::time::Duration;

use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::InMemoryUserRepository;
use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenCodec;
use auth::TokenLifetimes;
use auth::WorkFactor;
use serde_json::json;
use serde_json::Value;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server over the in-memory store
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub codec: TokenCodec,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let password_hasher = PasswordHasher::with_work_factor(WorkFactor {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to build password hasher");

        let authenticator = Arc::new(Authenticator::with_settings(
            TEST_SECRET,
            TokenLifetimes::default(),
            password_hasher,
        ));

        let user_service = Arc::new(UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::clone(&authenticator),
            Duration::from_secs(5),
        ));

        let router = create_router(user_service, authenticator);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            codec: TokenCodec::new(TEST_SECRET),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request carrying an access token in the `token` header
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).header("token", token)
    }

    /// Register a user and return the new user id
    pub async fn register(&self, email: &str, password: &str, user_type: &str) -> String {
        let response = self
            .post("/users/register")
            .json(&json!({
                "email": email,
                "password": password,
                "first_name": "Grace",
                "last_name": "Hopper",
                "user_type": user_type
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["user_id"].as_str().unwrap().to_string()
    }

    /// Log in and return the (access, refresh) token strings
    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let response = self
            .post("/users/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.expect("Failed to parse response");
        (
            body["token"].as_str().unwrap().to_string(),
            body["refresh token"].as_str().unwrap().to_string(),
        )
    }
}
