use std::sync::Arc;

use account_service::config::Config;
use account_service::domain::user::ports::UserServicePort;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::InMemoryUserRepository;
use account_service::outbound::repositories::PostgresUserRepository;
use auth::Authenticator;
use auth::PasswordHasher;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        store = if config.database.url.is_some() { "postgresql" } else { "memory" },
        access_token_hours = config.jwt.access_token_hours,
        refresh_token_hours = config.jwt.refresh_token_hours,
        store_timeout_secs = config.store.timeout_secs,
        "Configuration loaded"
    );

    let password_hasher = PasswordHasher::with_work_factor(config.password)?;
    let authenticator = Arc::new(Authenticator::with_settings(
        config.jwt.secret.as_bytes(),
        config.jwt.lifetimes(),
        password_hasher,
    ));

    let user_service: Arc<dyn UserServicePort> = match &config.database.url {
        Some(url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            Arc::new(UserService::new(
                Arc::new(PostgresUserRepository::new(pg_pool)),
                Arc::clone(&authenticator),
                config.store.timeout(),
            ))
        }
        None => {
            tracing::warn!("No database url configured, using the in-memory store");
            Arc::new(UserService::new(
                Arc::new(InMemoryUserRepository::new()),
                Arc::clone(&authenticator),
                config.store.timeout(),
            ))
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, authenticator);
    axum::serve(http_listener, http_application).await?;

    Ok(())
}
