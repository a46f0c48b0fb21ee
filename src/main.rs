//! Catalog Server
//!
//! Serves the library catalog pages and JSON API.
//!
//! `catalog-server hash-password <password>` prints an argon2 hash for the
//! `auth.accounts` configuration instead of starting the server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_server::{
    api,
    config::{AppConfig, DatabaseBackend, SessionBackend},
    repository::{memory::MemoryRepository, PgRepository, Repository},
    services::{
        auth::hash_password,
        notices::{MemoryNotices, NoticeStore, RedisNotices},
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("hash-password") {
        let password = args.next().context("usage: catalog-server hash-password <password>")?;
        println!("{}", hash_password(&password)?);
        return Ok(());
    }

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config);

    tracing::info!("Starting Catalog Server v{}", env!("CARGO_PKG_VERSION"));

    let repository: Repository = match config.database.backend {
        DatabaseBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .connect(&config.database.url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations completed");

            Arc::new(PgRepository::new(pool))
        }
        DatabaseBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on exit");
            Arc::new(MemoryRepository::new())
        }
    };

    let notices: Arc<dyn NoticeStore> = match config.sessions.backend {
        SessionBackend::Redis => {
            let notices = RedisNotices::new(&config.sessions.redis_url, config.sessions.notice_ttl_seconds)
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("Connected to Redis");
            Arc::new(notices)
        }
        SessionBackend::Memory => Arc::new(MemoryNotices::new(config.sessions.notice_ttl_seconds)),
    };

    if config.auth.accounts.is_empty() {
        tracing::warn!("No accounts configured, every write will be refused");
    }

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState::new(config, repository, notices)?;
    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("catalog_server={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
