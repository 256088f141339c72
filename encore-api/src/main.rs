use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use encore_api::{app, AppState, AuthConfig};
use encore_store::{memory, Config, DbClient, RedisClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encore_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Encore API on port {}", config.server.port);

    // Postgres when configured, process memory otherwise
    let db = match config.database.url.as_deref() {
        Some(url) => {
            let db = DbClient::new(url, config.database.max_connections)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            Some(db)
        }
        None => {
            tracing::warn!("No database configured, keeping data in memory");
            None
        }
    };
    let repos = db.as_ref().map(DbClient::repositories).unwrap_or_else(memory::repositories);

    let auth = AuthConfig {
        secret: config.auth.jwt_secret.clone(),
        expiration: config.auth.jwt_expiration_seconds,
    };
    let mut app_state = AppState::new(repos, auth, config.app.domain.clone());

    if let Some(url) = config.redis.url.as_deref() {
        let redis = RedisClient::new(url).await.context("Failed to connect to Redis")?;
        app_state = app_state.with_rate_limit(Arc::new(redis), config.limits.requests_per_minute);
    }

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        db.close().await;
    }
    tracing::info!("Encore API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
