//! Tipster Backend Service
//!
//! Main entry point for the Tipster score prediction backend.
//! This service provides:
//! - REST API for groups, fixtures, bets and comments
//! - Points standings per group, recomputed whenever a result is submitted

use std::net::SocketAddr;
use std::sync::Arc;
use tipster_backend::config::{AppConfig, LogFormat};
use tipster_backend::database::{create_pool, run_migrations};
use tipster_backend::error::{AppError, AppResult};
use tipster_backend::{api, AppState};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "tipster_backend={},sqlx=warn,tower_http=info",
            config.log_level
        )
        .into()
    });
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Tipster Backend Service Starting                ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("HTTP port: {}", config.http_port);

    // =========================================================================
    // STORAGE SETUP
    // =========================================================================
    let state = match &config.database {
        Some(db_config) => {
            info!("Connecting to database...");

            let pool = create_pool(db_config).await.map_err(|e| {
                error!("Failed to create database pool: {}", e);
                AppError::Database(e)
            })?;

            info!("Database connection pool created successfully");
            info!("Max connections: {}", db_config.max_connections);

            // Run migrations
            info!("Running database migrations...");
            run_migrations(&pool, Some(&db_config.migrations_path))
                .await
                .map_err(|e| {
                    error!("Database migration failed: {}", e);
                    AppError::Database(e)
                })?;

            info!("Database migrations completed successfully");
            AppState::postgres(pool)
        }
        None => {
            warn!("DATABASE_URL not set - using the in-memory store, data is lost on exit");
            AppState::in_memory()
        }
    };

    let app_state = Arc::new(state);
    info!("✓ Application state initialized");

    // =========================================================================
    // START SERVER
    // =========================================================================
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid HTTP address: {}", e)))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Message(format!("Failed to bind HTTP server: {}", e)))?;

    let app = api::router(app_state);

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Tipster Backend Service Ready!                  ║");
    info!("╠══════════════════════════════════════════════════════════╣");
    info!("║  REST API:     http://{}                          ║", addr);
    info!("║  Environment:  {}                                    ║", config.environment);
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("HTTP server error: {}", e);
            AppError::Message(format!("HTTP server error: {}", e))
        })?;

    info!("Tipster backend service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received, shutting down gracefully...");
}
