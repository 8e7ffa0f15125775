use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phone_shop::config::Config;
use phone_shop::AppState;

#[derive(Parser, Debug)]
#[command(name = "phone-shop")]
#[command(author, version, about = "REST backend for a phone shop", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "PHONE_SHOP_CONFIG", default_value = "phone-shop.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long, env = "PHONE_SHOP_LOG_LEVEL")]
    log_level: Option<String>,

    /// Insert demo users, phones and an order when the database is empty
    #[arg(long)]
    seed: bool,

    /// Run database migrations and exit
    #[arg(long)]
    migrate_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(&cli.config)?;

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting phone-shop v{}", env!("CARGO_PKG_VERSION"));
    if cli.config.exists() {
        tracing::info!("Loaded configuration from {}", cli.config.display());
    } else {
        tracing::info!("No config file at {}, using defaults", cli.config.display());
    }

    // Tokens will not survive a restart unless a secret is configured
    if config.auth.ensure_jwt_secret() {
        tracing::warn!("auth.jwt_secret is not set, generated a random signing secret");
    }

    // Ensure data directory exists
    std::fs::create_dir_all(&config.server.data_dir).with_context(|| {
        format!(
            "Failed to create data directory: {}",
            config.server.data_dir.display()
        )
    })?;

    // Initialize database
    let db_url = config.database.resolve_url(&config.server.data_dir);
    let db = phone_shop::db::init(&db_url, config.database.max_connections).await?;

    if cli.migrate_only {
        tracing::info!("Migrations applied, exiting");
        return Ok(());
    }

    if cli.seed || config.database.seed_demo_data {
        phone_shop::db::seed_demo_data(&db).await?;
    }

    // Ensure the bootstrap admin exists
    if let (Some(email), Some(password)) = (&config.auth.admin_email, &config.auth.admin_password) {
        phone_shop::services::users::ensure_admin_user(&db, email, password)
            .await
            .context("Failed to create bootstrap admin")?;
    }

    let metrics_handle = phone_shop::api::metrics::init_metrics()?;
    let state = Arc::new(AppState::new(config.clone(), db).with_metrics(metrics_handle));

    let app = phone_shop::api::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
