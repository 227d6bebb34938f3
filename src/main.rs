//! Review Roster server binary.

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use review_roster::api::AppState;
use review_roster::config::Config;
use review_roster::services::ReviewerSelector;
use review_roster::{db, server};

/// Setup logging; `RUST_LOG` wins over `--verbose`.
fn setup_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

/// Cancel `token` on Ctrl-C or SIGTERM.
async fn wait_for_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    log::info!("Shutdown signal received");
    token.cancel();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    setup_logging(config.verbose);

    let pool = db::initialize(&config.database_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;

    let state = AppState::new(pool.clone(), ReviewerSelector::default());
    let listener = server::bind(&config.bind_addr()).await?;

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    server::serve(listener, state, shutdown).await?;

    pool.close().await;
    Ok(())
}
