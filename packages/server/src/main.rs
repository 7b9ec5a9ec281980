use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use catalog_server::catalog::reconciler::run_reconcile_loop;
use catalog_server::config::AppConfig;
use catalog_server::state::AppState;
use catalog_server::{build_router, database, seed};
use common::storage::FilesystemUploadStore;
use tracing::{Level, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;

    let level = config.log.level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    let db = database::init_db(&config.database)
        .await
        .context("connecting to database")?;
    seed::ensure_indexes(&db).await?;
    seed::ensure_admin(&db, &config.auth).await?;

    if !config.auth.enabled {
        warn!("Authentication is disabled; catalog writes are open to everyone");
    }

    let uploads = FilesystemUploadStore::new(
        config.storage.uploads_dir.clone(),
        config.storage.max_file_size,
    )
    .await
    .context("preparing upload directory")?;
    info!(path = %uploads.base_path().display(), "Upload store ready");

    let state = AppState {
        db: db.clone(),
        config: Arc::new(config),
        uploads: Arc::new(uploads),
    };

    if let Some(secs) = state.config.catalog.reconcile_interval_secs.filter(|s| *s > 0) {
        tokio::spawn(run_reconcile_loop(
            state.reconciler(),
            Duration::from_secs(secs),
        ));
    }

    let addr: SocketAddr = format!("{}:{}", state.config.server.host, state.config.server.port)
        .parse()
        .context("invalid server address")?;

    let app = build_router(state);

    info!("Server running at http://{}", addr);
    info!("API docs at http://{}/scalar", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, closing database pool");
    db.close().await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
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
                warn!(error = %e, "Failed to listen for SIGTERM");
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
}
