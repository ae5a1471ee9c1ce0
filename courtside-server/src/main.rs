use std::net::IpAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};

use courtside_persistence::connection::connect_and_migrate;
use courtside_persistence::{LocalStorage, RemoteStore, SqlRemoteStore};
use courtside_server::{
    app_state::AppState,
    auth::AuthService,
    config::Config,
    create_routes,
    websocket::{ConnectionManager, start_store_fanout},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting Courtside server...");

    let config = Config::new();

    let db = connect_and_migrate(&config.database_url)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;
    let remote: Arc<dyn RemoteStore> = Arc::new(SqlRemoteStore::new(db));

    let local = LocalStorage::open(&config.local_storage_dir).with_context(|| {
        format!("failed to open local storage at {}", config.local_storage_dir)
    })?;
    let state = Arc::new(
        AppState::bootstrap(remote, local, config.timer_tick())
            .context("failed to restore local data")?,
    );

    let auth_service = if config.auth_dev_mode {
        info!("Starting in development authentication mode - token signatures are not checked");
        Arc::new(AuthService::new_dev_mode())
    } else {
        match config.auth_secret.as_deref() {
            Some(secret) => Arc::new(AuthService::new(secret)),
            None => {
                error!("AUTH_SECRET is required unless AUTH_DEV_MODE=true");
                std::process::exit(1);
            }
        }
    };

    let connection_manager = Arc::new(ConnectionManager::new());
    let fanout = start_store_fanout(state.clone(), connection_manager.clone()).await;

    let routes = create_routes(state.clone(), connection_manager.clone(), auth_service);

    let cleanup_connection_manager = connection_manager.clone();
    let connection_timeout = config.connection_timeout();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(30));
        loop {
            interval.tick().await;
            cleanup_connection_manager
                .prune_idle(connection_timeout)
                .await;
        }
    });

    let host: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("invalid HOST {}", config.host))?;

    info!("Server starting on {}:{}", config.host, config.port);
    let (addr, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown((host, config.port), shutdown_signal())
        .context("failed to bind server address")?;

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;

    state.sign_out().await;
    state.flush_local_storage().await;
    fanout.abort();
    info!("Server shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal as unix_signal};

        match (
            unix_signal(SignalKind::interrupt()),
            unix_signal(SignalKind::terminate()),
        ) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => {
                        info!("Received SIGINT, shutting down gracefully...");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down gracefully...");
                    }
                }
                return;
            }
            _ => error!("Failed to install signal handlers, falling back to Ctrl+C"),
        }
    }

    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
    }
    info!("Received Ctrl+C, shutting down gracefully...");
}
