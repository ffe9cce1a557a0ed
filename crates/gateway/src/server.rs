use std::{net::SocketAddr, path::Path};

use {
    axum::Router,
    sqlx::SqlitePool,
    tower_http::trace::TraceLayer,
    tracing::info,
    vermieter_config::VermieterConfig,
};

use crate::{auth_routes::auth_router, pages::page_router, state::AppState};

/// Build the application router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(page_router(state.clone()))
        .merge(auth_router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open (creating if needed) the SQLite database at `db_path` and migrate it.
pub async fn open_database(db_path: &Path) -> anyhow::Result<SqlitePool> {
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let url = format!("sqlite:{}?mode=rwc", db_path.display());
    Ok(vermieter_auth::store_sqlite::connect(&url).await?)
}

/// Start the HTTP server and run until Ctrl-C or SIGTERM.
pub async fn start_server(config: &VermieterConfig, db_path: &Path) -> anyhow::Result<()> {
    let pool = open_database(db_path).await?;
    let state = AppState::from_pool(pool.clone(), config);
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        db = %db_path.display(),
        secure_cookies = config.secure_cookies(),
        "vermieter listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            },
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
