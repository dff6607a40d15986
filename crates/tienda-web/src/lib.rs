//! HTTP storefront server.
//!
//! Layering mirrors the rest of the workspace: `catalog` owns the SQLite
//! store, `session` the cookie-token sessions, `render` the bridge into the
//! template engine, and `routes` the axum handlers. `start_server` wires
//! them together behind a single listener with graceful shutdown.

pub mod catalog;
pub mod config;
pub mod error;
pub mod render;
pub mod routes;
pub mod session;
pub mod state;
pub mod whatsapp;

use std::path::Path;

use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{catalog::Catalog, config::Config, state::AppState};

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::load();

    let catalog = Catalog::open(Path::new(&config.database_path))
        .expect("No se pudo abrir la base de datos del catálogo");

    let port = config.port;
    let state = AppState::new(config, catalog);
    let app = routes::router(state).layer(CorsLayer::permissive());

    let listener = TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("No se pudo abrir el puerto");

    info!("Servidor escuchando en el puerto {port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("El servidor terminó con error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Apagando el servidor");
}
