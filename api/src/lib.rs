//! HTTP surface of the recipe costing service.
//!
//! Reads are public. Writes need a caller identity, which the gateway in front of
//! this server passes in the `X-User-Id` and `X-User-Role` headers.

mod auth;
pub mod config;
mod error;
mod extract;
mod routes;

use anyhow::Context;
use axum::{
    Router,
    http::{
        HeaderName, Method,
        header::{ACCEPT, CONTENT_TYPE},
    },
    routing::get,
};
use migration::{Migrator, MigratorTrait};
use recipe_costing_service::sea_orm::{Database, DatabaseConnection};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub use auth::{Caller, USER_ID_HEADER, USER_ROLE_HEADER};
pub use config::Config;
pub use error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    pub conn: DatabaseConnection,
}

/// Every route, with request tracing. CORS is left to the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::banner))
        .route("/health", get(routes::health))
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors(config: &Config) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.cors_origins.iter().cloned()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
        ])
}

#[tokio::main]
async fn start() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;

    let conn = Database::connect(&config.database_url)
        .await
        .context("database connection failed")?;
    Migrator::up(&conn, None)
        .await
        .context("running migrations failed")?;

    let app = router(AppState { conn }).layer(cors(&config));

    let listener = TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("could not bind {}", config.addr()))?;
    info!("listening on {}", config.addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(err) => {
                error!("failed to listen for Ctrl+C: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(err) => {
                error!("failed to install signal handler: {err}");
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

pub fn main() {
    let result = start();

    if let Some(err) = result.err() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
