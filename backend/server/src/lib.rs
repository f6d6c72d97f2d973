//! Documentation of a workshop feedback survey service.
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
//!
//!
//!
//! # General Infrastructure
//! - Browser loads the form page and script from this server as plain files
//! - Script fetches the constraint table from `GET /api/v1/survey/schema`
//! - Script validates as the user types (debounced), on blur and on submit
//! - Only a locally valid form is posted to `POST /api/v1/survey`
//! - Server validates again from scratch, then writes one document to Redis
//!
//!
//!
//! # Trust
//!
//! **Goal**: A stored survey always satisfies the constraint table, no matter who posted it.
//!
//! - The browser checks are a convenience. They save a round trip, nothing more
//! - Anyone can post to the endpoint directly, so the server re-runs every check
//! - All failing fields are reported at once as `{errors: [{field, message}]}` with a 400
//! - `submittedAt` and `id` are always assigned here, whatever the client sent
//!
//!
//!
//! # Failure Modes
//!
//! - Invalid payload: 400, nothing written, client fixes and resubmits
//! - Store unreachable or write failed: 500 `{error}`, nothing written, no retry
//! - `DATABASE_URL` missing at startup: logged, process exits with status 1
//! - No idempotency: posting the same survey twice stores two documents
//!
//!
//!
//! # Environment
//!
//! | Variable | Default | |
//! |---|---|---|
//! | `DATABASE_URL` | required | Redis connection string |
//! | `PORT` | `3002` | Listen port |
//! | `SURVEY_COLLECTION` | `surveys` | Redis hash holding the documents |
//! | `STATIC_DIR` | `public` | Form page, script and stylesheet |
//! | `RUST_LOG` | | Log filter |
//!
//!
//!
//! # Setup
//!
//! Start Redis and the server. Run from `backend/` so `STATIC_DIR` finds `public/`.
//! ```sh
//! docker run -d -p 6379:6379 redis
//! cd backend
//! DATABASE_URL=redis://127.0.0.1:6379 RUST_LOG=info cargo run
//! ```
//!
//! Submit from the command line.
//! ```sh
//! cargo run -p tester -- tester/jane.json --count 2
//! ```
use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod state;
pub mod utils;

use config::Config;
use error::StartupError;
use routes::{schema_handler, survey_handler};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/api/v1/survey", post(survey_handler))
        .route("/api/v1/survey/schema", get(schema_handler))
        .fallback_service(static_files)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server() -> Result<(), StartupError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Connecting to database...");
    let state = AppState::new(config).await?;

    info!("Starting server...");
    let address = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    info!("Binding to {address}");

    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.to_string(),
            source,
        })?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
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
