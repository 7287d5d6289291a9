//! Web layer for the vitals dashboard backend: the axum router, the
//! controllers behind it, and the browser-facing cookie jar.

pub use self::error::{Error, Result};
pub use service::AppState;

pub(crate) mod controller;
pub mod cookie;
pub mod error;
pub mod router;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use log::*;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Build the CORS layer from the configured allowed origins.
///
/// Credentials are allowed because the SPA sends the session cookie
/// cross-port during development.
fn cors_layer(app_state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring unparseable allowed origin {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
}

/// Bind the configured interface and serve the router until shutdown.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let host = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = app_state.config.port;

    let cors = cors_layer(&app_state);
    let router = router::define_routes(app_state).layer(cors);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("Server starting... listening for connections on http://{host}:{port}");

    axum::serve(listener, router).await
}
