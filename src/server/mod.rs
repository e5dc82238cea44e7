//! HTTP query endpoint
//!
//! # Modules
//!
//! - [`routes`]: Version lookup, manual ingestion trigger and health check
//! - [`error`]: Error responses

pub mod error;
pub mod routes;

use std::future::Future;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

pub use error::ApiError;
pub use routes::{AppState, router};

/// Serve `router` on `listener` until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
