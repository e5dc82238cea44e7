//! Route handlers

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::ingest::coordinator::IngestionCoordinator;
use crate::ingest::scheduler::run_with_timeout;
use crate::server::error::ApiError;
use crate::version::resolvers::VersionsPageResolver;
use crate::version::types::RankedVersions;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub versions: Arc<VersionsPageResolver>,
    pub coordinator: Arc<IngestionCoordinator>,
    pub run_timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct VersionsQuery {
    package: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(versions_handler))
        .route("/versions", get(versions_handler))
        .route("/__scheduled", get(scheduled_handler).post(scheduled_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Rank every published version of `?package=` by closeness to now
async fn versions_handler(
    State(state): State<AppState>,
    Query(query): Query<VersionsQuery>,
) -> Result<Json<RankedVersions>, ApiError> {
    let package = query
        .package
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::MissingPackage)?;

    let ranked = state.versions.ranked_versions(&package).await?;
    Ok(Json(ranked))
}

/// Trigger one ingestion run outside the schedule
async fn scheduled_handler(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    info!("Scheduled handler: manual trigger");
    match run_with_timeout(&state.coordinator, state.run_timeout).await {
        Ok(summary) => {
            info!("Scheduled handler: manual run finished: {:?}", summary);
            Ok((StatusCode::OK, "Successfully queued npm packages"))
        }
        Err(e) => {
            error!("Scheduled handler: manual run failed: {}", e);
            Err(ApiError::Internal(format!("Error: {}", e)))
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}
