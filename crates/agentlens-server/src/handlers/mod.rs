//! HTTP route handlers for the agentlens server.

pub mod logs;
pub mod query;
pub mod tables;

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::{HealthResponse, RootResponse};
use crate::ServerState;

pub const SERVICE_NAME: &str = "agentlens-server";

/// Service identification.
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok".into(),
        service: SERVICE_NAME.into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Health check endpoint; always 200, with the database state in the body.
pub async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    match state.catalog.ping().await {
        Ok(()) => Json(HealthResponse::healthy()),
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            Json(HealthResponse::unhealthy(e.to_string()))
        }
    }
}
