//! Read-only query handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

use crate::dto::{QueryRequest, QueryResult};
use crate::error::AppError;
use crate::markdown;
use crate::services::query as query_service;
use crate::ServerState;

/// POST /api/query - Rows as JSON.
pub async fn execute(
    State(state): State<Arc<ServerState>>,
    req: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResult>, AppError> {
    let Json(req) = req?;
    let result = query_service::execute(&state, &req.query).await?;
    info!(rows = result.row_count, "Query returned");
    Ok(Json(result))
}

/// POST /api/query/markdown - Rows as a Markdown document.
pub async fn markdown(
    State(state): State<Arc<ServerState>>,
    req: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = req?;
    let result = query_service::execute(&state, &req.query).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "inline; filename=query_result.md"),
        ],
        markdown::render(&result),
    ))
}
