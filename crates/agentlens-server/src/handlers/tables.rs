//! Table listing and schema handlers.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::error;

use crate::db::TableSchema;
use crate::dto::{TablesParams, TablesResponse};
use crate::error::AppError;
use crate::services::tables as tables_service;
use crate::ServerState;

/// GET /api/tables - Paged list of public base tables.
pub async fn list(
    State(state): State<Arc<ServerState>>,
    params: Result<Query<TablesParams>, QueryRejection>,
) -> Result<Json<TablesResponse>, AppError> {
    let Query(params) = params?;
    let response = tables_service::list(&state, &params).await.map_err(|e| {
        error!("Failed to list tables: {:?}", e);
        e
    })?;
    Ok(Json(response))
}

/// GET /api/tables/{name}/schema - Columns, indexes and comment of one table.
pub async fn schema(
    State(state): State<Arc<ServerState>>,
    Path(table_name): Path<String>,
) -> Result<Json<TableSchema>, AppError> {
    let schema = state
        .catalog
        .table_schema(&table_name)
        .await
        .map_err(|e| AppError::from_db("Error fetching table schema", e))?;
    Ok(Json(schema))
}
