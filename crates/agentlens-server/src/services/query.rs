//! Guarded execution of user-submitted queries.

use crate::dto::QueryResult;
use crate::error::AppError;
use crate::guard;
use crate::ServerState;

const NO_ROWS_MESSAGE: &str = "Query executed successfully but returned no rows";

/// Vets `sql` and runs it; column names come from the first row.
pub async fn execute(state: &ServerState, sql: &str) -> Result<QueryResult, AppError> {
    guard::check(sql).map_err(|e| {
        tracing::warn!(error = %e, "Rejected query");
        e
    })?;

    let rows = state
        .catalog
        .run_select(sql)
        .await
        .map_err(|e| AppError::from_db("Error executing query", e))?;

    let columns: Vec<String> = rows
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();

    Ok(QueryResult {
        message: rows.is_empty().then(|| NO_ROWS_MESSAGE.to_string()),
        row_count: rows.len(),
        columns,
        rows,
        query: sql.to_string(),
    })
}
