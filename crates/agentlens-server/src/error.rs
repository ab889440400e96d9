//! Application error types and Axum response conversion.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::db::DbError;
use crate::guard::RejectedQuery;

/// Application-level errors with HTTP status code mapping.
#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    NotFound(String),
    RejectedQuery(RejectedQuery),
    BadRequest(String),
    Internal(String),
}

impl AppError {
    /// Creates an Internal error from any error type.
    pub fn internal(e: impl std::fmt::Display) -> Self {
        AppError::Internal(e.to_string())
    }

    /// Maps a catalog failure, prefixing database errors with `context`.
    pub fn from_db(context: &str, e: DbError) -> Self {
        match e {
            DbError::TableNotFound(_) => AppError::NotFound(e.to_string()),
            DbError::Database(inner) => AppError::Internal(format!("{}: {}", context, inner)),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RejectedQuery(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RejectedQuery> for AppError {
    fn from(e: RejectedQuery) -> Self {
        AppError::RejectedQuery(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::RejectedQuery(e) => e.to_string(),
            AppError::NotFound(m) | AppError::BadRequest(m) | AppError::Internal(m) => m,
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::RejectedQuery(RejectedQuery::NotSelect).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::internal("boom").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_db_not_found() {
        let err = AppError::from_db("Error fetching table schema", DbError::TableNotFound("runs".into()));
        assert_eq!(err, AppError::NotFound("Table 'runs' not found".into()));
    }

    #[test]
    fn test_from_db_database_error() {
        let err = AppError::from_db("Error executing query", DbError::Database(sqlx::Error::PoolTimedOut));
        let AppError::Internal(message) = err else {
            panic!("expected internal error");
        };
        assert!(message.starts_with("Error executing query: "));
    }
}
