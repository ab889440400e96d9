//! HTTP API for browsing a PostgreSQL schema, running read-only queries and
//! analysing uploaded agent logs.

pub mod db;
pub mod dto;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod markdown;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use db::{DbError, PgCatalog, SchemaCatalog};
pub use error::AppError;

/// Upper bound for uploaded agent logs.
const LOG_BODY_LIMIT: usize = 32 * 1024 * 1024;

pub struct ServerState {
    pub catalog: Arc<dyn SchemaCatalog>,
}

impl ServerState {
    pub fn new(catalog: impl SchemaCatalog + 'static) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

/// Builds the application router with CORS and request tracing.
pub fn app(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        .route("/api/tables", get(handlers::tables::list))
        .route("/api/tables/{name}/schema", get(handlers::tables::schema))
        .route("/api/query", post(handlers::query::execute))
        .route("/api/query/markdown", post(handlers::query::markdown))
        .route(
            "/api/logs/report",
            post(handlers::logs::report).layer(DefaultBodyLimit::max(LOG_BODY_LIMIT)),
        )
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}
