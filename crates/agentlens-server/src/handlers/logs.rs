//! Agent log analysis handler.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use agentlens_core::AgentLog;
use agentlens_monitor::{AnalysisReport, LogAnalysis};

use crate::error::AppError;

/// POST /api/logs/report - Full analysis of an uploaded agent log.
pub async fn report(
    log: Result<Json<AgentLog>, JsonRejection>,
) -> Result<Json<AnalysisReport>, AppError> {
    let Json(log) = log?;
    tracing::info!(
        agent = %log.short_id(),
        entries = log.log.len(),
        "Building log report"
    );
    Ok(Json(LogAnalysis::new(log).report()))
}
