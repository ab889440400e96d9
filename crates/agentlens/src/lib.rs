//! # agentlens
//!
//! Reconstructs what an LLM reasoning agent did from its JSON execution log.
//!
//! ## Quick Start
//!
//! ```rust
//! use agentlens::prelude::*;
//!
//! let log = parse_log(r#"{"log": [
//!     {"step_number": 1, "step_type": "llm_call", "phase": "action_selection",
//!      "metrics": {"duration_ms": 500, "total_tokens": 90}},
//!     {"step_number": 1, "step_type": "tool_execution", "tool_name": "websearchtool"}
//! ]}"#).unwrap();
//!
//! let analysis = LogAnalysis::new(log);
//! assert_eq!(analysis.metrics().total_tokens, 90);
//! assert_eq!(analysis.trace()[0].children.len(), 1);
//! ```
//!
//! ## Crate Organization
//!
//! - `agentlens-core` — Log document model and file loading
//! - `agentlens-monitor` — Step aggregation, trace trees, metrics and series
//! - `agentlens-config` — Environment settings
//! - `agentlens-server` — HTTP API (separate binary)

pub mod render;

pub use agentlens_config as config;
pub use agentlens_core as model;
pub use agentlens_monitor as monitor;

/// Prelude for convenient imports.
pub mod prelude {
    pub use agentlens_core::{
        list_log_files, load_log_file, parse_log, AgentLog, LogEntry, LogError, Metrics, StepType,
    };
    pub use agentlens_monitor::{
        AggregatedStep, AnalysisReport, LogAnalysis, MetricsSummary, TraceNode,
    };
}
