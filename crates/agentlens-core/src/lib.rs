//! Core data model for agent execution logs.
//!
//! This crate provides the types shared across agentlens:
//!
//! - [`AgentLog`] — A whole log document (agent id, model settings, task, toolkit, entries)
//! - [`LogEntry`] and [`StepType`] — One raw event record and its classification
//! - [`Metrics`] — The loosely-typed per-entry metrics mapping
//! - [`AgentReasoning`] and [`ToolCall`] — Typed views over entry payloads
//! - [`LogError`] — Error type for loading log files
//!
//! Parsing is permissive: missing keys fall back to defaults, unknown keys are
//! ignored and a field holding the wrong JSON type is treated as absent.
//!
//! # Example
//!
//! ```rust
//! use agentlens_core::{parse_log, StepType};
//!
//! let log = parse_log(r#"{
//!     "id": "agent_7f3a9c21e4",
//!     "task": "Find the release date",
//!     "log": [
//!         {"step_number": 1, "step_type": "llm_call", "phase": "reasoning_phase",
//!          "metrics": {"duration_ms": 812, "total_tokens": 340}}
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(log.log.len(), 1);
//! assert_eq!(log.log[0].step_type, StepType::LlmCall);
//! assert_eq!(log.short_id(), "7f3a9c21");
//! ```

mod entry;
mod loader;
mod log;

pub use entry::{
    AgentReasoning, LogEntry, Metrics, StepType, ToolCall, REASONING_DISPATCH_TOOL, WEB_SEARCH_TOOL,
};
pub use loader::{list_log_files, load_log_file, parse_log};
pub use log::{AgentLog, ModelSettings};

use thiserror::Error;

/// Errors that can occur while loading an agent log.
#[derive(Error, Debug)]
pub enum LogError {
    /// Reading the log file or directory failed.
    #[error("Failed to read log: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid JSON or does not have the log shape.
    #[error("Failed to parse log: {0}")]
    Parse(#[from] serde_json::Error),
}
