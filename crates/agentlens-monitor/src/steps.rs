//! Step-level grouping of log entries.
//!
//! Every distinct `step_number` becomes one [`AggregatedStep`]. A step usually
//! spans several entries (one `llm_call`, an optional `reasoning`, any number of
//! `tool_execution`s); their payloads are folded together in log order.
//! Entries without a usable step number share one step numbered `None`, which
//! sorts before every numbered step.

use std::collections::BTreeMap;

use agentlens_core::{
    AgentReasoning, LogEntry, Metrics, StepType, ToolCall, WEB_SEARCH_TOOL,
};
use serde::Serialize;
use serde_json::Value;

use crate::citations::{parse_citations, SearchResult};

/// All entries sharing one step number, folded into a single record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedStep {
    pub step_number: Option<u64>,
    /// Timestamp of the first entry of this step.
    pub timestamp: String,
    /// Classification of the first entry of this step.
    pub step_type: StepType,
    /// Phase of the first entry of this step.
    pub phase: Option<String>,
    /// Shallow merge of every entry's metrics, later keys winning.
    pub metrics: Metrics,
    pub reasoning: Option<AgentReasoning>,
    pub tool_calls: Vec<ToolCall>,
    pub search_results: Vec<SearchResult>,
    /// Arguments of the latest tool execution in this step.
    pub tool_context: Option<Value>,
    /// Result of the latest tool execution in this step.
    pub tool_result: Option<Value>,
    /// Number of raw entries folded into this step.
    pub entry_count: usize,
}

impl AggregatedStep {
    fn seed(entry: &LogEntry) -> Self {
        Self {
            step_number: entry.step_number,
            timestamp: entry.timestamp.clone(),
            step_type: entry.step_type.clone(),
            phase: entry.phase.clone(),
            metrics: Metrics::new(),
            reasoning: None,
            tool_calls: Vec::new(),
            search_results: Vec::new(),
            tool_context: None,
            tool_result: None,
            entry_count: 0,
        }
    }

    /// Duration in milliseconds; 0 when the step has none.
    pub fn duration_ms(&self) -> f64 {
        self.metrics.duration_ms().unwrap_or_default()
    }

    /// Total tokens; 0 when the step has none.
    pub fn total_tokens(&self) -> u64 {
        self.metrics.total_tokens().unwrap_or_default()
    }

    fn absorb(&mut self, entry: &LogEntry) {
        self.entry_count += 1;
        self.metrics.merge(&entry.metrics);

        match entry.step_type {
            StepType::Reasoning => {
                if let Some(reasoning) = &entry.agent_reasoning {
                    self.reasoning = Some(reasoning.clone());
                }
            }
            StepType::LlmCall => {
                self.tool_calls.extend(entry.requested_tool_calls());
            }
            StepType::ToolExecution => {
                let tool_name = entry.tool_name.as_deref().filter(|name| !name.is_empty());
                if let Some(name) = tool_name {
                    self.tool_calls.push(ToolCall::new(name, entry.tool_context()));
                }
                if tool_name == Some(WEB_SEARCH_TOOL) {
                    if let Some(Value::String(text)) = &entry.agent_tool_execution_result {
                        self.search_results.extend(parse_citations(text));
                    }
                }
                self.tool_context = Some(entry.tool_context());
                self.tool_result = Some(entry.tool_result());
            }
            StepType::Other(_) => {}
        }
    }
}

/// Single-pass builder folding entries into steps keyed by step number.
#[derive(Debug, Default)]
pub struct StepAggregator {
    steps: BTreeMap<Option<u64>, AggregatedStep>,
}

impl StepAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one entry into its step, opening the step if it is new.
    pub fn push(&mut self, entry: &LogEntry) {
        self.steps
            .entry(entry.step_number)
            .or_insert_with(|| AggregatedStep::seed(entry))
            .absorb(entry);
    }

    /// Completed steps sorted by step number ascending, unnumbered first.
    pub fn finish(self) -> Vec<AggregatedStep> {
        let steps: Vec<AggregatedStep> = self.steps.into_values().collect();
        tracing::debug!(steps = steps.len(), "Aggregated log steps");
        steps
    }

    /// Aggregates a full entry sequence.
    pub fn aggregate(entries: &[LogEntry]) -> Vec<AggregatedStep> {
        let mut aggregator = Self::new();
        for entry in entries {
            aggregator.push(entry);
        }
        aggregator.finish()
    }
}
