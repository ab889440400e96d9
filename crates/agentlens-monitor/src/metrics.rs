//! Summary statistics over aggregated steps.

use std::collections::BTreeMap;

use agentlens_core::StepType;
use serde::{Deserialize, Serialize};

use crate::steps::AggregatedStep;

/// Aggregated metrics for one agent run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_steps: usize,
    pub total_duration_ms: f64,
    pub total_tokens: u64,
    pub total_prompt_tokens: u64,
    pub total_completion_tokens: u64,
    /// Steps classified as `llm_call`.
    pub llm_calls: usize,
    /// Steps classified as `tool_execution`.
    pub tool_executions: usize,
    pub avg_duration_per_step: f64,
    pub avg_tokens_per_llm_call: f64,
}

/// Computes run-level statistics from step records.
pub struct MetricsAggregator;

impl MetricsAggregator {
    /// Sums durations and tokens and counts steps by their step-level type.
    ///
    /// Absent metric keys contribute 0; averages are 0 when their denominator is.
    /// Token totals saturate at `u64::MAX`.
    pub fn aggregate(steps: &[AggregatedStep]) -> MetricsSummary {
        let mut summary = MetricsSummary {
            total_steps: steps.len(),
            ..Default::default()
        };

        for step in steps {
            let metrics = &step.metrics;
            summary.total_duration_ms += metrics.duration_ms().unwrap_or_default();
            summary.total_tokens = summary
                .total_tokens
                .saturating_add(metrics.total_tokens().unwrap_or_default());
            summary.total_prompt_tokens = summary
                .total_prompt_tokens
                .saturating_add(metrics.prompt_tokens().unwrap_or_default());
            summary.total_completion_tokens = summary
                .total_completion_tokens
                .saturating_add(metrics.completion_tokens().unwrap_or_default());

            match step.step_type {
                StepType::LlmCall => summary.llm_calls += 1,
                StepType::ToolExecution => summary.tool_executions += 1,
                _ => {}
            }
        }

        if summary.total_steps > 0 {
            summary.avg_duration_per_step = summary.total_duration_ms / summary.total_steps as f64;
        }
        if summary.llm_calls > 0 {
            summary.avg_tokens_per_llm_call = summary.total_tokens as f64 / summary.llm_calls as f64;
        }

        tracing::debug!(
            total_steps = summary.total_steps,
            total_tokens = summary.total_tokens,
            total_duration_ms = summary.total_duration_ms,
            "Aggregated run metrics"
        );
        summary
    }

    /// Number of tool-call records per tool name, duplicates included.
    pub fn tool_usage_stats(steps: &[AggregatedStep]) -> BTreeMap<String, usize> {
        let mut stats = BTreeMap::new();
        for call in steps.iter().flat_map(|step| &step.tool_calls) {
            *stats.entry(call.display_name().to_string()).or_insert(0) += 1;
        }
        stats
    }
}
