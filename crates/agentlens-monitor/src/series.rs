//! Chart-ready data series derived from aggregated steps.

use agentlens_core::StepType;
use serde::Serialize;

use crate::steps::AggregatedStep;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationPoint {
    pub step_number: Option<u64>,
    pub duration_ms: f64,
    pub step_type: StepType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPoint {
    pub step_number: Option<u64>,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativePoint {
    pub step_number: Option<u64>,
    pub tokens: u64,
    pub duration_ms: f64,
}

/// All series for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub durations: Vec<DurationPoint>,
    pub tokens: Vec<TokenPoint>,
    pub cumulative: Vec<CumulativePoint>,
}

impl ChartSeries {
    pub fn from_steps(steps: &[AggregatedStep]) -> Self {
        Self {
            durations: duration_series(steps),
            tokens: token_series(steps),
            cumulative: cumulative_series(steps),
        }
    }
}

/// Per-step durations, for steps that report one.
pub fn duration_series(steps: &[AggregatedStep]) -> Vec<DurationPoint> {
    steps
        .iter()
        .filter_map(|step| {
            Some(DurationPoint {
                step_number: step.step_number,
                duration_ms: step.metrics.duration_ms()?,
                step_type: step.step_type.clone(),
            })
        })
        .collect()
}

/// Prompt/completion split, for steps that report a token total.
pub fn token_series(steps: &[AggregatedStep]) -> Vec<TokenPoint> {
    steps
        .iter()
        .filter(|step| step.metrics.total_tokens().is_some())
        .map(|step| TokenPoint {
            step_number: step.step_number,
            prompt_tokens: step.metrics.prompt_tokens().unwrap_or_default(),
            completion_tokens: step.metrics.completion_tokens().unwrap_or_default(),
        })
        .collect()
}

/// Running token and duration totals, one point per step.
///
/// The token total saturates at `u64::MAX`.
pub fn cumulative_series(steps: &[AggregatedStep]) -> Vec<CumulativePoint> {
    let mut tokens: u64 = 0;
    let mut duration_ms = 0.0;
    steps
        .iter()
        .map(|step| {
            tokens = tokens.saturating_add(step.total_tokens());
            duration_ms += step.duration_ms();
            CumulativePoint {
                step_number: step.step_number,
                tokens,
                duration_ms,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::StepAggregator;
    use agentlens_core::LogEntry;
    use serde_json::json;

    fn fixture() -> Vec<AggregatedStep> {
        let entries: Vec<LogEntry> = [
            json!({"step_number": 1, "step_type": "llm_call",
                   "metrics": {"duration_ms": 100, "total_tokens": 50, "prompt_tokens": 40, "completion_tokens": 10}}),
            json!({"step_number": 2, "step_type": "tool_execution", "tool_name": "t"}),
            json!({"step_number": 3, "step_type": "llm_call",
                   "metrics": {"duration_ms": 300, "total_tokens": 70, "prompt_tokens": 60}}),
        ]
        .into_iter()
        .map(LogEntry::from)
        .collect();
        StepAggregator::aggregate(&entries)
    }

    #[test]
    fn test_series_skip_steps_without_metrics() {
        let steps = fixture();

        let durations = duration_series(&steps);
        assert_eq!(durations.len(), 2);
        assert_eq!(durations[1].step_number, Some(3));

        let tokens = token_series(&steps);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].completion_tokens, 0);
    }

    #[test]
    fn test_cumulative_series() {
        let cumulative = cumulative_series(&fixture());
        let totals: Vec<(Option<u64>, u64, f64)> = cumulative
            .iter()
            .map(|p| (p.step_number, p.tokens, p.duration_ms))
            .collect();
        assert_eq!(
            totals,
            vec![(Some(1), 50, 100.0), (Some(2), 50, 100.0), (Some(3), 120, 400.0)]
        );
    }

    #[test]
    fn test_cumulative_tokens_saturate() {
        let entries: Vec<LogEntry> = [
            json!({"step_number": 1, "step_type": "llm_call", "metrics": {"total_tokens": 1e20}}),
            json!({"step_number": 2, "step_type": "llm_call", "metrics": {"total_tokens": 1e20}}),
        ]
        .into_iter()
        .map(LogEntry::from)
        .collect();

        let cumulative = cumulative_series(&StepAggregator::aggregate(&entries));
        assert_eq!(cumulative[0].tokens, u64::MAX);
        assert_eq!(cumulative[1].tokens, u64::MAX);
    }

    #[test]
    fn test_empty_steps() {
        assert_eq!(ChartSeries::from_steps(&[]), ChartSeries::default());
    }
}
