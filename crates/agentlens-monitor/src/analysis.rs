//! Query facade over one parsed agent log.

use std::collections::BTreeMap;

use agentlens_core::{AgentLog, StepType};
use serde::Serialize;

use crate::metrics::{MetricsAggregator, MetricsSummary};
use crate::series::ChartSeries;
use crate::steps::{AggregatedStep, StepAggregator};
use crate::tree::{TraceNode, TraceTreeBuilder};

const DESCRIPTION_CHARS: usize = 100;

/// Agent-level information from the log header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentInfo {
    pub id: Option<String>,
    pub short_id: String,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u64>,
    pub task: Option<String>,
    pub toolkit: Vec<String>,
}

/// One row of the execution timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub step_number: Option<u64>,
    pub timestamp: String,
    pub step_type: StepType,
    pub phase: Option<String>,
    pub duration_ms: f64,
    pub description: String,
}

/// The agent's reasoning state at one reasoning step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasoningSnapshot {
    pub step_number: Option<u64>,
    pub timestamp: String,
    pub current_situation: Option<String>,
    pub plan_status: Option<String>,
    pub enough_data: bool,
    pub task_completed: bool,
    pub reasoning_steps: Vec<String>,
    pub remaining_steps: Vec<String>,
}

/// Everything a presentation layer needs for one log.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub agent: AgentInfo,
    pub metrics: MetricsSummary,
    pub tool_usage: BTreeMap<String, usize>,
    pub steps: Vec<AggregatedStep>,
    pub trace: Vec<TraceNode>,
    pub timeline: Vec<TimelineEntry>,
    pub reasoning_evolution: Vec<ReasoningSnapshot>,
    pub series: ChartSeries,
}

/// A parsed log together with its step records.
///
/// The span tree is rebuilt from the raw entries on demand; it does not share
/// grouping with the step records.
#[derive(Debug, Clone)]
pub struct LogAnalysis {
    log: AgentLog,
    steps: Vec<AggregatedStep>,
}

impl LogAnalysis {
    pub fn new(log: AgentLog) -> Self {
        let steps = StepAggregator::aggregate(&log.log);
        Self { log, steps }
    }

    pub fn log(&self) -> &AgentLog {
        &self.log
    }

    pub fn steps(&self) -> &[AggregatedStep] {
        &self.steps
    }

    pub fn step_by_number(&self, step_number: u64) -> Option<&AggregatedStep> {
        self.steps
            .binary_search_by_key(&Some(step_number), |s| s.step_number)
            .ok()
            .map(|idx| &self.steps[idx])
    }

    pub fn steps_by_type(&self, step_type: &StepType) -> Vec<&AggregatedStep> {
        self.steps.iter().filter(|s| &s.step_type == step_type).collect()
    }

    pub fn steps_by_phase(&self, phase: &str) -> Vec<&AggregatedStep> {
        self.steps
            .iter()
            .filter(|s| s.phase.as_deref() == Some(phase))
            .collect()
    }

    pub fn metrics(&self) -> MetricsSummary {
        MetricsAggregator::aggregate(&self.steps)
    }

    pub fn tool_usage(&self) -> BTreeMap<String, usize> {
        MetricsAggregator::tool_usage_stats(&self.steps)
    }

    pub fn trace(&self) -> Vec<TraceNode> {
        TraceTreeBuilder::build(&self.log.log)
    }

    pub fn series(&self) -> ChartSeries {
        ChartSeries::from_steps(&self.steps)
    }

    pub fn agent_info(&self) -> AgentInfo {
        let model = self.log.model_config.clone().unwrap_or_default();
        AgentInfo {
            id: self.log.id.clone(),
            short_id: self.log.short_id(),
            model: model.model,
            temperature: model.temperature,
            max_tokens: model.max_tokens,
            task: self.log.task.clone(),
            toolkit: self.log.toolkit.clone(),
        }
    }

    pub fn timeline(&self) -> Vec<TimelineEntry> {
        self.steps
            .iter()
            .map(|step| TimelineEntry {
                step_number: step.step_number,
                timestamp: step.timestamp.clone(),
                step_type: step.step_type.clone(),
                phase: step.phase.clone(),
                duration_ms: step.duration_ms(),
                description: describe(step),
            })
            .collect()
    }

    /// Reasoning state of every step classified as `reasoning`.
    pub fn reasoning_evolution(&self) -> Vec<ReasoningSnapshot> {
        self.steps_by_type(&StepType::Reasoning)
            .into_iter()
            .map(|step| {
                let reasoning = step.reasoning.clone().unwrap_or_default();
                ReasoningSnapshot {
                    step_number: step.step_number,
                    timestamp: step.timestamp.clone(),
                    current_situation: reasoning.current_situation,
                    plan_status: reasoning.plan_status,
                    enough_data: reasoning.enough_data,
                    task_completed: reasoning.task_completed,
                    reasoning_steps: reasoning.reasoning_steps,
                    remaining_steps: reasoning.remaining_steps,
                }
            })
            .collect()
    }

    pub fn report(&self) -> AnalysisReport {
        AnalysisReport {
            agent: self.agent_info(),
            metrics: self.metrics(),
            tool_usage: self.tool_usage(),
            steps: self.steps.clone(),
            trace: self.trace(),
            timeline: self.timeline(),
            reasoning_evolution: self.reasoning_evolution(),
            series: self.series(),
        }
    }
}

/// Short human-readable description of a step for the timeline.
fn describe(step: &AggregatedStep) -> String {
    match step.step_type {
        StepType::Reasoning => {
            let situation = step
                .reasoning
                .as_ref()
                .and_then(|r| r.current_situation.as_deref())
                .filter(|s| !s.is_empty());
            if let Some(situation) = situation {
                return situation.chars().take(DESCRIPTION_CHARS).collect();
            }
        }
        StepType::LlmCall => {
            return match step.phase.as_deref() {
                Some("reasoning_phase") => "Reasoning phase".to_string(),
                Some("action_selection") => "Action selection".to_string(),
                Some("execution") => "Execution".to_string(),
                Some(phase) if !phase.is_empty() => phase.to_string(),
                _ => "LLM call".to_string(),
            };
        }
        StepType::ToolExecution if !step.tool_calls.is_empty() => {
            let names: Vec<&str> = step.tool_calls.iter().map(|c| c.display_name()).collect();
            return format!("Executing: {}", names.join(", "));
        }
        _ => {}
    }

    let step_type = Some(step.step_type.as_str())
        .filter(|t| !t.is_empty())
        .unwrap_or("unknown");
    let phase = step.phase.as_deref().filter(|p| !p.is_empty()).unwrap_or("N/A");
    format!("{} - {}", step_type, phase)
}
