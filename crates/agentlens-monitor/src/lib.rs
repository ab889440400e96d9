//! Analysis of recorded agent runs.
//!
//! Turns the flat entry sequence of an [`agentlens_core::AgentLog`] into:
//! - step records ([`StepAggregator`]), one per distinct step number
//! - a call-span tree ([`TraceTreeBuilder`]) rooted at each LLM call
//! - run-level statistics ([`MetricsAggregator`])
//! - chart series ([`ChartSeries`])
//!
//! [`LogAnalysis`] bundles all of them behind one query facade.

mod analysis;
mod citations;
mod metrics;
mod series;
mod steps;
mod tree;

pub use analysis::{AgentInfo, AnalysisReport, LogAnalysis, ReasoningSnapshot, TimelineEntry};
pub use citations::{parse_citations, SearchResult};
pub use metrics::{MetricsAggregator, MetricsSummary};
pub use series::{
    cumulative_series, duration_series, token_series, ChartSeries, CumulativePoint,
    DurationPoint, TokenPoint,
};
pub use steps::{AggregatedStep, StepAggregator};
pub use tree::{
    total_duration_ms, SpanKind, SpanMetadata, TraceNode, TraceTreeBuilder,
    TOOL_RESULT_PREVIEW_CHARS,
};
