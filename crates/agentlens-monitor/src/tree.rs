//! Call-span tree reconstruction.
//!
//! Every `llm_call` entry opens a new root span; `reasoning` and `tool_execution`
//! entries become children of the most recent root. Step numbers play no part
//! here, so two `llm_call`s sharing a step number are sibling roots.

use agentlens_core::{
    AgentReasoning, LogEntry, StepType, ToolCall, REASONING_DISPATCH_TOOL,
};
use serde::Serialize;
use serde_json::Value;

/// Maximum number of characters of a tool result kept on a span.
pub const TOOL_RESULT_PREVIEW_CHARS: usize = 500;

/// Kind of operation a span represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    LlmCall,
    Reasoning,
    Tool,
}

/// Kind-specific span details.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SpanMetadata {
    LlmCall {
        phase: Option<String>,
        tokens: u64,
        prompt_tokens: u64,
        completion_tokens: u64,
        tokens_per_second: f64,
        step_number: Option<u64>,
        /// Tool calls the LLM requested, without reasoning dispatches.
        tool_calls: Vec<ToolCall>,
    },
    Reasoning(AgentReasoning),
    Tool {
        tool_name: String,
        arguments: Value,
        /// Truncated tool result.
        result: String,
    },
}

/// One timed operation and its nested sub-operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceNode {
    pub name: String,
    pub kind: SpanKind,
    pub start_time: String,
    /// Duration in milliseconds; 0 when unknown.
    pub duration_ms: f64,
    pub metadata: SpanMetadata,
    pub children: Vec<TraceNode>,
}

impl TraceNode {
    fn llm_call(entry: &LogEntry) -> Self {
        let label = match entry.phase.as_deref() {
            Some("reasoning_phase") => "LLM Reasoning",
            Some("action_selection") => "LLM Action",
            _ => "LLM Call",
        };

        let tool_calls = entry
            .requested_tool_calls()
            .into_iter()
            .filter(|call| {
                call.name
                    .as_deref()
                    .is_some_and(|name| !name.is_empty() && name != REASONING_DISPATCH_TOOL)
            })
            .collect();

        let name = match entry.step_number {
            Some(number) => format!("Step {}: {}", number, label),
            None => format!("Step ?: {}", label),
        };

        let metrics = &entry.metrics;
        Self {
            name,
            kind: SpanKind::LlmCall,
            start_time: entry.timestamp.clone(),
            duration_ms: metrics.duration_ms().unwrap_or_default(),
            metadata: SpanMetadata::LlmCall {
                phase: entry.phase.clone(),
                tokens: metrics.total_tokens().unwrap_or_default(),
                prompt_tokens: metrics.prompt_tokens().unwrap_or_default(),
                completion_tokens: metrics.completion_tokens().unwrap_or_default(),
                tokens_per_second: metrics.tokens_per_second().unwrap_or_default(),
                step_number: entry.step_number,
                tool_calls,
            },
            children: Vec::new(),
        }
    }

    fn reasoning(entry: &LogEntry) -> Self {
        Self {
            name: "Reasoning Result".to_string(),
            kind: SpanKind::Reasoning,
            start_time: entry.timestamp.clone(),
            duration_ms: 0.0,
            metadata: SpanMetadata::Reasoning(entry.agent_reasoning.clone().unwrap_or_default()),
            children: Vec::new(),
        }
    }

    fn tool(entry: &LogEntry, tool_name: &str) -> Self {
        let result: String = entry
            .tool_result_text()
            .chars()
            .take(TOOL_RESULT_PREVIEW_CHARS)
            .collect();

        Self {
            name: tool_name.to_string(),
            kind: SpanKind::Tool,
            start_time: entry.timestamp.clone(),
            duration_ms: 0.0,
            metadata: SpanMetadata::Tool {
                tool_name: tool_name.to_string(),
                arguments: entry.tool_context(),
                result,
            },
            children: Vec::new(),
        }
    }

    /// Percentage of `total_ms` this span accounts for; 0 when either is zero.
    pub fn share_of(&self, total_ms: f64) -> f64 {
        if total_ms > 0.0 && self.duration_ms > 0.0 {
            self.duration_ms / total_ms * 100.0
        } else {
            0.0
        }
    }

    /// Depth-first traversal yielding `(depth, node)`, this node at depth 0.
    pub fn walk(&self) -> Vec<(usize, &TraceNode)> {
        let mut out = Vec::new();
        let mut stack = vec![(0, self)];
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            for child in node.children.iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }

    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}

/// Sum of root span durations.
pub fn total_duration_ms(roots: &[TraceNode]) -> f64 {
    roots.iter().map(|root| root.duration_ms).sum()
}

/// Single-pass builder turning an entry sequence into a forest of spans.
#[derive(Debug, Default)]
pub struct TraceTreeBuilder {
    roots: Vec<TraceNode>,
    current_root: Option<usize>,
    dropped: usize,
}

impl TraceTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: &LogEntry) {
        match entry.step_type {
            StepType::LlmCall => {
                self.roots.push(TraceNode::llm_call(entry));
                self.current_root = Some(self.roots.len() - 1);
            }
            StepType::Reasoning => {
                self.attach(entry, TraceNode::reasoning);
            }
            StepType::ToolExecution => {
                let tool_name = entry.tool_name.as_deref().unwrap_or("unknown");
                if tool_name == REASONING_DISPATCH_TOOL {
                    tracing::debug!(step = entry.step_number, "Skipping reasoning dispatch span");
                    return;
                }
                self.attach(entry, |e| TraceNode::tool(e, tool_name));
            }
            StepType::Other(_) => {}
        }
    }

    fn attach(&mut self, entry: &LogEntry, make: impl FnOnce(&LogEntry) -> TraceNode) {
        let Some(root) = self.current_root.and_then(|idx| self.roots.get_mut(idx)) else {
            self.dropped += 1;
            tracing::debug!(
                step = entry.step_number,
                step_type = %entry.step_type,
                "Dropping entry with no preceding llm_call"
            );
            return;
        };
        root.children.push(make(entry));
    }

    /// Number of entries dropped for lack of a root so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn finish(self) -> Vec<TraceNode> {
        tracing::debug!(
            roots = self.roots.len(),
            dropped = self.dropped,
            "Built trace tree"
        );
        self.roots
    }

    /// Builds the span forest for a full entry sequence.
    pub fn build(entries: &[LogEntry]) -> Vec<TraceNode> {
        let mut builder = Self::new();
        for entry in entries {
            builder.push(entry);
        }
        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(values: Vec<Value>) -> Vec<LogEntry> {
        values.into_iter().map(LogEntry::from).collect()
    }

    #[test]
    fn test_root_per_llm_call_and_nearest_attachment() {
        let log = entries(vec![
            json!({"step_number": 1, "step_type": "llm_call"}),
            json!({"step_number": 1, "step_type": "tool_execution", "tool_name": "X"}),
            json!({"step_number": 2, "step_type": "llm_call"}),
            json!({"step_number": 2, "step_type": "reasoning", "agent_reasoning": {}}),
        ]);

        let roots = TraceTreeBuilder::build(&log);
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].children.len(), 1);
        assert_eq!(roots[0].children[0].kind, SpanKind::Tool);
        assert_eq!(roots[0].children[0].name, "X");
        assert_eq!(roots[1].children.len(), 1);
        assert_eq!(roots[1].children[0].kind, SpanKind::Reasoning);
    }

    #[test]
    fn test_root_names_follow_phase() {
        let log = entries(vec![
            json!({"step_number": 1, "step_type": "llm_call", "phase": "reasoning_phase"}),
            json!({"step_number": 1, "step_type": "llm_call", "phase": "action_selection"}),
            json!({"step_number": 2.0, "step_type": "llm_call"}),
            json!({"step_number": "3", "step_type": "llm_call"}),
        ]);

        let names: Vec<String> = TraceTreeBuilder::build(&log).into_iter().map(|n| n.name).collect();
        assert_eq!(
            names,
            vec![
                "Step 1: LLM Reasoning",
                "Step 1: LLM Action",
                "Step 2: LLM Call",
                "Step ?: LLM Call",
            ]
        );
    }

    #[test]
    fn test_shared_step_number_gives_sibling_roots() {
        let log = entries(vec![
            json!({"step_number": 1, "step_type": "llm_call", "phase": "reasoning_phase"}),
            json!({"step_number": 1, "step_type": "reasoning"}),
            json!({"step_number": 1, "step_type": "llm_call", "phase": "action_selection"}),
            json!({"step_number": 1, "step_type": "tool_execution", "tool_name": "finalanswertool"}),
        ]);

        let roots = TraceTreeBuilder::build(&log);
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].children[0].kind, SpanKind::Reasoning);
        assert_eq!(roots[1].children[0].name, "finalanswertool");
    }

    #[test]
    fn test_reasoning_dispatch_tool_never_produces_span() {
        let log = entries(vec![
            json!({"step_number": 1, "step_type": "tool_execution", "tool_name": "reasoningtool"}),
            json!({"step_number": 1, "step_type": "llm_call"}),
            json!({"step_number": 1, "step_type": "tool_execution", "tool_name": "reasoningtool"}),
            json!({"step_number": 1, "step_type": "tool_execution", "tool_name": "websearchtool"}),
        ]);

        let mut builder = TraceTreeBuilder::new();
        for entry in &log {
            builder.push(entry);
        }
        assert_eq!(builder.dropped(), 0);

        let roots = builder.finish();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].children.len(), 1);
        assert_eq!(roots[0].children[0].name, "websearchtool");
    }

    #[test]
    fn test_orphans_dropped_without_affecting_later_attachments() {
        let log = entries(vec![
            json!({"step_number": 0, "step_type": "reasoning"}),
            json!({"step_number": 0, "step_type": "tool_execution", "tool_name": "a"}),
            json!({"step_number": 1, "step_type": "llm_call"}),
            json!({"step_number": 1, "step_type": "tool_execution", "tool_name": "b"}),
        ]);

        let mut builder = TraceTreeBuilder::new();
        for entry in &log {
            builder.push(entry);
        }
        assert_eq!(builder.dropped(), 2);

        let roots = builder.finish();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].children.len(), 1);
        assert_eq!(roots[0].children[0].name, "b");
    }

    #[test]
    fn test_llm_metadata_filters_dispatch_tool_intents() {
        let log = entries(vec![json!({
            "step_number": 3,
            "step_type": "llm_call",
            "phase": "action_selection",
            "timestamp": "2025-01-10T12:00:00Z",
            "metrics": {"duration_ms": 1250.5, "total_tokens": 900, "prompt_tokens": 800,
                        "completion_tokens": 100, "tokens_per_second": 80.0},
            "response": {"choices": [{"message": {"tool_calls": [
                {"id": "c1", "function": {"name": "reasoningtool", "parsed_arguments": {}}},
                {"id": "c2", "function": {"name": "websearchtool", "parsed_arguments": {"query": "q"}}}
            ]}}]}
        })]);

        let roots = TraceTreeBuilder::build(&log);
        let root = &roots[0];
        assert_eq!(root.duration_ms, 1250.5);
        assert_eq!(root.start_time, "2025-01-10T12:00:00Z");
        let SpanMetadata::LlmCall { tokens, prompt_tokens, tool_calls, step_number, .. } = &root.metadata
        else {
            panic!("expected llm metadata");
        };
        assert_eq!(*tokens, 900);
        assert_eq!(*prompt_tokens, 800);
        assert_eq!(*step_number, Some(3));
        assert_eq!(tool_calls.len(), 1);
        assert_eq!(tool_calls[0].display_name(), "websearchtool");
    }

    #[test]
    fn test_tool_result_truncated_to_500_chars() {
        let long = "é".repeat(800);
        let log = entries(vec![
            json!({"step_number": 1, "step_type": "llm_call"}),
            json!({"step_number": 1, "step_type": "tool_execution", "tool_name": "extractpagecontenttool",
                   "agent_tool_context": {"url": "https://example.com"}, "agent_tool_execution_result": long}),
        ]);

        let roots = TraceTreeBuilder::build(&log);
        let SpanMetadata::Tool { result, arguments, .. } = &roots[0].children[0].metadata else {
            panic!("expected tool metadata");
        };
        assert_eq!(result.chars().count(), TOOL_RESULT_PREVIEW_CHARS);
        assert_eq!(arguments, &json!({"url": "https://example.com"}));
    }

    #[test]
    fn test_missing_duration_is_zero() {
        let roots = TraceTreeBuilder::build(&entries(vec![json!({"step_type": "llm_call"})]));
        assert_eq!(roots[0].duration_ms, 0.0);
        assert_eq!(total_duration_ms(&roots), 0.0);
        assert_eq!(roots[0].share_of(0.0), 0.0);
    }

    #[test]
    fn test_walk_and_share() {
        let log = entries(vec![
            json!({"step_number": 1, "step_type": "llm_call", "metrics": {"duration_ms": 300}}),
            json!({"step_number": 1, "step_type": "reasoning"}),
            json!({"step_number": 1, "step_type": "tool_execution", "tool_name": "t"}),
            json!({"step_number": 2, "step_type": "llm_call", "metrics": {"duration_ms": 100}}),
        ]);

        let roots = TraceTreeBuilder::build(&log);
        let total = total_duration_ms(&roots);
        assert_eq!(total, 400.0);
        assert_eq!(roots[0].share_of(total), 75.0);
        assert_eq!(roots[0].descendant_count(), 2);

        let depths: Vec<(usize, &str)> = roots[0]
            .walk()
            .into_iter()
            .map(|(depth, node)| (depth, node.name.as_str()))
            .collect();
        assert_eq!(
            depths,
            vec![(0, "Step 1: LLM Call"), (1, "Reasoning Result"), (1, "t")]
        );
    }

    #[test]
    fn test_serialized_shape() {
        let log = entries(vec![
            json!({"step_number": 1, "step_type": "llm_call", "phase": "reasoning_phase"}),
            json!({"step_number": 1, "step_type": "tool_execution", "tool_name": "t",
                   "agent_tool_execution_result": "ok"}),
        ]);

        let value = serde_json::to_value(TraceTreeBuilder::build(&log)).unwrap();
        assert_eq!(value[0]["kind"], json!("llm_call"));
        assert_eq!(value[0]["metadata"]["phase"], json!("reasoning_phase"));
        assert_eq!(value[0]["children"][0]["kind"], json!("tool"));
        assert_eq!(value[0]["children"][0]["metadata"]["result"], json!("ok"));
    }
}
