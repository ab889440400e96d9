//! Raw log entries and the typed views over their payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tool used by the agent for web searches; its results carry citation blocks.
pub const WEB_SEARCH_TOOL: &str = "websearchtool";

/// Internal tool the agent framework uses to dispatch reasoning; never a visible span.
pub const REASONING_DISPATCH_TOOL: &str = "reasoningtool";

// ─────────────────────────────────────────────────────────────────────────────
// Step Type
// ─────────────────────────────────────────────────────────────────────────────

/// Classification of a log entry.
///
/// Unknown values are carried through unchanged as [`StepType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepType {
    LlmCall,
    Reasoning,
    ToolExecution,
    Other(String),
}

impl Default for StepType {
    fn default() -> Self {
        StepType::Other(String::new())
    }
}

impl StepType {
    pub fn as_str(&self) -> &str {
        match self {
            StepType::LlmCall => "llm_call",
            StepType::Reasoning => "reasoning",
            StepType::ToolExecution => "tool_execution",
            StepType::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "llm_call" => StepType::LlmCall,
            "reasoning" => StepType::Reasoning,
            "tool_execution" => StepType::ToolExecution,
            other => StepType::Other(other.to_string()),
        }
    }
}

impl From<String> for StepType {
    fn from(s: String) -> Self {
        StepType::parse(&s)
    }
}

impl From<StepType> for String {
    fn from(t: StepType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Metrics
// ─────────────────────────────────────────────────────────────────────────────

/// Per-entry metrics mapping (`duration_ms`, `total_tokens`, ...).
///
/// Kept as an open mapping so unknown keys survive the merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metrics(Map<String, Value>);

impl Metrics {
    pub const DURATION_MS: &'static str = "duration_ms";
    pub const TOTAL_TOKENS: &'static str = "total_tokens";
    pub const PROMPT_TOKENS: &'static str = "prompt_tokens";
    pub const COMPLETION_TOKENS: &'static str = "completion_tokens";
    pub const TOKENS_PER_SECOND: &'static str = "tokens_per_second";

    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow merge: keys from `other` overwrite existing ones.
    pub fn merge(&mut self, other: &Metrics) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Numeric value for `key`; non-numeric values read as absent.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    /// Integral value for `key`; fractional values are truncated.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        let value = self.0.get(key)?;
        value
            .as_u64()
            .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
    }

    pub fn duration_ms(&self) -> Option<f64> {
        self.get_f64(Self::DURATION_MS)
    }

    pub fn total_tokens(&self) -> Option<u64> {
        self.get_u64(Self::TOTAL_TOKENS)
    }

    pub fn prompt_tokens(&self) -> Option<u64> {
        self.get_u64(Self::PROMPT_TOKENS)
    }

    pub fn completion_tokens(&self) -> Option<u64> {
        self.get_u64(Self::COMPLETION_TOKENS)
    }

    pub fn tokens_per_second(&self) -> Option<f64> {
        self.get_f64(Self::TOKENS_PER_SECOND)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Metrics {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payloads
// ─────────────────────────────────────────────────────────────────────────────

/// Reasoning payload emitted by the agent (`agent_reasoning`).
///
/// Each known key is read on its own; a key of the wrong JSON type reads as
/// absent without affecting its neighbours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct AgentReasoning {
    pub current_situation: Option<String>,
    pub plan_status: Option<String>,
    pub enough_data: bool,
    pub task_completed: bool,
    pub reasoning_steps: Vec<String>,
    pub remaining_steps: Vec<String>,
    /// Keys not covered by the typed fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AgentReasoning {
    const KNOWN_KEYS: [&'static str; 6] = [
        "current_situation",
        "plan_status",
        "enough_data",
        "task_completed",
        "reasoning_steps",
        "remaining_steps",
    ];

    /// Reads a reasoning payload; `None` unless `value` is an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(Self::from_object)
    }

    fn from_object(object: &Map<String, Value>) -> Self {
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);
        let flag = |key: &str| object.get(key).and_then(Value::as_bool).unwrap_or_default();
        let list = |key: &str| -> Vec<String> {
            object
                .get(key)
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default()
        };

        Self {
            current_situation: text("current_situation"),
            plan_status: text("plan_status"),
            enough_data: flag("enough_data"),
            task_completed: flag("task_completed"),
            reasoning_steps: list("reasoning_steps"),
            remaining_steps: list("remaining_steps"),
            extra: object
                .iter()
                .filter(|(key, _)| !Self::KNOWN_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }
}

impl From<Value> for AgentReasoning {
    fn from(value: Value) -> Self {
        Self::from_value(&value).unwrap_or_default()
    }
}

/// A tool invocation: either requested by the LLM or executed by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call identifier assigned by the LLM (absent for executions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Tool name.
    pub name: Option<String>,
    /// Tool arguments as JSON.
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            arguments,
        }
    }

    /// Name used for statistics; `"unknown"` when absent.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unknown")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Log Entry
// ─────────────────────────────────────────────────────────────────────────────

/// One raw record in the agent's execution log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct LogEntry {
    /// `None` when the key is missing or not a non-negative integer.
    pub step_number: Option<u64>,
    pub step_type: StepType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Metrics::is_empty")]
    pub metrics: Metrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_reasoning: Option<AgentReasoning>,
    /// Raw LLM response (`choices[].message.tool_calls[]`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_tool_context: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_tool_execution_result: Option<Value>,
}

impl From<Value> for LogEntry {
    fn from(value: Value) -> Self {
        let str_field = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        let present = |key: &str| value.get(key).filter(|v| !v.is_null()).cloned();

        Self {
            step_number: value.get("step_number").and_then(step_number),
            step_type: str_field("step_type").map(StepType::from).unwrap_or_default(),
            phase: str_field("phase"),
            timestamp: str_field("timestamp").unwrap_or_default(),
            tool_name: str_field("tool_name"),
            metrics: value
                .get("metrics")
                .and_then(Value::as_object)
                .cloned()
                .map(Metrics::from)
                .unwrap_or_default(),
            agent_reasoning: value.get("agent_reasoning").and_then(AgentReasoning::from_value),
            response: present("response"),
            agent_tool_context: present("agent_tool_context"),
            agent_tool_execution_result: present("agent_tool_execution_result"),
        }
    }
}

impl LogEntry {
    /// Tool calls requested in `response.choices[].message.tool_calls[]`, in order.
    ///
    /// Every call is returned, including duplicates across choices.
    pub fn requested_tool_calls(&self) -> Vec<ToolCall> {
        let Some(choices) = self
            .response
            .as_ref()
            .and_then(|r| r.get("choices"))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };

        choices
            .iter()
            .filter_map(|choice| choice.get("message")?.get("tool_calls")?.as_array())
            .flatten()
            .map(|call| {
                let function = call.get("function");
                ToolCall {
                    id: call.get("id").and_then(Value::as_str).map(str::to_string),
                    name: function
                        .and_then(|f| f.get("name"))
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    arguments: function
                        .and_then(|f| f.get("parsed_arguments"))
                        .cloned()
                        .unwrap_or_else(empty_object),
                }
            })
            .collect()
    }

    /// Tool arguments of a `tool_execution` entry; an empty object when absent.
    pub fn tool_context(&self) -> Value {
        self.agent_tool_context.clone().unwrap_or_else(empty_object)
    }

    /// Tool result of a `tool_execution` entry; an empty string when absent.
    pub fn tool_result(&self) -> Value {
        self.agent_tool_execution_result
            .clone()
            .unwrap_or_else(|| Value::String(String::new()))
    }

    /// Tool result as text; non-string results are JSON-encoded.
    pub fn tool_result_text(&self) -> String {
        match &self.agent_tool_execution_result {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Non-negative integral step number; `2.0` reads as `2`.
fn step_number(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
            .map(|f| f as u64)
    })
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
