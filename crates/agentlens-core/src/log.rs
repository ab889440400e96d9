//! The agent log document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entry::LogEntry;

/// LLM settings the agent ran with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ModelSettings {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u64>,
}

/// A complete agent execution log.
///
/// There is no schema version field; every key is optional and a header value
/// of the wrong JSON type reads as absent. Only a document that is not an
/// object is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct AgentLog {
    pub id: Option<String>,
    pub model_config: Option<ModelSettings>,
    pub task: Option<String>,
    pub toolkit: Vec<String>,
    /// Ordered event records.
    pub log: Vec<LogEntry>,
}

impl From<Value> for ModelSettings {
    fn from(value: Value) -> Self {
        Self {
            model: value.get("model").and_then(Value::as_str).map(str::to_string),
            temperature: value.get("temperature").and_then(Value::as_f64),
            max_tokens: value.get("max_tokens").and_then(Value::as_u64),
        }
    }
}

impl TryFrom<Value> for AgentLog {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut object = match value {
            Value::Object(object) => object,
            other => return Err(format!("expected a JSON object, found {}", kind_of(&other))),
        };
        let mut take = |key: &str| object.remove(key).unwrap_or(Value::Null);
        let text = |value: Value| match value {
            Value::String(s) => Some(s),
            _ => None,
        };

        let id = text(take("id"));
        let task = text(take("task"));
        let model_config = match take("model_config") {
            value @ Value::Object(_) => Some(ModelSettings::from(value)),
            _ => None,
        };
        let toolkit = match take("toolkit") {
            Value::Array(items) => items.into_iter().filter_map(text).collect(),
            _ => Vec::new(),
        };
        let log = match take("log") {
            Value::Array(items) => items.into_iter().map(LogEntry::from).collect(),
            _ => Vec::new(),
        };

        Ok(Self {
            id,
            model_config,
            task,
            toolkit,
            log,
        })
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl AgentLog {
    /// Short agent identifier: first 8 characters of the last `_`-separated segment.
    pub fn short_id(&self) -> String {
        let Some(id) = self.id.as_deref() else {
            return "N/A".to_string();
        };
        let tail = id.rsplit('_').next().unwrap_or(id);
        tail.chars().take(8).collect()
    }

    pub fn model(&self) -> Option<&str> {
        self.model_config.as_ref().and_then(|m| m.model.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        let log = AgentLog {
            id: Some("sgr_agent_0c5e1f7a-2b9d".into()),
            ..Default::default()
        };
        assert_eq!(log.short_id(), "0c5e1f7a");

        let log = AgentLog {
            id: Some("abc".into()),
            ..Default::default()
        };
        assert_eq!(log.short_id(), "abc");

        assert_eq!(AgentLog::default().short_id(), "N/A");
    }

    #[test]
    fn test_missing_keys_default() {
        let log: AgentLog = serde_json::from_str(r#"{"toolkit": ["websearchtool"], "extra": 1}"#).unwrap();
        assert!(log.id.is_none());
        assert!(log.log.is_empty());
        assert_eq!(log.toolkit, vec!["websearchtool"]);
        assert_eq!(log.model(), None);
    }

    #[test]
    fn test_model_settings() {
        let log: AgentLog = serde_json::from_str(
            r#"{"model_config": {"model": "gpt-4o-mini", "temperature": 0.4, "max_tokens": 8000}}"#,
        )
        .unwrap();
        assert_eq!(log.model(), Some("gpt-4o-mini"));
        assert_eq!(log.model_config.unwrap().max_tokens, Some(8000));
    }

    #[test]
    fn test_null_header_values_read_as_absent() {
        let log: AgentLog = serde_json::from_str(
            r#"{"id": "run_1", "toolkit": null, "model_config": null,
                "log": [{"step_number": 1, "step_type": "llm_call"}]}"#,
        )
        .unwrap();
        assert_eq!(log.id.as_deref(), Some("run_1"));
        assert!(log.toolkit.is_empty());
        assert!(log.model_config.is_none());
        assert_eq!(log.log.len(), 1);

        let log: AgentLog = serde_json::from_str(r#"{"task": "t", "log": null}"#).unwrap();
        assert_eq!(log.task.as_deref(), Some("t"));
        assert!(log.log.is_empty());
    }

    #[test]
    fn test_wrongly_typed_header_values_read_as_absent() {
        let log: AgentLog = serde_json::from_str(
            r#"{"id": 42, "task": ["x"], "toolkit": ["websearchtool", 7],
                "model_config": {"model": "gpt-4o", "temperature": "warm"},
                "log": [{"step_number": 2}]}"#,
        )
        .unwrap();
        assert!(log.id.is_none());
        assert_eq!(log.short_id(), "N/A");
        assert!(log.task.is_none());
        assert_eq!(log.toolkit, vec!["websearchtool"]);
        assert_eq!(log.model(), Some("gpt-4o"));
        assert_eq!(log.model_config.as_ref().and_then(|m| m.temperature), None);
        assert_eq!(log.log[0].step_number, Some(2));
    }

    #[test]
    fn test_non_object_document_is_rejected() {
        let err = serde_json::from_str::<AgentLog>("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("expected a JSON object, found an array"));
    }
}
