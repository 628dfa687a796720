//! Per-request records shared by the pipeline stages

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Outcome of forwarding a command to the execution service
///
/// Mirrors the service's JSON shape: `raw`/`parsed` on success,
/// `error`/`stderr` on failure. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Command output as returned by the service (usually stdout text)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    /// The service's JSON parse of stdout, when it produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

const RESULT_KEYS: [&str; 4] = ["raw", "parsed", "error", "stderr"];

impl ExecutionResult {
    /// Successful result carrying raw output
    pub fn success(raw: impl Into<Value>) -> Self {
        Self {
            raw: Some(raw.into()),
            ..Self::default()
        }
    }

    /// Failed result carrying a human-readable description
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Map a service response body onto a result
    ///
    /// Objects using the service's keys are split into fields; any other
    /// JSON value is kept verbatim as `raw`.
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Object(map) if RESULT_KEYS.iter().any(|k| map.contains_key(*k)) => Self {
                raw: map.get("raw").filter(|v| !v.is_null()).cloned(),
                parsed: map.get("parsed").filter(|v| !v.is_null()).cloned(),
                error: map.get("error").and_then(value_text),
                stderr: map.get("stderr").and_then(value_text),
            },
            Value::Null => Self::default(),
            other => Self {
                raw: Some(other),
                ..Self::default()
            },
        }
    }

    /// The failure payload: `error`, else `stderr`, ignoring blank text
    pub fn failure_text(&self) -> Option<&str> {
        [self.error.as_deref(), self.stderr.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    }

    pub fn is_failure(&self) -> bool {
        self.failure_text().is_some()
    }

    /// Raw output rendered as text for prompts and the text log
    pub fn raw_text(&self) -> Option<String> {
        self.raw.as_ref().map(render_value)
    }
}

/// Falsy values (`null`, `false`, zero, empty containers) are no error
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(render_value(other)),
    }
}

/// Strings render unquoted; everything else as pretty JSON
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// One audit record, appended once and never rewritten
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Nil for entries written before request ids existed
    #[serde(default = "Uuid::nil")]
    pub request_id: Uuid,
    pub timestamp: DateTime<Local>,
    pub question: String,
    pub command: String,
    pub raw_output: Option<Value>,
    /// Older logs wrote this key capitalized
    #[serde(alias = "Error")]
    pub error: Option<String>,
}

impl LogEntry {
    /// Stamp a new entry for the given request
    pub fn new(question: &str, command: &str, result: &ExecutionResult) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timestamp: Local::now(),
            question: question.to_string(),
            command: command.to_string(),
            raw_output: result.raw.clone(),
            error: result.failure_text().map(str::to_string),
        }
    }
}

/// What the caller gets back from one question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerTriple {
    pub command: String,
    pub result: ExecutionResult,
    pub answer: String,
}
