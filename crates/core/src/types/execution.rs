//! Streamed execution results and the groups they accumulate into

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Status reported by the execution service for one result message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Cancelled,
    EmptyOutput,
    Error,
    Failed,
    Pending,
    Running,
    Success,
    #[serde(other)]
    Unknown,
}

impl ExecutionStatus {
    /// The step will not emit further updates
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionStatus::Cancelled
                | ExecutionStatus::Error
                | ExecutionStatus::Failed
                | ExecutionStatus::Success
        )
    }
}

/// Kind of payload a result message carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    Data,
    /// Marker only: the full output has to be fetched separately
    Output,
    Status,
    Stdout,
    #[serde(other)]
    Unknown,
}

/// Shape of one entry in a fetched output array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputDataType {
    Iterable,
    DictionaryComplex,
    Table,
    Text,
    TextPlain,
    TextHtml,
    ImagePng,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessDetails {
    pub message_request_uuid: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Where the full output of a run can be fetched from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub stacktrace: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One streamed message; immutable once received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub result_id: String,
    pub status: ExecutionStatus,
    #[serde(rename = "type")]
    pub result_type: ResultType,
    /// Milliseconds since the epoch; producers may send sub-millisecond
    /// precision
    #[serde(serialize_with = "serialize_epoch_millis")]
    pub timestamp: f64,
    pub process: ProcessDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResultMetadata>,
}

impl ExecutionResult {
    /// Id of the execution group (originating request) this result belongs to
    pub fn group_id(&self) -> &str {
        &self.process.message_request_uuid
    }

    pub fn is_done(&self) -> bool {
        self.status.is_terminal()
    }
}

/// One entry of a fetched output array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputItem {
    #[serde(default)]
    pub data: Value,
    #[serde(rename = "type")]
    pub data_type: OutputDataType,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawOutputGroup {
    uuid: String,
    #[serde(default)]
    messages: Vec<ExecutionResult>,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawOutputGroup> for ExecutionOutputGroup {
    fn from(raw: RawOutputGroup) -> Self {
        let mut group = ExecutionOutputGroup {
            uuid: raw.uuid,
            messages: raw.messages,
            messages_mapping: HashMap::new(),
            namespace: raw.namespace,
            path: raw.path,
            output: raw.output,
            extra: raw.extra,
        };
        group.reindex();
        group
    }
}

/// All result messages sharing one originating request id, in arrival order.
///
/// `messages_mapping` indexes `messages` by `result_id` and is rebuilt on
/// deserialization, so a fetched payload is usable as a group directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawOutputGroup")]
pub struct ExecutionOutputGroup {
    pub uuid: String,
    messages: Vec<ExecutionResult>,
    #[serde(skip)]
    messages_mapping: HashMap<String, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output: Vec<OutputItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExecutionOutputGroup {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            messages: Vec::new(),
            messages_mapping: HashMap::new(),
            namespace: None,
            path: None,
            output: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Append unless a message with the same `result_id` is already present.
    /// Returns whether the message was added.
    pub fn push(&mut self, result: ExecutionResult) -> bool {
        if self.messages_mapping.contains_key(&result.result_id) {
            return false;
        }
        self.messages_mapping
            .insert(result.result_id.clone(), self.messages.len());
        self.messages.push(result);
        true
    }

    pub fn messages(&self) -> &[ExecutionResult] {
        &self.messages
    }

    pub fn message(&self, result_id: &str) -> Option<&ExecutionResult> {
        self.messages_mapping
            .get(result_id)
            .map(|&index| &self.messages[index])
    }

    pub fn contains(&self, result_id: &str) -> bool {
        self.messages_mapping.contains_key(result_id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// First message that finished successfully
    pub fn first_success(&self) -> Option<&ExecutionResult> {
        self.messages
            .iter()
            .find(|message| message.status == ExecutionStatus::Success)
    }

    fn reindex(&mut self) {
        self.messages_mapping.clear();
        for (index, message) in self.messages.iter().enumerate() {
            self.messages_mapping
                .entry(message.result_id.clone())
                .or_insert(index);
        }
    }
}

/// Whole milliseconds go back out as integers
fn serialize_epoch_millis<S>(millis: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if millis.fract() == 0.0 && millis.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*millis as i64)
    } else {
        serializer.serialize_f64(*millis)
    }
}
