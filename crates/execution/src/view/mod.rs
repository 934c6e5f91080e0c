//! Render-ready view of one execution group
//!
//! `ExecutionResultView::derive` is a pure function of the group: nothing
//! is fetched or mutated, and deriving twice yields the same view.

mod table;

pub use table::{build_table, type_mode, Table, TableColumn};

use chrono::{TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use workbench_core::{
    ExecutionOutputGroup, ExecutionResult, ExecutionStatus, OutputDataType, OutputItem,
    ResultType, OUTPUT_TIMESTAMP_FORMAT,
};

use crate::remote::OutputLocator;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBlock {
    pub error_type: Option<String>,
    pub message: Option<String>,
    pub stacktrace: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub group_id: String,
    pub result_id: String,
    pub timestamp: String,
    pub text: String,
}

/// Earliest and latest message timestamps, in epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimestampRange {
    pub min: f64,
    pub max: f64,
}

impl TimestampRange {
    pub fn runtime_ms(&self) -> f64 {
        self.max - self.min
    }
}

/// One rendered entry of a fetched output array
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OutputBlock {
    Table(Table),
    Json(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResultView {
    pub group_id: String,
    pub executing: bool,
    pub errors: Vec<ErrorBlock>,
    pub success: Option<ExecutionResult>,
    pub has_output_not_loaded: bool,
    pub timestamps: Option<TimestampRange>,
    pub runtime_ms: Option<f64>,
    pub text_blocks: Vec<TextBlock>,
    pub outputs: Vec<OutputBlock>,
}

impl ExecutionResultView {
    pub fn derive(group: &ExecutionOutputGroup) -> Self {
        let mut seen = HashSet::new();
        let messages: Vec<&ExecutionResult> = group
            .messages()
            .iter()
            .filter(|message| seen.insert(message.result_id.as_str()))
            .collect();

        let errors = messages
            .iter()
            .filter(|message| message.status == ExecutionStatus::Error)
            .map(|message| {
                let details = message.error.clone().unwrap_or_default();
                ErrorBlock {
                    error_type: details.error_type,
                    message: details.message,
                    stacktrace: details.stacktrace,
                }
            })
            .collect();

        let success = messages
            .iter()
            .find(|message| message.status == ExecutionStatus::Success)
            .map(|message| (*message).clone());

        let timestamps = messages.iter().fold(None, |range: Option<TimestampRange>, message| {
            let ts = message.timestamp;
            Some(match range {
                None => TimestampRange { min: ts, max: ts },
                Some(range) => TimestampRange {
                    min: range.min.min(ts),
                    max: range.max.max(ts),
                },
            })
        });

        let text_blocks = messages
            .iter()
            .filter_map(|message| {
                message_text(message).map(|text| TextBlock {
                    group_id: group.uuid.clone(),
                    result_id: message.result_id.clone(),
                    timestamp: format_timestamp(message.timestamp),
                    text,
                })
            })
            .collect();

        Self {
            group_id: group.uuid.clone(),
            executing: messages.iter().all(|message| !message.is_done()),
            errors,
            success,
            has_output_not_loaded: messages
                .iter()
                .any(|message| message.result_type == ResultType::Output),
            runtime_ms: timestamps.map(|range| range.runtime_ms()),
            timestamps,
            text_blocks,
            outputs: render_outputs(&group.output),
        }
    }

    /// Where to fetch the complete output from, once the run succeeded
    pub fn output_locator(&self) -> Option<(String, OutputLocator)> {
        let success = self.success.as_ref()?;
        let metadata = success.metadata.as_ref()?;
        Some((
            success.group_id().to_string(),
            OutputLocator {
                namespace: metadata.namespace.clone()?,
                path: metadata.path.clone()?,
            },
        ))
    }

    pub fn status_label(&self) -> &'static str {
        if !self.errors.is_empty() {
            "error"
        } else if self.success.is_some() {
            "success"
        } else if self.executing {
            "running"
        } else {
            "finished"
        }
    }
}

/// Text carried by a message: `output_text`, else a non-empty `output`
fn message_text(message: &ExecutionResult) -> Option<String> {
    if let Some(text) = message.output_text.as_deref().filter(|text| !text.is_empty()) {
        return Some(text.to_string());
    }
    match message.output.as_ref()? {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Array(values) if values.is_empty() => None,
        Value::Object(fields) if fields.is_empty() => None,
        other => serde_json::to_string_pretty(other).ok(),
    }
}

/// Epoch milliseconds as `%Y-%m-%d %H:%M:%S%.3f` UTC; sub-millisecond
/// precision is truncated
pub fn format_timestamp(millis: f64) -> String {
    if !millis.is_finite() {
        return millis.to_string();
    }
    Utc.timestamp_millis_opt(millis.floor() as i64)
        .single()
        .map(|at| at.format(OUTPUT_TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn render_outputs(items: &[OutputItem]) -> Vec<OutputBlock> {
    match type_mode(items) {
        None => Vec::new(),
        Some(OutputDataType::Iterable) => build_table(items)
            .map(OutputBlock::Table)
            .into_iter()
            .collect(),
        Some(_) => items.iter().filter_map(render_item).collect(),
    }
}

fn render_item(item: &OutputItem) -> Option<OutputBlock> {
    match (&item.data_type, &item.data) {
        (OutputDataType::Iterable, _) => None,
        (_, data @ Value::Object(_)) => serde_json::to_string_pretty(data).ok().map(OutputBlock::Json),
        (
            OutputDataType::Text | OutputDataType::TextPlain | OutputDataType::TextHtml,
            Value::String(text),
        ) => Some(OutputBlock::Text(text.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group(messages: Value, output: Value) -> ExecutionOutputGroup {
        serde_json::from_value(json!({
            "uuid": "req-1",
            "messages": messages,
            "output": output,
        }))
        .unwrap()
    }

    fn message(id: &str, status: &str, result_type: &str, timestamp: impl Into<Value>) -> Value {
        json!({
            "result_id": id,
            "status": status,
            "type": result_type,
            "timestamp": timestamp.into(),
            "process": { "message_request_uuid": "req-1" }
        })
    }

    #[test]
    fn test_derive_collects_errors_and_range() {
        let mut failed = message("2", "error", "status", 1_700_000_000_500_i64);
        failed["error"] = json!({
            "type": "ValueError",
            "message": "bad input",
            "stacktrace": ["line 1", "line 2"]
        });
        let view = ExecutionResultView::derive(&group(
            json!([message("1", "running", "stdout", 1_700_000_000_000_i64), failed]),
            json!([]),
        ));

        assert_eq!(view.errors.len(), 1);
        assert_eq!(view.errors[0].error_type.as_deref(), Some("ValueError"));
        assert_eq!(view.errors[0].stacktrace.len(), 2);
        assert_eq!(view.runtime_ms, Some(500.0));
        assert_eq!(view.status_label(), "error");
        assert!(!view.executing);
    }

    #[test]
    fn test_text_blocks_keep_arrival_order_and_dedup() {
        let mut late = message("a", "running", "stdout", 20);
        late["output"] = json!("second");
        let mut early = message("b", "running", "stdout", 10);
        early["output_text"] = json!("first");
        let mut blank = message("c", "running", "stdout", 5);
        blank["output"] = json!("");

        let group = group(json!([late.clone(), early, blank, late]), json!([]));
        let view = ExecutionResultView::derive(&group);

        let texts: Vec<&str> = view.text_blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, ["second", "first"]);
        assert_eq!(view.text_blocks[0].group_id, "req-1");
        assert_eq!(view.text_blocks[0].timestamp, "1970-01-01 00:00:00.020");
        assert_eq!(view.status_label(), "running");
    }

    #[test]
    fn test_fractional_timestamps_feed_range_and_labels() {
        let mut first = message("a", "running", "stdout", 1700000000123.5);
        first["output"] = json!("tick");
        let last = message("b", "success", "status", 1700000000125.75);
        let view = ExecutionResultView::derive(&group(json!([first, last]), json!([])));

        let range = view.timestamps.unwrap();
        assert_eq!(range.min, 1_700_000_000_123.5);
        assert_eq!(range.max, 1_700_000_000_125.75);
        assert_eq!(view.runtime_ms, Some(2.25));
        assert_eq!(view.text_blocks[0].timestamp, "2023-11-14 22:13:20.123");
    }

    #[test]
    fn test_non_finite_timestamp_formats_verbatim() {
        assert_eq!(format_timestamp(f64::NAN), "NaN");
    }

    #[test]
    fn test_output_marker_and_locator() {
        let mut success = message("s", "success", "output", 1);
        success["metadata"] = json!({ "namespace": "pipelines/etl", "path": "load.py" });
        let view = ExecutionResultView::derive(&group(json!([success]), json!([])));

        assert!(view.has_output_not_loaded);
        let (request_id, locator) = view.output_locator().unwrap();
        assert_eq!(request_id, "req-1");
        assert_eq!(locator.path, "load.py");
        assert_eq!(view.status_label(), "success");
    }

    #[test]
    fn test_fetched_iterable_output_renders_as_table() {
        let view = ExecutionResultView::derive(&group(
            json!([]),
            json!([
                { "data": "summary", "type": "text" },
                { "data": "more", "type": "text" },
                { "data": { "id": 1 }, "type": "iterable" }
            ]),
        ));
        assert_eq!(view.outputs.len(), 1);
        assert!(matches!(view.outputs[0], OutputBlock::Table(_)));
        assert!(view.timestamps.is_none());
    }

    #[test]
    fn test_non_tabular_output_renders_items() {
        let view = ExecutionResultView::derive(&group(
            json!([]),
            json!([
                { "data": { "rows": 3 }, "type": "dictionary_complex" },
                { "data": "done", "type": "text_plain" },
                { "data": "iVBORw0KGgo=", "type": "image_png" },
                { "data": [1, 2], "type": "iterable" },
                { "data": [3, 4], "type": "iterable" }
            ]),
        ));
        assert_eq!(
            view.outputs,
            vec![
                OutputBlock::Json("{\n  \"rows\": 3\n}".to_string()),
                OutputBlock::Text("done".to_string()),
            ]
        );
    }
}
