//! In-memory aggregation of streamed execution results
//!
//! One aggregator serves one consumer (session). Results are grouped by the
//! request that produced them and appended in delivery order; a result id
//! already present in its group is ignored, so redelivery is harmless.

use crate::remote::{OutputLocator, OutputService};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, trace, warn, Instrument};
use workbench_core::{Error, ExecutionOutputGroup, ExecutionResult, Result};
use workbench_utils::tracing::group_span;

pub struct ExecutionOutputAggregator {
    consumer_id: String,
    groups: RwLock<HashMap<String, ExecutionOutputGroup>>,
    outputs: Arc<dyn OutputService>,
}

impl ExecutionOutputAggregator {
    pub fn new(consumer_id: impl Into<String>, outputs: Arc<dyn OutputService>) -> Self {
        Self {
            consumer_id: consumer_id.into(),
            groups: RwLock::new(HashMap::new()),
            outputs,
        }
    }

    pub fn consumer_id(&self) -> &str {
        &self.consumer_id
    }

    /// Add `result` to its group, creating the group on first sight.
    /// Returns false when the result id was already recorded.
    pub fn append_result(&self, result: ExecutionResult) -> bool {
        let group_id = result.group_id().to_string();
        let result_id = result.result_id.clone();

        let mut groups = self.groups.write();
        let group = groups
            .entry(group_id.clone())
            .or_insert_with(|| ExecutionOutputGroup::new(group_id.as_str()));
        let added = group.push(result);

        if added {
            trace!(group_id = %group_id, result_id = %result_id, "appended execution result");
        } else {
            debug!(group_id = %group_id, result_id = %result_id, "ignored duplicate execution result");
        }
        added
    }

    /// Whether the group still counts as executing.
    ///
    /// True only while none of its messages is terminal: a single finished
    /// message ends the executing state even if siblings are still pending.
    /// Unknown groups are not executing.
    pub fn compute_executing_state(&self, group_id: &str) -> bool {
        self.groups
            .read()
            .get(group_id)
            .is_some_and(|group| group.messages().iter().all(|message| !message.is_done()))
    }

    /// Snapshot of every group, ordered by uuid
    pub fn list_groups(&self, ascending: bool) -> Vec<ExecutionOutputGroup> {
        let mut groups: Vec<ExecutionOutputGroup> = self.groups.read().values().cloned().collect();
        groups.sort_by(|a, b| a.uuid.cmp(&b.uuid));
        if !ascending {
            groups.reverse();
        }
        groups
    }

    pub fn group(&self, group_id: &str) -> Option<ExecutionOutputGroup> {
        self.groups.read().get(group_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }

    /// Fetch the complete output of a group and replace the group with it.
    ///
    /// The locator comes from the metadata of the group's first successful
    /// message. The fetched payload replaces the entry wholesale; on failure
    /// the entry is left as it was.
    pub async fn fetch_full_output(&self, group_id: &str) -> Result<ExecutionOutputGroup> {
        let locator = self.locator_for(group_id)?;
        let span = group_span(group_id);

        let fetched = self
            .outputs
            .fetch_detail(group_id, &locator)
            .instrument(span)
            .await
            .map_err(|e| {
                warn!(group_id, error = %e, "execution output fetch failed");
                e
            })?;

        let mut groups = self.groups.write();
        if groups.contains_key(group_id) {
            groups.insert(group_id.to_string(), fetched.clone());
            info!(
                group_id,
                messages = fetched.len(),
                outputs = fetched.output.len(),
                "loaded full execution output"
            );
        } else {
            debug!(group_id, "group deleted while its output was loading");
        }
        Ok(fetched)
    }

    pub fn delete_group(&self, group_id: &str) -> bool {
        let removed = self.groups.write().remove(group_id).is_some();
        if removed {
            debug!(group_id, "deleted execution group");
        }
        removed
    }

    pub fn delete_all_groups(&self) -> usize {
        let mut groups = self.groups.write();
        let count = groups.len();
        groups.clear();
        debug!(consumer_id = %self.consumer_id, count, "deleted all execution groups");
        count
    }

    /// Apply results from `receiver` in delivery order until the channel
    /// closes. Returns how many results were newly appended.
    pub async fn consume(&self, mut receiver: broadcast::Receiver<ExecutionResult>) -> usize {
        let mut appended = 0;
        loop {
            match receiver.recv().await {
                Ok(result) => {
                    if self.append_result(result) {
                        appended += 1;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(consumer_id = %self.consumer_id, skipped, "execution stream lagged, results dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!(consumer_id = %self.consumer_id, appended, "execution stream closed");
        appended
    }

    fn locator_for(&self, group_id: &str) -> Result<OutputLocator> {
        let groups = self.groups.read();
        let group = groups
            .get(group_id)
            .ok_or_else(|| Error::not_found("execution group", group_id))?;
        let metadata = group
            .first_success()
            .and_then(|message| message.metadata.as_ref())
            .ok_or_else(|| {
                Error::invalid_state(format!(
                    "execution group '{group_id}' has no successful message to locate its output"
                ))
            })?;

        match (&metadata.namespace, &metadata.path) {
            (Some(namespace), Some(path)) => Ok(OutputLocator {
                namespace: namespace.clone(),
                path: path.clone(),
            }),
            _ => Err(Error::invalid_state(format!(
                "execution group '{group_id}' has no output namespace/path"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct NoOutputs;

    #[async_trait]
    impl OutputService for NoOutputs {
        async fn fetch_detail(
            &self,
            request_id: &str,
            _locator: &OutputLocator,
        ) -> Result<ExecutionOutputGroup> {
            Err(Error::remote("test", "fetch output", format!("{request_id} unavailable")))
        }
    }

    fn result(group: &str, id: &str, status: &str) -> ExecutionResult {
        serde_json::from_value(json!({
            "result_id": id,
            "status": status,
            "type": "stdout",
            "timestamp": 1,
            "process": { "message_request_uuid": group }
        }))
        .unwrap()
    }

    fn aggregator() -> ExecutionOutputAggregator {
        ExecutionOutputAggregator::new("consumer", Arc::new(NoOutputs))
    }

    #[test]
    fn test_executing_until_any_message_is_terminal() {
        let aggregator = aggregator();
        aggregator.append_result(result("g", "1", "pending"));
        aggregator.append_result(result("g", "2", "pending"));
        assert!(aggregator.compute_executing_state("g"));

        aggregator.append_result(result("g", "3", "success"));
        assert!(!aggregator.compute_executing_state("g"));
        assert!(!aggregator.compute_executing_state("unknown"));
    }

    #[test]
    fn test_list_groups_sorts_by_uuid() {
        let aggregator = aggregator();
        for group in ["b", "a", "c"] {
            aggregator.append_result(result(group, "1", "running"));
        }

        let ascending: Vec<String> = aggregator
            .list_groups(true)
            .into_iter()
            .map(|group| group.uuid)
            .collect();
        assert_eq!(ascending, ["a", "b", "c"]);

        let descending: Vec<String> = aggregator
            .list_groups(false)
            .into_iter()
            .map(|group| group.uuid)
            .collect();
        assert_eq!(descending, ["c", "b", "a"]);
    }

    #[test]
    fn test_delete_groups() {
        let aggregator = aggregator();
        aggregator.append_result(result("a", "1", "running"));
        aggregator.append_result(result("b", "1", "running"));

        assert!(aggregator.delete_group("a"));
        assert!(!aggregator.delete_group("a"));
        assert_eq!(aggregator.delete_all_groups(), 1);
        assert!(aggregator.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_requires_success_metadata() {
        let aggregator = aggregator();
        aggregator.append_result(result("g", "1", "running"));

        let err = aggregator.fetch_full_output("g").await.unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));

        let err = aggregator.fetch_full_output("missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
