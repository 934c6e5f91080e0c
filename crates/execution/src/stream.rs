//! Per-consumer broadcast of streamed execution results

use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tracing::{debug, trace};
use workbench_core::ExecutionResult;

pub const DEFAULT_STREAM_CAPACITY: usize = 1024;

/// Routes results to the receivers subscribed under a consumer id.
///
/// Each consumer id owns one broadcast channel, created on first subscribe.
/// Publishing never creates a channel. Delivery order per channel is publish
/// order.
pub struct ExecutionStreamHub {
    capacity: usize,
    channels: RwLock<HashMap<String, broadcast::Sender<ExecutionResult>>>,
}

impl ExecutionStreamHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: RwLock::new(HashMap::new()),
        }
    }

    pub fn subscribe(&self, consumer_id: &str) -> broadcast::Receiver<ExecutionResult> {
        if let Some(sender) = self.channels.read().get(consumer_id) {
            return sender.subscribe();
        }
        self.channels
            .write()
            .entry(consumer_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Send `result` to every receiver of `consumer_id`; returns how many got it
    pub fn publish(&self, consumer_id: &str, result: ExecutionResult) -> usize {
        let result_id = result.result_id.clone();
        let Some(sender) = self.channels.read().get(consumer_id).cloned() else {
            debug!(consumer_id, result_id = %result_id, "no channel for execution result");
            return 0;
        };
        match sender.send(result) {
            Ok(receivers) => {
                trace!(consumer_id, result_id = %result_id, receivers, "published execution result");
                receivers
            }
            Err(_) => {
                debug!(consumer_id, result_id = %result_id, "no subscribers for execution result");
                0
            }
        }
    }

    /// Drop the channel; its receivers drain what is buffered and then end
    pub fn close(&self, consumer_id: &str) -> bool {
        self.channels.write().remove(consumer_id).is_some()
    }

    pub fn receiver_count(&self, consumer_id: &str) -> usize {
        self.channels
            .read()
            .get(consumer_id)
            .map_or(0, broadcast::Sender::receiver_count)
    }
}

impl Default for ExecutionStreamHub {
    fn default() -> Self {
        Self::new(DEFAULT_STREAM_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(id: &str) -> ExecutionResult {
        serde_json::from_value(json!({
            "result_id": id,
            "status": "running",
            "type": "stdout",
            "timestamp": 1,
            "process": { "message_request_uuid": "req" }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_consumers_are_isolated() {
        let hub = ExecutionStreamHub::default();
        let mut first = hub.subscribe("consumer-1");
        let mut second = hub.subscribe("consumer-2");

        assert_eq!(hub.publish("consumer-1", result("a")), 1);
        assert_eq!(first.recv().await.unwrap().result_id, "a");
        assert!(second.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_close_ends_receivers() {
        let hub = ExecutionStreamHub::default();
        let mut receiver = hub.subscribe("c");
        hub.publish("c", result("a"));

        assert!(hub.close("c"));
        assert_eq!(receiver.recv().await.unwrap().result_id, "a");
        assert!(matches!(
            receiver.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let hub = ExecutionStreamHub::new(4);
        assert_eq!(hub.publish("nobody", result("a")), 0);
        assert_eq!(hub.receiver_count("nobody"), 0);
        assert!(!hub.close("nobody"), "publishing must not open a channel");
    }

    #[tokio::test]
    async fn test_publish_after_last_receiver_dropped() {
        let hub = ExecutionStreamHub::new(4);
        drop(hub.subscribe("c"));

        assert_eq!(hub.publish("c", result("a")), 0);
        let mut receiver = hub.subscribe("c");
        assert_eq!(hub.publish("c", result("b")), 1);
        assert_eq!(receiver.recv().await.unwrap().result_id, "b");
    }
}
