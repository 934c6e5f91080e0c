use crate::context::AppContext;
use eyre::WrapErr;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use workbench_core::ExecutionResult;
use workbench_execution::{ExecutionResultView, ExecutionStreamHub};

const REPLAY_CONSUMER: &str = "replay";

pub async fn execute(
    context: &AppContext,
    events: &Path,
    descending: bool,
    fetch_outputs: bool,
) -> eyre::Result<()> {
    let results = read_events(events)?;
    tracing::info!(path = %events.display(), count = results.len(), "replaying execution results");

    let hub = ExecutionStreamHub::new(results.len());
    let aggregator = Arc::new(context.aggregator(REPLAY_CONSUMER)?);

    let receiver = hub.subscribe(REPLAY_CONSUMER);
    let consumer = tokio::spawn({
        let aggregator = Arc::clone(&aggregator);
        async move { aggregator.consume(receiver).await }
    });
    for result in results {
        hub.publish(REPLAY_CONSUMER, result);
    }
    hub.close(REPLAY_CONSUMER);
    let appended = consumer.await?;
    tracing::debug!(appended, groups = aggregator.len(), "replay applied");

    if fetch_outputs {
        for group in aggregator.list_groups(true) {
            let view = ExecutionResultView::derive(&group);
            if view.has_output_not_loaded && view.output_locator().is_some() {
                if let Err(e) = aggregator.fetch_full_output(&group.uuid).await {
                    tracing::warn!(group_id = %group.uuid, error = %e, "could not load output");
                }
            }
        }
    }

    for group in aggregator.list_groups(!descending) {
        let view = ExecutionResultView::derive(&group);
        let executing = aggregator.compute_executing_state(&group.uuid);
        let rendered = json!({
            "status": view.status_label(),
            "executing": executing,
            "view": view,
        });
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    }
    Ok(())
}

/// Parse one `ExecutionResult` per non-blank line
fn read_events(path: &Path) -> eyre::Result<Vec<ExecutionResult>> {
    let raw = fs::read_to_string(path)
        .wrap_err_with(|| format!("reading execution log {}", path.display()))?;

    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .wrap_err_with(|| format!("{}:{}: invalid execution result", path.display(), index + 1))
        })
        .collect()
}
