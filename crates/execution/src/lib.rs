//! Execution output aggregation for workbench
//!
//! Streamed `ExecutionResult` events are grouped by originating request in an
//! `ExecutionOutputAggregator`; complete output is fetched on demand through
//! an `OutputService`; `ExecutionResultView::derive` turns one group into
//! what a renderer shows.

pub mod aggregator;
pub mod remote;
pub mod stream;
pub mod view;

pub use aggregator::ExecutionOutputAggregator;
pub use remote::{HttpOutputService, OutputLocator, OutputService};
pub use stream::ExecutionStreamHub;
pub use view::{
    ErrorBlock, ExecutionResultView, OutputBlock, Table, TableColumn, TextBlock, TimestampRange,
};
