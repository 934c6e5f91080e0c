//! Core domain types for the workbench.
//!
//! - **`files`**: client/server file snapshots and the cache entry pairing them
//! - **`execution`**: streamed execution results and the groups they form

pub mod execution;
pub mod files;

pub use execution::*;
pub use files::*;
