//! Core domain types, errors, and constants for the workbench.
//!
//! ## Key Components
//!
//! - **`errors`**: the primary `Error` enum and `Result` alias shared by every
//!   crate in the workspace.
//! - **`types`**: file snapshots, cache entries, execution results and groups.
//! - **`clock`**: the time source stamped onto cache snapshots.
//! - **`constants`**: shared names and defaults.

pub mod clock;
pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    clock::{Clock, ManualClock, SystemClock},
    constants::*,
    errors::{Error, Result, ResultExt},
    types::*,
};
