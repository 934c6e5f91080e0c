//! Shared utilities for the workbench crates
//!
//! Tracing setup, atomic file writes and XDG directory resolution.

pub mod atomic_file;
pub mod tracing;
pub mod xdg;

pub use atomic_file::*;
pub use xdg::*;
