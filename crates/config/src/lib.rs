//! Layered configuration for workbench
//!
//! Defaults, an optional JSON config file, `WORKBENCH_*` environment variables
//! and command line flags, applied in that order.

pub mod config;
pub mod loader;

pub use config::{CacheBackend, CacheSettings, LogSettings, RemoteSettings, WorkbenchConfig};
pub use loader::{CliOverrides, ConfigLoader, ConfigSource, LoadedConfig};
