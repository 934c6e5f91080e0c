//! File content cache for workbench
//!
//! This crate provides:
//! - `KeyValueStore`, the opaque string store the cache persists into, with
//!   in-memory and directory-backed implementations
//! - `FileCacheStore`, the per-path client/server snapshot pair with
//!   staleness tracking
//! - `FileCacheStoreBuilder`, wiring the above from `CacheSettings`

pub mod builder;
pub mod errors;
pub mod file_cache;
pub mod storage;

pub use builder::FileCacheStoreBuilder;
pub use errors::{CacheError, Error, RecoveryHint, Result};
pub use file_cache::FileCacheStore;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
