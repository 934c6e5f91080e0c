//! Key-value storage backends
//!
//! The file cache only needs what browser storage offers: string values
//! addressed by string keys. Two backends are provided:
//! - `MemoryStore`, process-local
//! - `FileStore`, one JSON document per key, surviving restarts

mod file;
mod memory;
#[cfg(test)]
mod tests;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::errors::{CacheError, RecoveryHint, Result};

/// Opaque string key-value store
///
/// Implementations propagate failures; callers decide whether to retry.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Returns whether a value was present
    fn remove(&self, key: &str) -> Result<bool>;

    /// All keys currently stored, in no particular order
    fn keys(&self) -> Result<Vec<String>>;
}

pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::invalid_key(key, "key must not be empty"));
    }
    Ok(())
}

pub(crate) fn check_quota(key: &str, value: &str, limit: Option<usize>) -> Result<()> {
    match limit {
        Some(limit_bytes) if value.len() > limit_bytes => Err(CacheError::QuotaExceeded {
            key: key.to_string(),
            requested_bytes: value.len(),
            limit_bytes,
            recovery_hint: RecoveryHint::FreeQuota { limit_bytes },
        }),
        _ => Ok(()),
    }
}
