//! Core error types for the cache system

use std::path::PathBuf;

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Re-export CacheError as Error for convenience
pub use CacheError as Error;

/// Error type for key-value store and file cache operations
#[derive(Debug)]
pub enum CacheError {
    /// I/O errors from a durable backend
    Io {
        path: PathBuf,
        operation: &'static str,
        source: std::io::Error,
        recovery_hint: RecoveryHint,
    },

    /// A stored value could not be encoded or decoded
    Serialization {
        key: String,
        operation: SerializationOp,
        source: Box<dyn std::error::Error + Send + Sync>,
        recovery_hint: RecoveryHint,
    },

    /// Invalid cache key
    InvalidKey {
        key: String,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// Backend cannot be used at all
    StoreUnavailable {
        store_type: StoreType,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// A value is larger than the store accepts
    QuotaExceeded {
        key: String,
        requested_bytes: usize,
        limit_bytes: usize,
        recovery_hint: RecoveryHint,
    },
}

impl CacheError {
    pub fn recovery_hint(&self) -> &RecoveryHint {
        match self {
            Self::Io { recovery_hint, .. }
            | Self::Serialization { recovery_hint, .. }
            | Self::InvalidKey { recovery_hint, .. }
            | Self::StoreUnavailable { recovery_hint, .. }
            | Self::QuotaExceeded { recovery_hint, .. } => recovery_hint,
        }
    }

    pub(crate) fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
            recovery_hint: RecoveryHint::NoRecovery,
        }
    }

    pub(crate) fn encode(key: &str, source: serde_json::Error) -> Self {
        Self::Serialization {
            key: key.to_string(),
            operation: SerializationOp::Serialize,
            source: Box::new(source),
            recovery_hint: RecoveryHint::NoRecovery,
        }
    }

    pub(crate) fn decode(key: &str, source: serde_json::Error) -> Self {
        Self::Serialization {
            key: key.to_string(),
            operation: SerializationOp::Deserialize,
            source: Box::new(source),
            recovery_hint: RecoveryHint::ClearEntry {
                key: key.to_string(),
            },
        }
    }
}

/// Recovery hints for error handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryHint {
    /// Check file permissions
    CheckPermissions { path: PathBuf },

    /// Check disk space and clean up if needed
    CheckDiskSpace,

    /// Drop the offending entry; the next server fetch re-hydrates it
    ClearEntry { key: String },

    /// Remove entries or raise the configured quota
    FreeQuota { limit_bytes: usize },

    /// Recreate cache file/directory
    Recreate,

    /// No recovery possible
    NoRecovery,
}

/// Serialization operation types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializationOp {
    Serialize,
    Deserialize,
}

/// Cache store types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreType {
    Memory,
    FileSystem,
}
