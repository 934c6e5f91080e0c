//! Error conversion utilities

use super::types::{CacheError, RecoveryHint, SerializationOp, StoreType};
use std::path::PathBuf;

impl From<std::io::Error> for CacheError {
    fn from(error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        let recovery_hint = match error.kind() {
            ErrorKind::PermissionDenied => RecoveryHint::CheckPermissions {
                path: PathBuf::from("."),
            },
            ErrorKind::NotFound => RecoveryHint::Recreate,
            _ => RecoveryHint::CheckDiskSpace,
        };

        Self::Io {
            path: PathBuf::from("."),
            operation: "unknown",
            source: error,
            recovery_hint,
        }
    }
}

/// Convert serde_json errors to cache errors
impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            key: String::new(),
            operation: SerializationOp::Deserialize,
            source: Box::new(error),
            recovery_hint: RecoveryHint::NoRecovery,
        }
    }
}

/// Failures reported by the shared file helpers
impl From<workbench_core::Error> for CacheError {
    fn from(error: workbench_core::Error) -> Self {
        match error {
            workbench_core::Error::FileSystem { path, source, .. } => Self::Io {
                recovery_hint: RecoveryHint::CheckPermissions { path: path.clone() },
                path,
                operation: "file store write",
                source,
            },
            other => Self::StoreUnavailable {
                store_type: StoreType::FileSystem,
                reason: other.to_string(),
                recovery_hint: RecoveryHint::NoRecovery,
            },
        }
    }
}

/// Convert cache errors to core errors
impl From<CacheError> for workbench_core::Error {
    fn from(error: CacheError) -> Self {
        let operation = match &error {
            CacheError::Io { operation, .. } => (*operation).to_string(),
            CacheError::Serialization { operation, .. } => format!("{operation:?}").to_lowercase(),
            CacheError::InvalidKey { .. } => "key validation".to_string(),
            CacheError::StoreUnavailable { .. } => "open".to_string(),
            CacheError::QuotaExceeded { .. } => "write".to_string(),
        };
        workbench_core::Error::cache_with_source(operation, error)
    }
}
