use super::{check_quota, validate_key, KeyValueStore};
use crate::errors::{CacheError, RecoveryHint, Result, StoreType};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use workbench_utils::write_atomic_string;

const VALUE_EXTENSION: &str = "json";

/// On-disk document: the key travels with its value because the file name
/// is a one-way digest
#[derive(Serialize, Deserialize)]
struct StoredValue {
    key: String,
    value: String,
}

/// Directory-backed store: one file per key.
///
/// File names are the SHA-256 of the key, so every key, however long or
/// exotic, maps to a fixed-length, filesystem-safe name.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    max_value_bytes: Option<usize>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| CacheError::Io {
            recovery_hint: RecoveryHint::CheckPermissions { path: dir.clone() },
            path: dir.clone(),
            operation: "create store directory",
            source,
        })?;
        if !dir.is_dir() {
            return Err(CacheError::StoreUnavailable {
                store_type: StoreType::FileSystem,
                reason: format!("'{}' is not a directory", dir.display()),
                recovery_hint: RecoveryHint::Recreate,
            });
        }
        Ok(Self {
            dir,
            max_value_bytes: None,
        })
    }

    /// Reject values larger than `max_value_bytes`
    pub fn with_quota(mut self, max_value_bytes: usize) -> Self {
        self.max_value_bytes = Some(max_value_bytes);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn value_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir
            .join(format!("{}.{VALUE_EXTENSION}", hex::encode(digest)))
    }

    fn is_value_file(name: &str) -> bool {
        name.strip_suffix(&format!(".{VALUE_EXTENSION}"))
            .is_some_and(|stem| stem.len() == 64 && stem.bytes().all(|b| b.is_ascii_hexdigit()))
    }

    fn read_document(path: &Path) -> Result<Option<StoredValue>> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Io {
                    recovery_hint: RecoveryHint::CheckPermissions {
                        path: path.to_path_buf(),
                    },
                    path: path.to_path_buf(),
                    operation: "read value",
                    source,
                })
            }
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| CacheError::decode(&path.display().to_string(), e))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let document = Self::read_document(&self.value_path(key))?;
        Ok(document
            .filter(|document| document.key == key)
            .map(|document| document.value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        check_quota(key, value, self.max_value_bytes)?;
        let document = serde_json::to_string(&StoredValue {
            key: key.to_string(),
            value: value.to_string(),
        })
        .map_err(|e| CacheError::encode(key, e))?;
        write_atomic_string(&self.value_path(key), &document)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        let path = self.value_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CacheError::Io {
                recovery_hint: RecoveryHint::CheckPermissions { path: path.clone() },
                path,
                operation: "remove value",
                source,
            }),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|source| CacheError::Io {
            recovery_hint: RecoveryHint::Recreate,
            path: self.dir.clone(),
            operation: "list store directory",
            source,
        })?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry?;
            // Temporary files from in-flight atomic writes start with '.'
            let is_value = entry.file_name().to_str().is_some_and(Self::is_value_file);
            if !is_value {
                continue;
            }
            match Self::read_document(&entry.path()) {
                Ok(Some(document)) => keys.push(document.key),
                Ok(None) => {}
                Err(e) => debug!(path = %entry.path().display(), error = %e, "skipping unreadable value file"),
            }
        }
        Ok(keys)
    }
}
