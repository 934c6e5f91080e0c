//! Application configuration for workbench
//!
//! `WorkbenchConfig` is immutable after loading and cheap to clone. Every
//! section deserializes with defaults, so a config file only has to name the
//! values it changes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use workbench_core::{
    Error, Result, DEFAULT_API_URL, DEFAULT_MAX_ENTRY_BYTES, DEFAULT_REMOTE_TIMEOUT_SECS,
    FILE_CACHE_NAMESPACE,
};
use workbench_utils::XdgPaths;

/// Which key-value store backs the file cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local; gone when the process exits
    Memory,
    /// One JSON document per key under `cache.dir`
    #[default]
    File,
}

impl FromStr for CacheBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "file" => Ok(CacheBackend::File),
            other => Err(Error::configuration(format!(
                "unknown cache backend '{other}' (expected 'memory' or 'file')"
            ))),
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheBackend::Memory => write!(f, "memory"),
            CacheBackend::File => write!(f, "file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Partition prefix of every cache key
    pub namespace: String,
    pub backend: CacheBackend,
    /// Directory used by the file backend
    pub dir: PathBuf,
    /// Largest serialized entry the store accepts
    pub max_entry_bytes: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            namespace: FILE_CACHE_NAMESPACE.to_string(),
            backend: CacheBackend::default(),
            dir: XdgPaths::cache_dir(),
            max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Base URL of the file and execution-output API
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_REMOTE_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    pub cache: CacheSettings,
    pub remote: RemoteSettings,
    pub log: LogSettings,
}

impl WorkbenchConfig {
    /// Reject values no component can work with
    pub fn validate(&self) -> Result<()> {
        if self.cache.namespace.trim().is_empty() {
            return Err(Error::configuration("cache.namespace must not be empty"));
        }
        if self.cache.max_entry_bytes == 0 {
            return Err(Error::configuration("cache.max_entry_bytes must be positive"));
        }
        url::Url::parse(&self.remote.base_url).map_err(|e| {
            Error::configuration(format!(
                "remote.base_url '{}' is not a valid URL: {e}",
                self.remote.base_url
            ))
        })?;
        if self.remote.timeout_secs == 0 {
            return Err(Error::configuration("remote.timeout_secs must be positive"));
        }
        Ok(())
    }
}
