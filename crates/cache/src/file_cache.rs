//! Two-sided (client/server) file snapshot cache
//!
//! Each path owns one `FileCacheEntry` stored under `"<namespace>-<path>"`.
//! Writes merge onto the previous snapshot of the side they touch and stamp
//! it with the injected clock; `cachedAt` is fixed when the entry is first
//! written, and a side that appears later inherits it.

use crate::errors::{CacheError, Result};
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;
use workbench_core::{
    Clock, FileCacheEntry, FilePatch, FileSnapshot, FileUpdate, SystemClock, CACHE_KEY_SEPARATOR,
};
use workbench_utils::tracing::cache_event;

pub struct FileCacheStore {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    clock: Arc<dyn Clock>,
}

impl FileCacheStore {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Storage key for `path`
    pub fn key_for(&self, path: &str) -> String {
        format!("{}{CACHE_KEY_SEPARATOR}{path}", self.namespace)
    }

    /// The entry for `path`, or `None` if it was never written
    pub fn get(&self, path: &str) -> Result<Option<FileCacheEntry>> {
        let key = self.key_for(path);
        let raw = self.store.get(&key)?;
        cache_event(&key, raw.is_some(), "get");

        raw.map(|raw| serde_json::from_str(&raw).map_err(|e| CacheError::decode(&key, e)))
            .transpose()
    }

    /// Merge `update` into the stored entry and persist the whole entry
    pub fn update(&self, update: FileUpdate) -> Result<FileCacheEntry> {
        let path = update
            .path()
            .filter(|path| !path.is_empty())
            .ok_or_else(|| CacheError::invalid_key("", "update names no file path"))?
            .to_string();

        let previous = self.get(&path)?;
        let now = self.clock.now();
        let (previous_client, previous_server) = match previous {
            Some(entry) => (entry.client, entry.server),
            None => (None, None),
        };
        let cached_at = previous_client
            .iter()
            .chain(previous_server.iter())
            .map(|snapshot| snapshot.cached_at)
            .min()
            .unwrap_or(now);

        let client = match update.client {
            Some(patch) => Some(merge_side(previous_client, patch, cached_at, now)),
            None => previous_client,
        };
        let server = match update.server {
            Some(record) => Some(merge_side(previous_server, record.into(), cached_at, now)),
            None => previous_server,
        };

        let entry = FileCacheEntry {
            path,
            client,
            server,
        };
        self.put(&entry)?;
        Ok(entry)
    }

    /// Client and server content differ (an unknown path is not stale)
    pub fn is_stale(&self, path: &str) -> Result<bool> {
        Ok(self
            .get(path)?
            .map(|entry| entry.is_stale())
            .unwrap_or(false))
    }

    /// Drop the entry for `path`; returns whether one existed
    pub fn remove(&self, path: &str) -> Result<bool> {
        let key = self.key_for(path);
        let removed = self.store.remove(&key)?;
        debug!(key = %key, removed, "cache entry removed");
        Ok(removed)
    }

    /// Every entry in this namespace, ordered by path
    pub fn list(&self) -> Result<Vec<FileCacheEntry>> {
        let prefix = self.key_for("");
        let mut entries = Vec::new();
        for key in self.store.keys()? {
            let Some(path) = key.strip_prefix(&prefix) else {
                continue;
            };
            // A longer namespace sharing this prefix stores other paths
            match self.get(path)? {
                Some(entry) if entry.path == path => entries.push(entry),
                _ => {}
            }
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn put(&self, entry: &FileCacheEntry) -> Result<()> {
        let key = self.key_for(&entry.path);
        let raw = serde_json::to_string(entry).map_err(|e| CacheError::encode(&key, e))?;
        self.store.set(&key, &raw)?;
        debug!(
            key = %key,
            bytes = raw.len(),
            stale = entry.is_stale(),
            "cache entry written"
        );
        Ok(())
    }
}

/// `cached_at` is the entry's creation time; a side that already exists keeps
/// its own stamp
fn merge_side(
    previous: Option<FileSnapshot>,
    patch: FilePatch,
    cached_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> FileSnapshot {
    match previous {
        Some(previous) => FileSnapshot {
            file: patch.merge_onto(Some(previous.file)),
            cached_at: previous.cached_at,
            updated_at: now,
        },
        None => FileSnapshot {
            file: patch.merge_onto(None),
            cached_at,
            updated_at: now,
        },
    }
}
