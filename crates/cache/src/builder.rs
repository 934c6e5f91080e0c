//! Construct a `FileCacheStore` from configuration

use crate::errors::Result;
use crate::file_cache::FileCacheStore;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use workbench_config::{CacheBackend, CacheSettings};
use workbench_core::Clock;

/// Builder for FileCacheStore
pub struct FileCacheStoreBuilder {
    settings: CacheSettings,
    clock: Option<Arc<dyn Clock>>,
}

impl FileCacheStoreBuilder {
    pub fn new() -> Self {
        Self {
            settings: CacheSettings::default(),
            clock: None,
        }
    }

    pub fn with_settings(mut self, settings: CacheSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_backend(mut self, backend: CacheBackend) -> Self {
        self.settings.backend = backend;
        self
    }

    pub fn with_dir(mut self, dir: PathBuf) -> Self {
        self.settings.dir = dir;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.settings.namespace = namespace.into();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<FileCacheStore> {
        let settings = self.settings;
        let store: Arc<dyn KeyValueStore> = match settings.backend {
            CacheBackend::Memory => Arc::new(MemoryStore::with_quota(settings.max_entry_bytes)),
            CacheBackend::File => Arc::new(
                FileStore::open(&settings.dir)?.with_quota(settings.max_entry_bytes),
            ),
        };
        info!(
            backend = %settings.backend,
            namespace = %settings.namespace,
            dir = %settings.dir.display(),
            "file cache opened"
        );

        let cache = FileCacheStore::new(store, settings.namespace);
        Ok(match self.clock {
            Some(clock) => cache.with_clock(clock),
            None => cache,
        })
    }
}

impl Default for FileCacheStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use workbench_core::{FilePatch, FileUpdate};

    #[test]
    fn test_file_backend_persists_between_builds() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();

        let first = FileCacheStoreBuilder::new()
            .with_dir(temp_dir.path().to_path_buf())
            .with_namespace("test_ns")
            .build()?;
        first.update(FileUpdate::client(FilePatch::content("a.py", "kept")))?;
        drop(first);

        let second = FileCacheStoreBuilder::new()
            .with_dir(temp_dir.path().to_path_buf())
            .with_namespace("test_ns")
            .build()?;
        let entry = second.get("a.py")?.unwrap();
        assert_eq!(entry.client_content(), Some("kept"));
        Ok(())
    }

    #[test]
    fn test_namespaces_are_isolated() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let build = |namespace: &str| {
            FileCacheStoreBuilder::new()
                .with_dir(temp_dir.path().to_path_buf())
                .with_namespace(namespace)
                .build()
        };

        build("one")?.update(FileUpdate::client(FilePatch::content("a.py", "1")))?;
        assert_eq!(build("two")?.get("a.py")?, None);
        assert_eq!(build("two")?.list()?.len(), 0);
        Ok(())
    }

    #[test]
    fn test_memory_backend() -> Result<()> {
        let cache = FileCacheStoreBuilder::new()
            .with_backend(CacheBackend::Memory)
            .build()?;
        cache.update(FileUpdate::client(FilePatch::content("a.py", "x")))?;
        assert!(cache.is_stale("a.py")?);
        Ok(())
    }
}
