//! Services a command needs, built from the effective configuration

use std::sync::Arc;
use std::time::Duration;
use workbench_cache::{FileCacheStore, FileCacheStoreBuilder};
use workbench_config::WorkbenchConfig;
use workbench_core::Result;
use workbench_execution::{ExecutionOutputAggregator, HttpOutputService};
use workbench_files::{FileReconciler, HttpFileService};

pub struct AppContext {
    config: WorkbenchConfig,
}

impl AppContext {
    pub fn new(config: WorkbenchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    pub fn cache(&self) -> Result<Arc<FileCacheStore>> {
        let store = FileCacheStoreBuilder::new()
            .with_settings(self.config.cache.clone())
            .build()?;
        Ok(Arc::new(store))
    }

    pub fn reconciler(&self) -> Result<FileReconciler> {
        let remote = HttpFileService::new(&self.config.remote.base_url, self.timeout())?;
        Ok(FileReconciler::new(self.cache()?, Arc::new(remote)))
    }

    pub fn aggregator(&self, consumer_id: &str) -> Result<ExecutionOutputAggregator> {
        let outputs = HttpOutputService::new(&self.config.remote.base_url, self.timeout())?;
        Ok(ExecutionOutputAggregator::new(consumer_id, Arc::new(outputs)))
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.remote.timeout_secs)
    }
}
