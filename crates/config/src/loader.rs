//! Configuration loader with precedence handling
//!
//! Defaults < config file < environment variables < command line.

use crate::config::{CacheBackend, WorkbenchConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use workbench_core::{
    Error, Result, WORKBENCH_API_URL_VAR, WORKBENCH_CACHE_BACKEND_VAR, WORKBENCH_CACHE_DIR_VAR,
    WORKBENCH_CACHE_NAMESPACE_VAR, WORKBENCH_LOG_VAR,
};
use workbench_utils::XdgPaths;

/// Source of configuration for debugging and precedence tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default configuration
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// Environment variable
    EnvironmentVariable(String),
    /// Command line argument
    CommandLine,
}

/// Values given on the command line; `None` leaves the lower layers alone
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub cache_dir: Option<PathBuf>,
    pub cache_backend: Option<CacheBackend>,
    pub api_url: Option<String>,
    pub log_level: Option<String>,
}

/// The effective configuration plus every layer that contributed to it
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: WorkbenchConfig,
    pub sources: Vec<ConfigSource>,
}

pub struct ConfigLoader {
    /// Explicit config file; a missing explicit file is an error
    config_file: Option<PathBuf>,
    overrides: CliOverrides,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_file: None,
            overrides: CliOverrides::default(),
        }
    }

    pub fn config_file(mut self, path: PathBuf) -> Self {
        self.config_file = Some(path);
        self
    }

    pub fn overrides(mut self, overrides: CliOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Load configuration with full precedence handling
    pub fn load(self) -> Result<LoadedConfig> {
        self.load_with_env(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with an injectable environment lookup
    pub fn load_with_env<F>(self, lookup: F) -> Result<LoadedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = WorkbenchConfig::default();
        let mut sources = vec![ConfigSource::Default];

        let (path, explicit) = match &self.config_file {
            Some(path) => (path.clone(), true),
            None => (XdgPaths::config_file(), false),
        };
        if let Some(file_config) = Self::load_from_config_file(&path, explicit)? {
            config = file_config;
            sources.push(ConfigSource::ConfigFile(path));
        }

        sources.extend(Self::apply_env(&mut config, lookup)?);

        if self.apply_overrides(&mut config) {
            sources.push(ConfigSource::CommandLine);
        }

        config.validate()?;
        debug!(?sources, backend = %config.cache.backend, "configuration loaded");

        Ok(LoadedConfig { config, sources })
    }

    fn load_from_config_file(path: &Path, explicit: bool) -> Result<Option<WorkbenchConfig>> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => return Ok(None),
            Err(e) => return Err(Error::file_system(path, "read config file", e)),
        };

        serde_json::from_str(&raw).map(Some).map_err(|e| {
            Error::configuration(format!("invalid config file '{}': {e}", path.display()))
        })
    }

    fn apply_env<F>(config: &mut WorkbenchConfig, lookup: F) -> Result<Vec<ConfigSource>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut sources = Vec::new();
        let mut used = |var: &str| sources.push(ConfigSource::EnvironmentVariable(var.to_string()));

        if let Some(dir) = lookup(WORKBENCH_CACHE_DIR_VAR) {
            config.cache.dir = PathBuf::from(dir);
            used(WORKBENCH_CACHE_DIR_VAR);
        }
        if let Some(backend) = lookup(WORKBENCH_CACHE_BACKEND_VAR) {
            config.cache.backend = backend.parse()?;
            used(WORKBENCH_CACHE_BACKEND_VAR);
        }
        if let Some(namespace) = lookup(WORKBENCH_CACHE_NAMESPACE_VAR) {
            config.cache.namespace = namespace;
            used(WORKBENCH_CACHE_NAMESPACE_VAR);
        }
        if let Some(url) = lookup(WORKBENCH_API_URL_VAR) {
            config.remote.base_url = url;
            used(WORKBENCH_API_URL_VAR);
        }
        // WORKBENCH_LOG may hold a full filter directive; only a bare level
        // is copied into the config, the tracing layer reads the rest itself.
        if let Some(level) = lookup(WORKBENCH_LOG_VAR) {
            if !level.contains('=') && !level.contains(',') {
                config.log.level = level;
                used(WORKBENCH_LOG_VAR);
            }
        }

        Ok(sources)
    }

    fn apply_overrides(&self, config: &mut WorkbenchConfig) -> bool {
        let overrides = &self.overrides;
        let mut applied = false;

        if let Some(dir) = &overrides.cache_dir {
            config.cache.dir = dir.clone();
            applied = true;
        }
        if let Some(backend) = overrides.cache_backend {
            config.cache.backend = backend;
            applied = true;
        }
        if let Some(url) = &overrides.api_url {
            config.remote.base_url = url.clone();
            applied = true;
        }
        if let Some(level) = &overrides.log_level {
            config.log.level = level.clone();
            applied = true;
        }

        applied
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
