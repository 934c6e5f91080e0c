/// Constants used throughout the workbench codebase
// Cache partition
pub const FILE_CACHE_NAMESPACE: &str = "workbench_file_cache";
pub const CACHE_KEY_SEPARATOR: &str = "-";

// Environment variable names
pub const WORKBENCH_LOG_VAR: &str = "WORKBENCH_LOG";
pub const WORKBENCH_CACHE_DIR_VAR: &str = "WORKBENCH_CACHE_DIR";
pub const WORKBENCH_CACHE_BACKEND_VAR: &str = "WORKBENCH_CACHE_BACKEND";
pub const WORKBENCH_CACHE_NAMESPACE_VAR: &str = "WORKBENCH_CACHE_NAMESPACE";
pub const WORKBENCH_API_URL_VAR: &str = "WORKBENCH_API_URL";

// Remote service defaults
pub const DEFAULT_API_URL: &str = "http://localhost:6789";
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;

// Browser storage quota emulation (5 MiB per value)
pub const DEFAULT_MAX_ENTRY_BYTES: usize = 5 * 1024 * 1024;

// Output rendering
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
