use std::path::PathBuf;

/// Result type alias for workbench operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for workbench operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Durable cache read/write failures (storage quota, serialization)
    #[error("cache {operation} failed: {message}")]
    Cache {
        operation: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Remote file or execution-output service failures
    #[error("remote {operation} against '{endpoint}' failed: {message}")]
    Remote {
        endpoint: String,
        operation: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An operation was attempted from a state that does not allow it
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    /// A referenced path, group or entry does not exist
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::FileSystem {
            path: PathBuf::new(),
            operation: "unknown".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}

// Helper methods for creating errors with context
impl Error {
    /// Create a cache error
    #[must_use]
    pub fn cache(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Cache {
            operation: operation.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a cache error wrapping its cause
    #[must_use]
    pub fn cache_with_source(
        operation: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let source = source.into();
        Error::Cache {
            operation: operation.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a remote service error
    #[must_use]
    pub fn remote(
        endpoint: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Remote {
            endpoint: endpoint.into(),
            operation: operation.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a remote service error wrapping its cause
    #[must_use]
    pub fn remote_with_source(
        endpoint: impl Into<String>,
        operation: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let source = source.into();
        Error::Remote {
            endpoint: endpoint.into(),
            operation: operation.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create an invalid state error
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Error::InvalidState {
            message: message.into(),
        }
    }

    /// Create a not found error
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Whether the failure came from a remote collaborator
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Remote { .. })
    }
}

// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to a Result
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a lazy message
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let base_error = e.into();
            Error::Configuration {
                message: format!("{}: {}", message.into(), base_error),
            }
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let base_error = e.into();
            Error::Configuration {
                message: format!("{}: {}", f(), base_error),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = Error::remote("http://localhost:6789/api/files/a.py", "fetch", "502 Bad Gateway");
        assert_eq!(
            err.to_string(),
            "remote fetch against 'http://localhost:6789/api/files/a.py' failed: 502 Bad Gateway"
        );
        assert!(err.is_remote());
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("execution group", "abc");
        assert_eq!(err.to_string(), "execution group 'abc' not found");
        assert!(!err.is_remote());
    }

    #[test]
    fn test_context_wraps_message() {
        let result: std::result::Result<(), Error> = Err(Error::invalid_state("closed"));
        let err = result.context("saving file").unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: saving file: invalid state: closed"
        );
    }
}
