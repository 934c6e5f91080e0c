//! File snapshot types shared by the cache store and the reconciler

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A file as the remote file service describes it.
///
/// Only `path` and `content` are interpreted; any other attribute the server
/// sends (name, language, modification time, ...) is carried along in `extra`
/// so a cache round-trip does not drop it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: Some(content.into()),
            extra: Map::new(),
        }
    }
}

/// A partial [`FileRecord`]: every field present overrides the previous value,
/// every absent field is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FilePatch {
    /// The `{ path, content }` patch an editor change produces
    pub fn content(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            content: Some(content.into()),
            extra: Map::new(),
        }
    }

    /// Shallow merge onto `base`, producing the new record
    pub fn merge_onto(self, base: Option<FileRecord>) -> FileRecord {
        let mut merged = base.unwrap_or_default();
        if let Some(path) = self.path {
            merged.path = path;
        }
        if self.content.is_some() {
            merged.content = self.content;
        }
        for (key, value) in self.extra {
            merged.extra.insert(key, value);
        }
        merged
    }
}

impl From<FileRecord> for FilePatch {
    fn from(record: FileRecord) -> Self {
        Self {
            path: Some(record.path),
            content: record.content,
            extra: record.extra,
        }
    }
}

/// One side (client or server) of a file's known content at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSnapshot {
    pub file: FileRecord,
    pub cached_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileSnapshot {
    pub fn content(&self) -> Option<&str> {
        self.file.content.as_deref()
    }
}

/// The persisted two-sided record for one path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCacheEntry {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<FileSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<FileSnapshot>,
}

impl FileCacheEntry {
    pub fn client_content(&self) -> Option<&str> {
        self.client.as_ref().and_then(FileSnapshot::content)
    }

    pub fn server_content(&self) -> Option<&str> {
        self.server.as_ref().and_then(FileSnapshot::content)
    }

    /// Client and server content differ. A missing side counts as undefined
    /// content, so only two absent sides (or two matching ones) are fresh.
    pub fn is_stale(&self) -> bool {
        self.client_content() != self.server_content()
    }

    /// What the editor should show: local edits win over the server copy
    pub fn current_content(&self) -> Option<&str> {
        self.client_content().or_else(|| self.server_content())
    }
}

/// Input to a cache write; either side may be omitted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileUpdate {
    pub client: Option<FilePatch>,
    pub server: Option<FileRecord>,
}

impl FileUpdate {
    /// A local edit
    pub fn client(patch: FilePatch) -> Self {
        Self {
            client: Some(patch),
            server: None,
        }
    }

    /// A server confirmation that leaves local edits alone
    pub fn server(record: FileRecord) -> Self {
        Self {
            client: None,
            server: Some(record),
        }
    }

    /// The same record written to both sides (hydration, successful save)
    pub fn both(record: FileRecord) -> Self {
        Self {
            client: Some(record.clone().into()),
            server: Some(record),
        }
    }

    /// The path this update addresses, client side first
    pub fn path(&self) -> Option<&str> {
        self.client
            .as_ref()
            .and_then(|patch| patch.path.as_deref())
            .or_else(|| self.server.as_ref().map(|record| record.path.as_str()))
    }
}
