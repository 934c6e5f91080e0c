//! Per-file sessions reconciling the local cache with the remote copy
//!
//! A session moves through `Uninitialized -> FetchPending -> Hydrated`. The
//! detail fetch is issued at most once per session; a failed fetch returns
//! the session to `Uninitialized` so a later `hydrate` may retry. Saves are
//! numbered, and a response only commits to the cache if no later save has
//! committed before it.

use crate::remote::RemoteFileService;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};
use workbench_cache::FileCacheStore;
use workbench_core::{Error, FileCacheEntry, FilePatch, FileRecord, FileUpdate, Result};
use workbench_utils::tracing::file_span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Uninitialized,
    FetchPending,
    Hydrated,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Uninitialized => "uninitialized",
            SessionPhase::FetchPending => "fetch pending",
            SessionPhase::Hydrated => "hydrated",
        };
        f.write_str(name)
    }
}

/// What an editor needs to render one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileView {
    pub path: String,
    pub content: Option<String>,
    pub stale: bool,
    pub phase: SessionPhase,
    pub saving: bool,
}

struct SessionState {
    phase: SessionPhase,
    closed: bool,
    issued_saves: u64,
    committed_save: u64,
    saves_in_flight: usize,
}

/// Counts one outstanding save for as long as it lives, so a save future
/// dropped mid-request still clears the `saving` flag
struct InFlightSave<'a> {
    state: &'a Mutex<SessionState>,
}

impl Drop for InFlightSave<'_> {
    fn drop(&mut self) {
        self.state.lock().saves_in_flight -= 1;
    }
}

pub struct FileSession {
    path: String,
    cache: Arc<FileCacheStore>,
    remote: Arc<dyn RemoteFileService>,
    state: Mutex<SessionState>,
}

impl FileSession {
    pub fn new(
        path: impl Into<String>,
        cache: Arc<FileCacheStore>,
        remote: Arc<dyn RemoteFileService>,
    ) -> Self {
        Self {
            path: path.into(),
            cache,
            remote,
            state: Mutex::new(SessionState {
                phase: SessionPhase::Uninitialized,
                closed: false,
                issued_saves: 0,
                committed_save: 0,
                saves_in_flight: 0,
            }),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.lock().phase
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Fetch the canonical copy once and seed the cache with it.
    ///
    /// Without a prior local copy both sides are seeded, so the file opens
    /// fresh. With one, only the server side is replaced and local edits
    /// survive (leaving the entry stale if they differ).
    pub async fn hydrate(&self) -> Result<FileView> {
        {
            let mut state = self.state.lock();
            self.ensure_open(&state)?;
            if state.phase != SessionPhase::Uninitialized {
                debug!(path = %self.path, phase = %state.phase, "detail fetch already issued");
                drop(state);
                return self.view();
            }
            state.phase = SessionPhase::FetchPending;
        }

        let fetched = self
            .remote
            .fetch_detail(&self.path)
            .instrument(file_span(&self.path))
            .await;

        let record = match fetched {
            Ok(record) => record,
            Err(e) => {
                warn!(path = %self.path, error = %e, "detail fetch failed");
                self.state.lock().phase = SessionPhase::Uninitialized;
                return Err(e);
            }
        };

        if self.is_closed() {
            debug!(path = %self.path, "session closed before detail fetch completed");
            return Err(self.closed_error());
        }

        match self.seed(record) {
            Ok(entry) => {
                self.state.lock().phase = SessionPhase::Hydrated;
                info!(path = %self.path, stale = entry.is_stale(), "file hydrated");
                Ok(self.view_of(Some(entry)))
            }
            Err(e) => {
                self.state.lock().phase = SessionPhase::Uninitialized;
                Err(e)
            }
        }
    }

    fn seed(&self, mut record: FileRecord) -> Result<FileCacheEntry> {
        record.path = self.path.clone();
        let has_local_copy = self
            .cache
            .get(&self.path)?
            .is_some_and(|entry| entry.client.is_some());
        let update = if has_local_copy {
            FileUpdate::server(record)
        } else {
            FileUpdate::both(record)
        };
        Ok(self.cache.update(update)?)
    }

    /// Record a local edit on the client side only
    pub fn edit(&self, content: &str) -> Result<FileView> {
        self.ensure_open(&self.state.lock())?;
        let entry = self
            .cache
            .update(FileUpdate::client(FilePatch::content(&self.path, content)))?;
        debug!(path = %self.path, stale = entry.is_stale(), "local edit cached");
        Ok(self.view_of(Some(entry)))
    }

    /// Persist the current content remotely.
    ///
    /// On success both cache sides take the saved content, unless a save
    /// issued later has already committed; that older response is dropped.
    /// On failure the cache is left untouched.
    pub async fn save(&self) -> Result<FileView> {
        let content = self
            .cache
            .get(&self.path)?
            .and_then(|entry| entry.current_content().map(str::to_string))
            .ok_or_else(|| Error::invalid_state(format!("nothing to save for '{}'", self.path)))?;

        let sequence = {
            let mut state = self.state.lock();
            self.ensure_open(&state)?;
            state.issued_saves += 1;
            state.saves_in_flight += 1;
            state.issued_saves
        };
        let in_flight = InFlightSave { state: &self.state };

        let response = self
            .remote
            .update(&self.path, FilePatch::content(&self.path, content.as_str()))
            .instrument(file_span(&self.path))
            .await;
        drop(in_flight);

        let commit = {
            let mut state = self.state.lock();
            match &response {
                Ok(_) if state.closed => Err(self.closed_error()),
                Ok(_) if sequence <= state.committed_save => Ok(false),
                Ok(_) => {
                    state.committed_save = sequence;
                    Ok(true)
                }
                Err(_) => Ok(false),
            }
        };

        let mut record = match response {
            Ok(record) => record,
            Err(e) => {
                warn!(path = %self.path, error = %e, "save failed, cache unchanged");
                return Err(e);
            }
        };

        if !commit? {
            warn!(path = %self.path, sequence, "discarding response of superseded save");
            return self.view();
        }

        record.content = Some(content);
        record.path = self.path.clone();
        let entry = self.cache.update(FileUpdate::both(record))?;
        info!(path = %self.path, sequence, "file saved");
        Ok(self.view_of(Some(entry)))
    }

    /// Stop accepting work; responses that arrive afterwards are ignored
    pub fn close(&self) {
        let mut state = self.state.lock();
        if !state.closed {
            state.closed = true;
            debug!(path = %self.path, "session closed");
        }
    }

    /// Current state of the file as the cache knows it
    pub fn view(&self) -> Result<FileView> {
        let entry = self.cache.get(&self.path)?;
        Ok(self.view_of(entry))
    }

    fn view_of(&self, entry: Option<FileCacheEntry>) -> FileView {
        let state = self.state.lock();
        FileView {
            path: self.path.clone(),
            content: entry
                .as_ref()
                .and_then(|entry| entry.current_content().map(str::to_string)),
            stale: entry.as_ref().is_some_and(FileCacheEntry::is_stale),
            phase: state.phase,
            saving: state.saves_in_flight > 0,
        }
    }

    fn ensure_open(&self, state: &SessionState) -> Result<()> {
        if state.closed {
            Err(self.closed_error())
        } else {
            Ok(())
        }
    }

    fn closed_error(&self) -> Error {
        Error::invalid_state(format!("session for '{}' is closed", self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use workbench_cache::MemoryStore;

    struct CountingRemote {
        content: String,
        fetches: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl RemoteFileService for CountingRemote {
        async fn fetch_detail(&self, path: &str) -> Result<FileRecord> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::remote("test", "fetch", "unavailable"));
            }
            Ok(FileRecord::new(path, self.content.as_str()))
        }

        async fn update(&self, path: &str, file: FilePatch) -> Result<FileRecord> {
            Ok(file.merge_onto(Some(FileRecord::new(path, ""))))
        }
    }

    fn session(remote: Arc<CountingRemote>) -> FileSession {
        let cache = Arc::new(FileCacheStore::new(Arc::new(MemoryStore::new()), "test"));
        FileSession::new("a.py", cache, remote)
    }

    fn remote(content: &str, fail: bool) -> Arc<CountingRemote> {
        Arc::new(CountingRemote {
            content: content.to_string(),
            fetches: AtomicUsize::new(0),
            fail,
        })
    }

    #[tokio::test]
    async fn test_hydrate_fetches_once() {
        let remote = remote("print(1)", false);
        let session = session(remote.clone());

        let view = session.hydrate().await.unwrap();
        assert_eq!(view.phase, SessionPhase::Hydrated);
        assert_eq!(view.content.as_deref(), Some("print(1)"));
        assert!(!view.stale);

        session.hydrate().await.unwrap();
        assert_eq!(remote.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_allows_retry() {
        let remote = remote("", true);
        let session = session(remote.clone());

        assert!(session.hydrate().await.is_err());
        assert_eq!(session.phase(), SessionPhase::Uninitialized);
        assert!(session.hydrate().await.is_err());
        assert_eq!(remote.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_closed_session_rejects_work() {
        let session = session(remote("x", false));
        session.close();

        assert!(session.hydrate().await.is_err());
        assert!(session.edit("y").is_err());
        assert_eq!(session.view().unwrap().content, None);
    }

    #[tokio::test]
    async fn test_save_without_content_is_invalid() {
        let session = session(remote("x", false));
        let err = session.save().await.unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
    }
}
