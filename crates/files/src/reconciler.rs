//! Owner of the open file sessions

use crate::remote::RemoteFileService;
use crate::session::{FileSession, FileView, SessionPhase};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use workbench_cache::FileCacheStore;
use workbench_core::Result;

/// Hands out one [`FileSession`] per open path.
///
/// Opening a path that is already open returns the live session, so its
/// detail fetch is not repeated. Closing drops the session; the next open
/// starts a fresh one that fetches again.
pub struct FileReconciler {
    cache: Arc<FileCacheStore>,
    remote: Arc<dyn RemoteFileService>,
    sessions: Mutex<HashMap<String, Arc<FileSession>>>,
}

impl FileReconciler {
    pub fn new(cache: Arc<FileCacheStore>, remote: Arc<dyn RemoteFileService>) -> Self {
        Self {
            cache,
            remote,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn cache(&self) -> &Arc<FileCacheStore> {
        &self.cache
    }

    pub fn open(&self, path: &str) -> Arc<FileSession> {
        let mut sessions = self.sessions.lock();
        sessions
            .entry(path.to_string())
            .or_insert_with(|| {
                debug!(path, "opening file session");
                Arc::new(FileSession::new(
                    path,
                    self.cache.clone(),
                    self.remote.clone(),
                ))
            })
            .clone()
    }

    /// Open `path` and hydrate it in one step
    pub async fn open_hydrated(&self, path: &str) -> Result<(Arc<FileSession>, FileView)> {
        let session = self.open(path);
        let view = session.hydrate().await?;
        Ok((session, view))
    }

    pub fn session(&self, path: &str) -> Option<Arc<FileSession>> {
        self.sessions.lock().get(path).cloned()
    }

    /// Close and forget the session for `path`. Returns whether one was open.
    pub fn close(&self, path: &str) -> bool {
        match self.sessions.lock().remove(path) {
            Some(session) => {
                session.close();
                true
            }
            None => false,
        }
    }

    pub fn open_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.sessions.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Cache-only view of `path`, whether or not a session is open for it
    pub fn view(&self, path: &str) -> Result<Option<FileView>> {
        if let Some(session) = self.session(path) {
            return session.view().map(Some);
        }
        let Some(entry) = self.cache.get(path)? else {
            return Ok(None);
        };
        Ok(Some(FileView {
            path: entry.path.clone(),
            content: entry.current_content().map(str::to_string),
            stale: entry.is_stale(),
            phase: SessionPhase::Uninitialized,
            saving: false,
        }))
    }
}
