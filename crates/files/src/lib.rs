//! Keeps locally edited files in step with the remote file service
//!
//! - `RemoteFileService` / `HttpFileService`: the backend's file API
//! - `FileSession`: one open file, its one-shot hydration and ordered saves
//! - `FileReconciler`: the set of open sessions
//! - `editor`: glue between an embedded editor and a session

pub mod editor;
pub mod reconciler;
pub mod remote;
pub mod session;

pub use editor::{EditorBinding, EditorEvent, EditorInstance, EditorListeners, EngineHost};
pub use reconciler::FileReconciler;
pub use remote::{HttpFileService, RemoteFileService};
pub use session::{FileSession, FileView, SessionPhase};
