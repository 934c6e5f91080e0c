//! Binding between an embedded editor widget and a file session
//!
//! The editor itself is an external component. It is reached only through
//! [`EditorInstance`]; the events it raises arrive as [`EditorEvent`] values.

use crate::session::{FileSession, FileView};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;
use workbench_core::Result;

/// The narrow surface the binding needs from an editor widget
pub trait EditorInstance: Send {
    fn value(&self) -> String;
    fn set_value(&mut self, content: &str);
    fn dispose(&mut self);
}

/// Every event an editor can raise
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    ContentChanged(String),
    Focus,
    Blur,
    Save,
}

type ContentCallback = Box<dyn FnMut(&str) + Send>;
type Callback = Box<dyn FnMut() + Send>;

/// Optional caller callbacks, one slot per known event
#[derive(Default)]
pub struct EditorListeners {
    pub on_content_change: Option<ContentCallback>,
    pub on_focus: Option<Callback>,
    pub on_blur: Option<Callback>,
    pub on_save: Option<Callback>,
}

impl EditorListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_content_change(mut self, callback: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_content_change = Some(Box::new(callback));
        self
    }

    pub fn on_focus(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_focus = Some(Box::new(callback));
        self
    }

    pub fn on_blur(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_blur = Some(Box::new(callback));
        self
    }

    pub fn on_save(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_save = Some(Box::new(callback));
        self
    }

    /// Invoke the callback registered for `event`. Returns whether one ran.
    pub fn dispatch(&mut self, event: &EditorEvent) -> bool {
        match event {
            EditorEvent::ContentChanged(content) => match self.on_content_change.as_mut() {
                Some(callback) => {
                    callback(content);
                    true
                }
                None => false,
            },
            EditorEvent::Focus => Self::fire(&mut self.on_focus),
            EditorEvent::Blur => Self::fire(&mut self.on_blur),
            EditorEvent::Save => Self::fire(&mut self.on_save),
        }
    }

    fn fire(slot: &mut Option<Callback>) -> bool {
        match slot.as_mut() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

/// Owner of the one heavyweight editor engine of a process.
///
/// Constructed lazily on first use and passed explicitly to whoever needs
/// it, so construction order and disposal stay under the caller's control.
pub struct EngineHost<E> {
    engine: Mutex<Option<Arc<E>>>,
}

impl<E> EngineHost<E> {
    pub fn new() -> Self {
        Self {
            engine: Mutex::new(None),
        }
    }

    /// The live engine, building it with `factory` if there is none
    pub fn get_or_init(&self, factory: impl FnOnce() -> E) -> Arc<E> {
        self.engine
            .lock()
            .get_or_insert_with(|| {
                debug!("constructing editor engine");
                Arc::new(factory())
            })
            .clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.lock().is_some()
    }

    /// Drop the host's handle. Returns whether an engine was live.
    pub fn dispose(&self) -> bool {
        self.engine.lock().take().is_some()
    }
}

impl<E> Default for EngineHost<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// One editor showing one file
pub struct EditorBinding<E: EditorInstance> {
    editor: E,
    session: Arc<FileSession>,
    listeners: EditorListeners,
}

impl<E: EditorInstance> EditorBinding<E> {
    pub fn new(editor: E, session: Arc<FileSession>, listeners: EditorListeners) -> Self {
        Self {
            editor,
            session,
            listeners,
        }
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn session(&self) -> &Arc<FileSession> {
        &self.session
    }

    /// Hydrate the session and show the resulting content
    pub async fn load(&mut self) -> Result<FileView> {
        let view = self.session.hydrate().await?;
        self.show(&view);
        Ok(view)
    }

    /// Route one editor event to the caller's listeners and the session.
    /// Focus changes do not touch the session and yield `None`.
    pub async fn handle(&mut self, event: EditorEvent) -> Result<Option<FileView>> {
        self.listeners.dispatch(&event);
        match event {
            EditorEvent::ContentChanged(content) => self.session.edit(&content).map(Some),
            EditorEvent::Save => {
                let view = self.session.save().await?;
                self.show(&view);
                Ok(Some(view))
            }
            EditorEvent::Focus | EditorEvent::Blur => Ok(None),
        }
    }

    /// Dispose the editor and close the session
    pub fn dispose(mut self) {
        self.editor.dispose();
        self.session.close();
    }

    fn show(&mut self, view: &FileView) {
        if let Some(content) = view.content.as_deref() {
            if self.editor.value() != content {
                self.editor.set_value(content);
            }
        }
    }
}
