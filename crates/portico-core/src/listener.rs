//! Scoped document keydown listeners.

use crate::document::{Document, ListenerId};
use crate::event::{Key, KeyEvent, KeyHandler};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Keydown listener registered for as long as the guard lives.
#[must_use = "the listener is removed as soon as the guard is dropped"]
pub struct KeyListenerGuard {
    document: Rc<dyn Document>,
    id: ListenerId,
}

impl fmt::Debug for KeyListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyListenerGuard")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl KeyListenerGuard {
    /// Register a listener receiving every keydown.
    pub fn attach(document: Rc<dyn Document>, listener: KeyHandler) -> Self {
        let id = document.add_keydown_listener(listener);
        debug!(listener = id.0, "keydown listener attached");
        Self { document, id }
    }

    /// Register a listener that only sees keydowns of `key`.
    pub fn on_key(document: Rc<dyn Document>, key: Key, handler: KeyHandler) -> Self {
        Self::attach(
            document,
            Rc::new(move |event: &KeyEvent| {
                if event.key == key {
                    handler(event);
                }
            }),
        )
    }

    /// Registration handle.
    #[must_use]
    pub const fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for KeyListenerGuard {
    fn drop(&mut self) {
        if self.document.remove_keydown_listener(self.id) {
            debug!(listener = self.id.0, "keydown listener removed");
        }
    }
}
