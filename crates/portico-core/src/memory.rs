//! In-memory [`Document`] for tests and non-browser hosts.
//!
//! Mirrors the browser binding closely enough to exercise overlays end to
//! end: keydown listeners are dispatched in registration order, clicks bubble
//! from the target up to the root of its portal, and the body overflow style
//! is a plain string.

use crate::document::{Document, ListenerId, PortalKey};
use crate::dom::{NodeId, Portal};
use crate::error::DomError;
use crate::event::{ClickEvent, ClickHandler, KeyEvent, KeyHandler};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;

/// Document held entirely in memory.
#[derive(Default)]
pub struct MemoryDocument {
    overflow: RefCell<String>,
    listeners: RefCell<Vec<(ListenerId, KeyHandler)>>,
    next_listener: Cell<u64>,
    targets: RefCell<Vec<NodeId>>,
    portals: RefCell<BTreeMap<PortalKey, Portal>>,
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("overflow", &self.overflow.borrow())
            .field("listeners", &self.listeners.borrow().len())
            .field("targets", &self.targets.borrow())
            .field("portals", &self.portals.borrow().len())
            .finish()
    }
}

impl MemoryDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document whose body already has an overflow style.
    #[must_use]
    pub fn with_body_overflow(value: &str) -> Self {
        let doc = Self::default();
        doc.overflow.replace(value.to_string());
        doc
    }

    /// Number of registered keydown listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Dispatch a keydown to every listener. Returns how many were called.
    ///
    /// Listeners added during dispatch wait for the next event. Listeners
    /// removed during dispatch are skipped, as in the DOM.
    pub fn dispatch_keydown(&self, event: &KeyEvent) -> usize {
        let snapshot: Vec<(ListenerId, KeyHandler)> = self.listeners.borrow().clone();
        let mut called = 0;
        for (id, handler) in &snapshot {
            if !self.is_registered(*id) {
                continue;
            }
            handler(event);
            called += 1;
        }
        called
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.listeners
            .borrow()
            .iter()
            .any(|(existing, _)| *existing == id)
    }

    /// Click a mounted node, bubbling to the root of its portal.
    ///
    /// Returns `false` when no mounted portal contains `target`.
    pub fn click(&self, target: NodeId) -> bool {
        let path: Option<Vec<(NodeId, Option<ClickHandler>)>> = {
            let portals = self.portals.borrow();
            portals.values().find_map(|portal| {
                portal.content.path_to(target).map(|path| {
                    path.iter()
                        .map(|el| (el.id(), el.click_handler().cloned()))
                        .collect()
                })
            })
        };
        let Some(path) = path else {
            return false;
        };
        for (current_target, handler) in path.into_iter().rev() {
            if let Some(handler) = handler {
                handler(&ClickEvent {
                    target,
                    current_target,
                });
            }
        }
        true
    }

    /// Number of mounted portals.
    #[must_use]
    pub fn portal_count(&self) -> usize {
        self.portals.borrow().len()
    }

    /// Portals mounted into `target`.
    #[must_use]
    pub fn portals_in(&self, target: NodeId) -> Vec<Portal> {
        self.portals
            .borrow()
            .values()
            .filter(|portal| portal.target == target)
            .cloned()
            .collect()
    }

    /// Portal owned by `key`.
    #[must_use]
    pub fn portal(&self, key: PortalKey) -> Option<Portal> {
        self.portals.borrow().get(&key).cloned()
    }

    /// Portal targets created so far.
    #[must_use]
    pub fn portal_targets(&self) -> Vec<NodeId> {
        self.targets.borrow().clone()
    }

    /// Whether a mounted portal contains `id`.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.portals
            .borrow()
            .values()
            .any(|portal| portal.content.path_to(id).is_some())
    }

    /// First mounted node carrying `data-testid="{test_id}"`.
    #[must_use]
    pub fn find_by_test_id(&self, test_id: &str) -> Option<NodeId> {
        self.portals.borrow().values().find_map(|portal| {
            portal
                .content
                .find_by_attr("data-testid", test_id)
                .map(crate::dom::Element::id)
        })
    }

    /// Attribute of a mounted node.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<String> {
        self.portals.borrow().values().find_map(|portal| {
            portal
                .content
                .find(id)
                .and_then(|el| el.attr(name).map(str::to_string))
        })
    }

    /// Text of every mounted portal, in key order.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.portals
            .borrow()
            .values()
            .map(|portal| portal.content.text_content())
            .collect()
    }
}

impl Document for MemoryDocument {
    fn body_overflow(&self) -> String {
        self.overflow.borrow().clone()
    }

    fn set_body_overflow(&self, value: &str) {
        self.overflow.replace(value.to_string());
    }

    fn add_keydown_listener(&self, listener: KeyHandler) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_keydown_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn create_portal_target(&self) -> Result<NodeId, DomError> {
        let id = NodeId::next();
        self.targets.borrow_mut().push(id);
        Ok(id)
    }

    fn mount_portal(&self, key: PortalKey, portal: Portal) -> Result<(), DomError> {
        if !self.targets.borrow().contains(&portal.target) {
            return Err(DomError::UnknownTarget(portal.target));
        }
        self.portals.borrow_mut().insert(key, portal);
        Ok(())
    }

    fn unmount_portal(&self, key: PortalKey) -> bool {
        self.portals.borrow_mut().remove(&key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Element, Node};
    use crate::event::Key;
    use std::rc::Rc;

    #[test]
    fn test_overflow_roundtrip() {
        let doc = MemoryDocument::with_body_overflow("auto");
        assert_eq!(doc.body_overflow(), "auto");
        doc.set_body_overflow("");
        assert_eq!(doc.body_overflow(), "");
    }

    #[test]
    fn test_keydown_dispatch_and_removal() {
        let doc = MemoryDocument::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = doc.add_keydown_listener(Rc::new(move |e: &KeyEvent| {
            sink.borrow_mut().push(e.key.clone());
        }));
        assert_eq!(doc.dispatch_keydown(&KeyEvent::new(Key::Escape)), 1);
        assert!(doc.remove_keydown_listener(id));
        assert!(!doc.remove_keydown_listener(id));
        assert_eq!(doc.dispatch_keydown(&KeyEvent::new(Key::Enter)), 0);
        assert_eq!(*seen.borrow(), vec![Key::Escape]);
    }

    #[test]
    fn test_listener_may_remove_itself() {
        let doc = Rc::new(MemoryDocument::new());
        let slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));
        let (d, s) = (doc.clone(), slot.clone());
        let id = doc.add_keydown_listener(Rc::new(move |_: &KeyEvent| {
            if let Some(id) = s.get() {
                d.remove_keydown_listener(id);
            }
        }));
        slot.set(Some(id));
        doc.dispatch_keydown(&KeyEvent::new(Key::Escape));
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_listener_removed_mid_dispatch_is_skipped() {
        let doc = Rc::new(MemoryDocument::new());
        let second: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));
        let calls = Rc::new(Cell::new(0));

        let (d, s, c) = (doc.clone(), second.clone(), calls.clone());
        doc.add_keydown_listener(Rc::new(move |_: &KeyEvent| {
            c.set(c.get() + 1);
            if let Some(id) = s.get() {
                d.remove_keydown_listener(id);
            }
        }));
        let c = calls.clone();
        let id = doc.add_keydown_listener(Rc::new(move |_: &KeyEvent| c.set(c.get() + 10)));
        second.set(Some(id));

        assert_eq!(doc.dispatch_keydown(&KeyEvent::new(Key::Escape)), 1);
        assert_eq!(calls.get(), 1);
        assert_eq!(doc.listener_count(), 1);
    }

    #[test]
    fn test_mount_requires_known_target() {
        let doc = MemoryDocument::new();
        let stray = NodeId::next();
        let err = doc
            .mount_portal(PortalKey(1), Portal::new(stray, Node::text("x")))
            .unwrap_err();
        assert_eq!(err, DomError::UnknownTarget(stray));
        assert_eq!(doc.portal_count(), 0);
    }

    #[test]
    fn test_mount_replace_unmount() {
        let doc = MemoryDocument::new();
        let target = doc.create_portal_target().unwrap();
        doc.mount_portal(PortalKey(1), Portal::new(target, Node::text("one")))
            .unwrap();
        doc.mount_portal(PortalKey(1), Portal::new(target, Node::text("two")))
            .unwrap();
        assert_eq!(doc.portal_count(), 1);
        assert_eq!(doc.text_content(), "two");
        assert_eq!(doc.portals_in(target).len(), 1);
        assert!(doc.unmount_portal(PortalKey(1)));
        assert!(!doc.unmount_portal(PortalKey(1)));
    }

    #[test]
    fn test_click_bubbles_from_target() {
        let doc = MemoryDocument::new();
        let target = doc.create_portal_target().unwrap();
        let log: Rc<RefCell<Vec<ClickEvent>>> = Rc::new(RefCell::new(Vec::new()));

        let outer_log = log.clone();
        let inner_log = log.clone();
        let inner = Element::new("button")
            .with_attr("data-testid", "ok")
            .on_click(Rc::new(move |e: &ClickEvent| inner_log.borrow_mut().push(*e)));
        let inner_id = inner.id();
        let outer = Element::new("div")
            .on_click(Rc::new(move |e: &ClickEvent| outer_log.borrow_mut().push(*e)))
            .with_child(inner);
        let outer_id = outer.id();
        doc.mount_portal(PortalKey(7), Portal::new(target, outer.into()))
            .unwrap();

        assert_eq!(doc.find_by_test_id("ok"), Some(inner_id));
        assert!(doc.click(inner_id));

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].current_target, inner_id);
        assert_eq!(log[1].current_target, outer_id);
        assert!(log.iter().all(|e| e.target == inner_id));
    }

    #[test]
    fn test_click_unknown_node() {
        let doc = MemoryDocument::new();
        assert!(!doc.click(NodeId::next()));
    }
}
