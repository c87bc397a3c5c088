//! [`Document`] backed by the real browser DOM.

use portico_core::{
    ClickEvent, ClickHandler, Document, DomError, Key, KeyEvent, KeyHandler, ListenerId, Node,
    NodeId, Portal, PortalKey,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, error};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, HtmlElement, KeyboardEvent, MouseEvent};

/// Attribute linking a DOM element back to its virtual [`NodeId`].
pub const NODE_ID_ATTR: &str = "data-portico-id";

/// Attribute marking portal target containers.
pub const PORTAL_ATTR: &str = "data-portico-portal";

type KeyClosure = Closure<dyn FnMut(KeyboardEvent)>;
type ClickClosure = Closure<dyn FnMut(MouseEvent)>;

struct MountedPortal {
    root: web_sys::Node,
    closures: Vec<ClickClosure>,
}

/// Browser document.
///
/// Keydown listeners are registered on `document`; portal targets are `div`s
/// appended to `body`. Virtual nodes are materialised into real elements
/// tagged with [`NODE_ID_ATTR`] so click targets map back to node ids.
pub struct WebDocument {
    document: web_sys::Document,
    body: HtmlElement,
    listeners: RefCell<Vec<(ListenerId, KeyClosure)>>,
    next_listener: Cell<u64>,
    targets: RefCell<HashMap<NodeId, web_sys::Element>>,
    portals: RefCell<BTreeMap<PortalKey, MountedPortal>>,
}

impl std::fmt::Debug for WebDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDocument")
            .field("listeners", &self.listeners.borrow().len())
            .field("targets", &self.targets.borrow().len())
            .field("portals", &self.portals.borrow().len())
            .finish_non_exhaustive()
    }
}

impl WebDocument {
    /// Bind to the page's document.
    ///
    /// # Errors
    ///
    /// Returns an error outside a window or before `<body>` exists.
    pub fn new() -> Result<Self, DomError> {
        let document = window()
            .ok_or(DomError::NoWindow)?
            .document()
            .ok_or(DomError::NoWindow)?;
        let body = document.body().ok_or(DomError::NoBody)?;
        Ok(Self {
            document,
            body,
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            targets: RefCell::new(HashMap::new()),
            portals: RefCell::new(BTreeMap::new()),
        })
    }

    /// Underlying `web_sys` document.
    #[must_use]
    pub const fn raw(&self) -> &web_sys::Document {
        &self.document
    }

    /// DOM element materialised for a virtual node.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<web_sys::Element> {
        self.document
            .query_selector(&format!("[{NODE_ID_ATTR}=\"{id}\"]"))
            .ok()
            .flatten()
    }

    fn build(&self, node: &Node, closures: &mut Vec<ClickClosure>) -> Result<web_sys::Node, DomError> {
        let element = match node {
            Node::Text(text) => return Ok(self.document.create_text_node(text).into()),
            Node::Element(element) => element,
        };
        let el = self.document.create_element(element.tag()).map_err(js_error)?;
        for (name, value) in element.attrs().iter() {
            el.set_attribute(name, value).map_err(js_error)?;
        }
        el.set_attribute(NODE_ID_ATTR, &element.id().to_string())
            .map_err(js_error)?;
        if let Some(handler) = element.click_handler() {
            let closure = click_closure(element.id(), handler.clone());
            el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
                .map_err(js_error)?;
            closures.push(closure);
        }
        for child in element.children() {
            let child = self.build(child, closures)?;
            el.append_child(&child).map_err(js_error)?;
        }
        Ok(el.into())
    }
}

impl Document for WebDocument {
    fn body_overflow(&self) -> String {
        self.body
            .style()
            .get_property_value("overflow")
            .unwrap_or_default()
    }

    fn set_body_overflow(&self, value: &str) {
        let style = self.body.style();
        let result = if value.is_empty() {
            style.remove_property("overflow").map(drop)
        } else {
            style.set_property("overflow", value)
        };
        if let Err(err) = result {
            error!(error = ?err, "failed to set body overflow");
        }
    }

    fn add_keydown_listener(&self, listener: KeyHandler) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        let closure = KeyClosure::new(move |event: KeyboardEvent| {
            listener(&KeyEvent::new(Key::from_key_value(&event.key())));
        });
        if let Err(err) = self
            .document
            .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
        {
            error!(error = ?err, "failed to add keydown listener");
        }
        self.listeners.borrow_mut().push((id, closure));
        id
    }

    fn remove_keydown_listener(&self, id: ListenerId) -> bool {
        let removed = {
            let mut listeners = self.listeners.borrow_mut();
            listeners
                .iter()
                .position(|(existing, _)| *existing == id)
                .map(|index| listeners.remove(index).1)
        };
        let Some(closure) = removed else {
            return false;
        };
        if let Err(err) = self
            .document
            .remove_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
        {
            error!(error = ?err, "failed to remove keydown listener");
        }
        // The listener may be the one currently running.
        defer_drop(closure);
        true
    }

    fn create_portal_target(&self) -> Result<NodeId, DomError> {
        let id = NodeId::next();
        let el = self.document.create_element("div").map_err(js_error)?;
        el.set_attribute(PORTAL_ATTR, "").map_err(js_error)?;
        el.set_attribute(NODE_ID_ATTR, &id.to_string())
            .map_err(js_error)?;
        self.body.append_child(&el).map_err(js_error)?;
        self.targets.borrow_mut().insert(id, el);
        debug!(target_node = %id, "portal target created");
        Ok(id)
    }

    fn mount_portal(&self, key: PortalKey, portal: Portal) -> Result<(), DomError> {
        let target = self
            .targets
            .borrow()
            .get(&portal.target)
            .cloned()
            .ok_or(DomError::UnknownTarget(portal.target))?;
        let mut closures = Vec::new();
        let root = self.build(&portal.content, &mut closures)?;
        self.unmount_portal(key);
        target.append_child(&root).map_err(js_error)?;
        self.portals
            .borrow_mut()
            .insert(key, MountedPortal { root, closures });
        Ok(())
    }

    fn unmount_portal(&self, key: PortalKey) -> bool {
        let Some(mounted) = self.portals.borrow_mut().remove(&key) else {
            return false;
        };
        if let Some(parent) = mounted.root.parent_node() {
            if let Err(err) = parent.remove_child(&mounted.root) {
                error!(error = ?err, "failed to detach portal");
            }
        }
        // Unmounting is often triggered from one of these click handlers.
        defer_drop(mounted.closures);
        true
    }
}

fn click_closure(current_target: NodeId, handler: ClickHandler) -> ClickClosure {
    ClickClosure::new(move |event: MouseEvent| {
        let target = event
            .target()
            .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
            .and_then(|el| el.closest(&format!("[{NODE_ID_ATTR}]")).ok().flatten())
            .and_then(|el| el.get_attribute(NODE_ID_ATTR))
            .and_then(|value| NodeId::parse(&value))
            .unwrap_or(current_target);
        handler(&ClickEvent {
            target,
            current_target,
        });
    })
}

/// Drop a value on a later microtask instead of inside the running callback.
fn defer_drop<T: 'static>(value: T) {
    wasm_bindgen_futures::spawn_local(async move {
        drop(value);
    });
}

fn js_error(err: JsValue) -> DomError {
    DomError::Js(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}
