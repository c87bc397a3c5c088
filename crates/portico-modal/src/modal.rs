//! Controlled modal rendered through a portal.
//!
//! The owner drives the modal with a desired-open flag ([`Modal::set_open`]).
//! The modal mirrors that flag into its own [`ModalState`] once the matching
//! before-hook lets it:
//!
//! ```text
//!  requested != state ──► before-hook? ──none/Err──► apply
//!                              │
//!                              └─Ok(signal)──► spawn ──signal done──► apply
//!
//!  apply: state = requested → effects (escape listener, scroll lock)
//!         → commit portal → after-hook → re-check requested
//! ```
//!
//! Pending signals are never cancelled. If the owner flips the flag again
//! while one is pending, its transition still lands when the signal
//! completes, and the re-check afterwards starts the opposite transition.
//! Only one signal is awaited per target: re-rendering with new props, or
//! asking again for the state already being awaited, does not rerun the hook.

use crate::env::{BackgroundProps, Component, RenderEnv};
use crate::hooks::{HookError, HookSignal, LifecycleHooks, ModalPhase};
use futures::task::LocalSpawnExt;
use portico_core::{
    ClickEvent, ClickHandler, Key, KeyEvent, KeyHandler, KeyListenerGuard, Node, NodeId, NodeRef,
    Portal, PortalKey, Props, ScrollLockGuard,
};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, trace, warn};

static NEXT_MODAL_ID: AtomicU64 = AtomicU64::new(1);

/// Internal open/closed state mirrored from the owner's request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModalState {
    /// Whether the modal is open
    pub open: bool,
}

/// Owner-facing inputs of a modal.
#[derive(Clone, Default)]
pub struct ModalProps {
    /// Desired open state
    pub is_open: bool,
    /// Leave page scrolling alone while open
    pub allow_scroll: bool,
    /// Wrapper rendered around the children
    pub wrapper: Option<Rc<dyn Component>>,
    /// Modal content
    pub children: Vec<Node>,
    /// Called for clicks landing on the background element itself
    pub on_background_click: Option<ClickHandler>,
    /// Called for Escape keydowns while open
    pub on_escape_keydown: Option<KeyHandler>,
    /// Attributes for the background element
    pub background_props: Props,
    /// Pass-through props forwarded to the wrapper
    pub props: Props,
    /// Lifecycle hooks
    pub hooks: LifecycleHooks,
}

impl fmt::Debug for ModalProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalProps")
            .field("is_open", &self.is_open)
            .field("allow_scroll", &self.allow_scroll)
            .field("wrapper", &self.wrapper.is_some())
            .field("children", &self.children.len())
            .field("on_background_click", &self.on_background_click.is_some())
            .field("on_escape_keydown", &self.on_escape_keydown.is_some())
            .field("background_props", &self.background_props)
            .field("props", &self.props)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Builder for [`Modal`].
#[derive(Debug, Default)]
pub struct ModalBuilder {
    props: ModalProps,
}

impl ModalBuilder {
    /// Start from default props: closed, scroll locked while open, no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a complete prop set.
    #[must_use]
    pub const fn from_props(props: ModalProps) -> Self {
        Self { props }
    }

    /// Desired open state at mount.
    #[must_use]
    pub fn is_open(mut self, open: bool) -> Self {
        self.props.is_open = open;
        self
    }

    /// Leave page scrolling enabled while open.
    #[must_use]
    pub fn allow_scroll(mut self, allow: bool) -> Self {
        self.props.allow_scroll = allow;
        self
    }

    /// Wrap the children in a component.
    #[must_use]
    pub fn wrapper(self, wrapper: impl Component + 'static) -> Self {
        self.wrapper_rc(Rc::new(wrapper))
    }

    /// Wrap the children in a shared component.
    #[must_use]
    pub fn wrapper_rc(mut self, wrapper: Rc<dyn Component>) -> Self {
        self.props.wrapper = Some(wrapper);
        self
    }

    /// Append a child.
    #[must_use]
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.props.children.push(child.into());
        self
    }

    /// Append several children.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.props.children.extend(children);
        self
    }

    /// Background click handler.
    #[must_use]
    pub fn on_background_click<F: Fn(&ClickEvent) + 'static>(mut self, handler: F) -> Self {
        self.props.on_background_click = Some(Rc::new(handler));
        self
    }

    /// Escape keydown handler.
    #[must_use]
    pub fn on_escape_keydown<F: Fn(&KeyEvent) + 'static>(mut self, handler: F) -> Self {
        self.props.on_escape_keydown = Some(Rc::new(handler));
        self
    }

    /// Replace the background attributes.
    #[must_use]
    pub fn background_props(mut self, props: Props) -> Self {
        self.props.background_props = props;
        self
    }

    /// Set one background attribute.
    #[must_use]
    pub fn background_prop(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.background_props.insert(name, value);
        self
    }

    /// Replace the pass-through props.
    #[must_use]
    pub fn props(mut self, props: Props) -> Self {
        self.props.props = props;
        self
    }

    /// Set one pass-through prop.
    #[must_use]
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.props.insert(name, value);
        self
    }

    /// Replace all hooks.
    #[must_use]
    pub fn hooks(mut self, hooks: LifecycleHooks) -> Self {
        self.props.hooks = hooks;
        self
    }

    /// Gate opening on a hook.
    #[must_use]
    pub fn before_open<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> Result<HookSignal, HookError> + 'static,
    {
        self.props.hooks = self.props.hooks.before_open(hook);
        self
    }

    /// Run after each open.
    #[must_use]
    pub fn after_open<F: Fn() + 'static>(mut self, hook: F) -> Self {
        self.props.hooks = self.props.hooks.after_open(hook);
        self
    }

    /// Gate closing on a hook.
    #[must_use]
    pub fn before_close<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> Result<HookSignal, HookError> + 'static,
    {
        self.props.hooks = self.props.hooks.before_close(hook);
        self
    }

    /// Run after each close.
    #[must_use]
    pub fn after_close<F: Fn() + 'static>(mut self, hook: F) -> Self {
        self.props.hooks = self.props.hooks.after_close(hook);
        self
    }

    /// Props accumulated so far.
    #[must_use]
    pub const fn peek(&self) -> &ModalProps {
        &self.props
    }

    /// Mount the modal. If `is_open` was set, the open transition starts now.
    pub fn mount(self, env: &RenderEnv) -> Modal {
        let id = PortalKey(NEXT_MODAL_ID.fetch_add(1, Ordering::Relaxed));
        let shared = Rc::new(RefCell::new(ModalInner {
            id,
            props: self.props,
            state: ModalState::default(),
            env: env.clone(),
            background_ref: NodeRef::new(),
            escape_listener: None,
            scroll_lock: None,
            pending: None,
            mounted: true,
        }));
        debug!(modal = id.0, "modal mounted");
        reconcile(&shared);
        Modal { inner: shared }
    }
}

struct ModalInner {
    id: PortalKey,
    props: ModalProps,
    state: ModalState,
    env: RenderEnv,
    background_ref: NodeRef,
    escape_listener: Option<KeyListenerGuard>,
    scroll_lock: Option<ScrollLockGuard>,
    /// Target of the hook signal currently in flight.
    pending: Option<bool>,
    mounted: bool,
}

type Shared = Rc<RefCell<ModalInner>>;

/// A mounted modal. Dropping it unmounts.
pub struct Modal {
    inner: Shared,
}

impl fmt::Debug for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Modal")
            .field("id", &inner.id)
            .field("state", &inner.state)
            .field("props", &inner.props)
            .field("mounted", &inner.mounted)
            .finish()
    }
}

impl Modal {
    /// Start building a modal.
    #[must_use]
    pub fn builder() -> ModalBuilder {
        ModalBuilder::new()
    }

    /// Key of this modal's portal in the document.
    #[must_use]
    pub fn id(&self) -> PortalKey {
        self.inner.borrow().id
    }

    /// Current internal state.
    #[must_use]
    pub fn state(&self) -> ModalState {
        self.inner.borrow().state
    }

    /// Whether the modal is open (after any before-hook resolved).
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.borrow().state.open
    }

    /// The owner's desired open state.
    #[must_use]
    pub fn is_open_requested(&self) -> bool {
        self.inner.borrow().props.is_open
    }

    /// Whether the modal is still mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.borrow().mounted
    }

    /// Background element currently in the document.
    #[must_use]
    pub fn background_node(&self) -> Option<NodeId> {
        self.inner.borrow().background_ref.get()
    }

    /// Weak handle for use inside the modal's own handlers.
    #[must_use]
    pub fn downgrade(&self) -> WeakModal {
        WeakModal {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Update the desired open state.
    pub fn set_open(&self, open: bool) {
        self.update(|props| props.is_open = open);
    }

    /// Toggle page scrolling while open.
    pub fn set_allow_scroll(&self, allow: bool) {
        self.update(|props| props.allow_scroll = allow);
    }

    /// Replace the children.
    pub fn set_children(&self, children: Vec<Node>) {
        self.update(|props| props.children = children);
    }

    /// Replace the background attributes.
    pub fn set_background_props(&self, background_props: Props) {
        self.update(|props| props.background_props = background_props);
    }

    /// Replace the pass-through props.
    pub fn set_props(&self, pass_through: Props) {
        self.update(|props| props.props = pass_through);
    }

    /// Replace or remove the wrapper.
    pub fn set_wrapper(&self, wrapper: Option<Rc<dyn Component>>) {
        self.update(|props| props.wrapper = wrapper);
    }

    /// Replace the Escape handler.
    pub fn set_on_escape_keydown(&self, handler: Option<KeyHandler>) {
        self.inner.borrow_mut().props.on_escape_keydown = handler;
    }

    /// Replace the background click handler.
    pub fn set_on_background_click(&self, handler: Option<ClickHandler>) {
        self.inner.borrow_mut().props.on_background_click = handler;
    }

    /// Replace the lifecycle hooks. A transition already waiting on a
    /// signal is unaffected.
    pub fn set_hooks(&self, hooks: LifecycleHooks) {
        self.inner.borrow_mut().props.hooks = hooks;
    }

    /// Apply an arbitrary prop change, then re-sync effects, output and state.
    pub fn update(&self, f: impl FnOnce(&mut ModalProps)) {
        update(&self.inner, f);
    }

    /// Render the current output without committing it.
    ///
    /// `None` unless the modal is open and the environment supplies both a
    /// portal target and a background renderer.
    #[must_use]
    pub fn render(&self) -> Option<Portal> {
        render(&self.inner).0
    }

    /// Unmount now: removes the portal, the Escape listener and the scroll
    /// lock. Later hook completions are ignored.
    pub fn unmount(&self) {
        unmount(&self.inner);
    }
}

impl Drop for Modal {
    fn drop(&mut self) {
        unmount(&self.inner);
    }
}

/// Non-owning handle to a [`Modal`].
#[derive(Clone)]
pub struct WeakModal {
    inner: Weak<RefCell<ModalInner>>,
}

impl fmt::Debug for WeakModal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakModal")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl WeakModal {
    /// Update the desired open state. Returns `false` if the modal is gone.
    pub fn set_open(&self, open: bool) -> bool {
        let Some(shared) = self.inner.upgrade() else {
            return false;
        };
        if !shared.borrow().mounted {
            return false;
        }
        update(&shared, |props| props.is_open = open);
        true
    }

    /// Current state, if the modal still exists.
    #[must_use]
    pub fn is_open(&self) -> Option<bool> {
        self.inner.upgrade().map(|shared| shared.borrow().state.open)
    }

    /// Whether the modal is still mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|shared| shared.borrow().mounted)
    }
}

fn update(shared: &Shared, f: impl FnOnce(&mut ModalProps)) {
    {
        let mut inner = shared.borrow_mut();
        if !inner.mounted {
            return;
        }
        f(&mut inner.props);
    }
    sync_effects(shared);
    commit(shared);
    reconcile(shared);
}

/// Start the transition towards the requested state, if one is due.
fn reconcile(shared: &Shared) {
    let (id, target, hook) = {
        let inner = shared.borrow();
        if !inner.mounted || inner.state.open == inner.props.is_open {
            trace!(modal = inner.id.0, "modal state already matches request");
            return;
        }
        let target = inner.props.is_open;
        if inner.pending == Some(target) {
            trace!(modal = inner.id.0, open = target, "transition already awaiting its hook");
            return;
        }
        (inner.id, target, inner.props.hooks.before(target))
    };

    let Some(hook) = hook else {
        apply_state(shared, target);
        return;
    };

    let phase = ModalPhase::before(target).name();
    match hook() {
        Ok(signal) => {
            let weak = Rc::downgrade(shared);
            let spawner = shared.borrow().env.spawner();
            let task = async move {
                signal.await;
                if let Some(shared) = weak.upgrade() {
                    apply_state(&shared, target);
                }
            };
            match spawner.spawn_local(task) {
                Ok(()) => {
                    shared.borrow_mut().pending = Some(target);
                    debug!(modal = id.0, phase, "awaiting hook signal");
                }
                Err(err) => {
                    error!(modal = id.0, phase, %err, "could not spawn hook signal, applying transition");
                    apply_state(shared, target);
                }
            }
        }
        Err(err) => {
            warn!(modal = id.0, phase, %err, "lifecycle hook failed, treating as approval");
            apply_state(shared, target);
        }
    }
}

fn apply_state(shared: &Shared, open: bool) {
    {
        let mut inner = shared.borrow_mut();
        if !inner.mounted || inner.state.open == open {
            return;
        }
        inner.state.open = open;
        inner.pending = None;
        debug!(modal = inner.id.0, open, "modal state changed");
    }
    sync_effects(shared);
    commit(shared);

    let after = shared.borrow().props.hooks.after(open);
    if let Some(hook) = after {
        trace!(phase = ModalPhase::after(open).name(), "running after-hook");
        hook();
    }
    reconcile(shared);
}

/// Attach or release the Escape listener and scroll lock to match state.
fn sync_effects(shared: &Shared) {
    let weak = Rc::downgrade(shared);
    let mut guard = shared.borrow_mut();
    let inner = &mut *guard;
    let active = inner.mounted && inner.state.open;

    if active && inner.escape_listener.is_none() {
        let listener = KeyListenerGuard::on_key(inner.env.document(), Key::Escape, escape_handler(weak));
        inner.escape_listener = Some(listener);
    } else if !active {
        inner.escape_listener = None;
    }

    let lock = active && !inner.props.allow_scroll;
    if lock && inner.scroll_lock.is_none() {
        inner.scroll_lock = Some(inner.env.scroll_lock().acquire());
    } else if !lock {
        inner.scroll_lock = None;
    }
}

fn escape_handler(weak: Weak<RefCell<ModalInner>>) -> KeyHandler {
    Rc::new(move |event: &KeyEvent| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let handler = shared.borrow().props.on_escape_keydown.clone();
        if let Some(handler) = handler {
            handler(event);
        }
    })
}

fn background_click_handler(weak: Weak<RefCell<ModalInner>>) -> ClickHandler {
    Rc::new(move |event: &ClickEvent| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let handler = {
            let inner = shared.borrow();
            if !inner.background_ref.is(event.target) {
                return;
            }
            inner.props.on_background_click.clone()
        };
        if let Some(handler) = handler {
            handler(event);
        }
    })
}

/// Render without touching the document. Renderers run with no borrow held.
fn render(shared: &Shared) -> (Option<Portal>, NodeRef) {
    let node_ref = NodeRef::new();
    let snapshot = {
        let inner = shared.borrow();
        let context = inner.env.context();
        match (&context.portal_target, &context.background) {
            (Some(target), Some(background)) if inner.mounted && inner.state.open => Some((
                *target,
                background.clone(),
                inner.props.wrapper.clone(),
                inner.props.props.clone(),
                inner.props.children.clone(),
                inner.props.background_props.clone(),
            )),
            _ => None,
        }
    };
    let Some((target, background, wrapper, pass_through, children, background_props)) = snapshot
    else {
        return (None, node_ref);
    };

    let content = match wrapper {
        Some(wrapper) => vec![wrapper.render(&pass_through, children)],
        None => children,
    };
    let node = background.render(BackgroundProps {
        props: background_props,
        on_click: background_click_handler(Rc::downgrade(shared)),
        node_ref: node_ref.clone(),
        children: content,
    });
    (Some(Portal::new(target, node)), node_ref)
}

/// Push the current output into the document.
fn commit(shared: &Shared) {
    let (portal, node_ref) = render(shared);
    let (id, document) = {
        let inner = shared.borrow();
        if !inner.mounted {
            return;
        }
        (inner.id, inner.env.document())
    };
    match portal {
        Some(portal) => {
            let result = document.mount_portal(id, portal);
            match (result, node_ref.get()) {
                (Ok(()), Some(node)) => shared.borrow().background_ref.set(node),
                (Ok(()), None) => {
                    warn!(modal = id.0, "background renderer did not set its node ref");
                    shared.borrow().background_ref.clear();
                }
                (Err(err), _) => {
                    error!(modal = id.0, %err, "failed to mount modal portal");
                    shared.borrow().background_ref.clear();
                }
            }
        }
        None => {
            if document.unmount_portal(id) {
                debug!(modal = id.0, "modal portal removed");
            }
            shared.borrow().background_ref.clear();
        }
    }
}

fn unmount(shared: &Shared) {
    let (id, document, listener, lock) = {
        let mut inner = shared.borrow_mut();
        if !inner.mounted {
            return;
        }
        inner.mounted = false;
        inner.background_ref.clear();
        (
            inner.id,
            inner.env.document(),
            inner.escape_listener.take(),
            inner.scroll_lock.take(),
        )
    };
    drop(listener);
    drop(lock);
    document.unmount_portal(id);
    debug!(modal = id.0, "modal unmounted");
}
