//! Render environment injected into modals at mount time.
//!
//! A modal never looks anything up globally. Its document, scroll lock,
//! executor, portal target and background renderer all arrive through a
//! [`RenderEnv`], usually built by a [`ModalProvider`](crate::ModalProvider).

use futures::task::LocalSpawn;
use portico_core::{ClickHandler, Document, Node, NodeId, NodeRef, Props, ScrollLock};
use std::fmt;
use std::rc::Rc;

/// Renders a wrapper around modal children.
pub trait Component {
    /// Render `children` with the pass-through `props`.
    fn render(&self, props: &Props, children: Vec<Node>) -> Node;
}

impl<F> Component for F
where
    F: Fn(&Props, Vec<Node>) -> Node,
{
    fn render(&self, props: &Props, children: Vec<Node>) -> Node {
        self(props, children)
    }
}

/// Inputs handed to a [`BackgroundRenderer`].
pub struct BackgroundProps {
    /// Caller-supplied background attributes
    pub props: Props,
    /// Must be attached to the background element
    pub on_click: ClickHandler,
    /// Must be pointed at the background element
    pub node_ref: NodeRef,
    /// Modal content
    pub children: Vec<Node>,
}

impl fmt::Debug for BackgroundProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundProps")
            .field("props", &self.props)
            .field("node_ref", &self.node_ref)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// Renders the clickable backdrop that hosts modal content.
pub trait BackgroundRenderer {
    /// Render the backdrop element.
    ///
    /// Implementations attach `on_click` to the element they return and
    /// point `node_ref` at it; background clicks are matched against it.
    fn render(&self, props: BackgroundProps) -> Node;
}

/// Context collaborator: where to mount and what to mount into.
#[derive(Clone, Default)]
pub struct ModalContext {
    /// Node modal portals are mounted into
    pub portal_target: Option<NodeId>,
    /// Backdrop renderer
    pub background: Option<Rc<dyn BackgroundRenderer>>,
}

impl fmt::Debug for ModalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalContext")
            .field("portal_target", &self.portal_target)
            .field("background", &self.background.is_some())
            .finish()
    }
}

impl ModalContext {
    /// Whether both a target and a background are available.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.portal_target.is_some() && self.background.is_some()
    }
}

/// Everything a mounted modal depends on.
#[derive(Clone)]
pub struct RenderEnv {
    document: Rc<dyn Document>,
    scroll_lock: Rc<ScrollLock>,
    spawner: Rc<dyn LocalSpawn>,
    context: ModalContext,
}

impl fmt::Debug for RenderEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderEnv")
            .field("scroll_lock", &self.scroll_lock)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl RenderEnv {
    /// Environment with an empty context and a fresh scroll lock.
    pub fn new(document: Rc<dyn Document>, spawner: Rc<dyn LocalSpawn>) -> Self {
        let scroll_lock = ScrollLock::new(document.clone());
        Self {
            document,
            scroll_lock,
            spawner,
            context: ModalContext::default(),
        }
    }

    /// Replace the context.
    #[must_use]
    pub fn with_context(mut self, context: ModalContext) -> Self {
        self.context = context;
        self
    }

    /// Share an existing scroll lock. It must belong to the same document.
    #[must_use]
    pub fn with_scroll_lock(mut self, scroll_lock: Rc<ScrollLock>) -> Self {
        self.scroll_lock = scroll_lock;
        self
    }

    /// Host document.
    #[must_use]
    pub fn document(&self) -> Rc<dyn Document> {
        self.document.clone()
    }

    /// Scroll lock shared by modals in this environment.
    #[must_use]
    pub fn scroll_lock(&self) -> Rc<ScrollLock> {
        self.scroll_lock.clone()
    }

    /// Executor for hook signals.
    #[must_use]
    pub fn spawner(&self) -> Rc<dyn LocalSpawn> {
        self.spawner.clone()
    }

    /// Context collaborator.
    #[must_use]
    pub const fn context(&self) -> &ModalContext {
        &self.context
    }
}
