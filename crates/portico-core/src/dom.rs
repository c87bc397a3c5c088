//! Virtual node tree produced by overlay components.
//!
//! Components render into [`Node`] values; a [`Document`](crate::Document)
//! materialises them. Nodes carry stable [`NodeId`]s so that click targets and
//! [`NodeRef`]s can be matched across the boundary.

use crate::event::ClickHandler;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a rendered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Allocate a fresh, process-unique node id.
    pub fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Parse the textual form written to `data-portico-id` attributes.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse().ok().map(Self)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attribute map passed to components and forwarded to elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props(BTreeMap<String, String>);

impl Props {
    /// Create an empty prop map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a prop, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    /// Look up a prop.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Remove a prop.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    /// Whether the prop is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Copy every prop of `other` over this map.
    pub fn merge(&mut self, other: &Self) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }

    /// Iterate props in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of props.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Element node with attributes, children and an optional click handler.
#[derive(Clone)]
pub struct Element {
    id: NodeId,
    tag: String,
    attrs: Props,
    children: Vec<Node>,
    on_click: Option<ClickHandler>,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .field("attrs", &self.attrs)
            .field("children", &self.children)
            .field("on_click", &self.on_click.is_some())
            .finish()
    }
}

impl Element {
    /// Create an element with a fresh id.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            tag: tag.into(),
            attrs: Props::new(),
            children: Vec::new(),
            on_click: None,
        }
    }

    /// Element id.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// All attributes.
    #[must_use]
    pub const fn attrs(&self) -> &Props {
        &self.attrs
    }

    /// Single attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }

    /// Child nodes.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Click handler, if any.
    #[must_use]
    pub const fn click_handler(&self) -> Option<&ClickHandler> {
        self.on_click.as_ref()
    }

    /// Set one attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name, value);
        self
    }

    /// Merge a prop map into the attributes.
    #[must_use]
    pub fn with_attrs(mut self, props: &Props) -> Self {
        self.attrs.merge(props);
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several children.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Attach a click handler.
    #[must_use]
    pub fn on_click(mut self, handler: ClickHandler) -> Self {
        self.on_click = Some(handler);
        self
    }
}

/// A rendered node.
#[derive(Debug, Clone)]
pub enum Node {
    /// Element node
    Element(Element),
    /// Text node
    Text(String),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl Node {
    /// Text node shorthand.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Id of an element node.
    #[must_use]
    pub const fn id(&self) -> Option<NodeId> {
        match self {
            Self::Element(el) => Some(el.id),
            Self::Text(_) => None,
        }
    }

    /// Borrow as an element.
    #[must_use]
    pub const fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    /// Find an element by id anywhere in this subtree.
    #[must_use]
    pub fn find(&self, id: NodeId) -> Option<&Element> {
        self.path_to(id).and_then(|path| path.last().copied())
    }

    /// Find the first element whose attribute `name` equals `value`.
    #[must_use]
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<&Element> {
        let el = self.as_element()?;
        if el.attr(name) == Some(value) {
            return Some(el);
        }
        el.children
            .iter()
            .find_map(|child| child.find_by_attr(name, value))
    }

    /// Elements from this node down to `id`, inclusive at both ends.
    ///
    /// Used for click bubbling: iterate the result in reverse.
    #[must_use]
    pub fn path_to(&self, id: NodeId) -> Option<Vec<&Element>> {
        let el = self.as_element()?;
        if el.id == id {
            return Some(vec![el]);
        }
        for child in &el.children {
            if let Some(mut path) = child.path_to(id) {
                path.insert(0, el);
                return Some(path);
            }
        }
        None
    }

    /// Concatenated text of this subtree.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// Shared, settable reference to a rendered node.
#[derive(Debug, Clone, Default)]
pub struct NodeRef(Rc<Cell<Option<NodeId>>>);

impl NodeRef {
    /// Create an empty reference.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the reference at a node.
    pub fn set(&self, id: NodeId) {
        self.0.set(Some(id));
    }

    /// Current target.
    #[must_use]
    pub fn get(&self) -> Option<NodeId> {
        self.0.get()
    }

    /// Reset to empty.
    pub fn clear(&self) {
        self.0.set(None);
    }

    /// Whether the reference currently points at `id`.
    #[must_use]
    pub fn is(&self, id: NodeId) -> bool {
        self.0.get() == Some(id)
    }
}

/// Subtree rendered into a node outside its logical parent.
#[derive(Debug, Clone)]
pub struct Portal {
    /// Node the content is mounted into
    pub target: NodeId,
    /// Rendered content
    pub content: Node,
}

impl Portal {
    /// Create a portal.
    #[must_use]
    pub const fn new(target: NodeId, content: Node) -> Self {
        Self { target, content }
    }
}
