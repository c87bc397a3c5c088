//! The host document seen by overlay components.
//!
//! Everything an overlay touches outside its own subtree goes through this
//! trait: the body overflow style, the document keydown registry, and portal
//! targets. In the browser it is backed by `web-sys`; elsewhere by
//! [`MemoryDocument`](crate::MemoryDocument).

use crate::dom::{NodeId, Portal};
use crate::error::DomError;
use crate::event::KeyHandler;

/// Handle returned by [`Document::add_keydown_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Identifies the owner of a mounted portal.
///
/// Each owner has at most one portal mounted at a time; mounting again
/// replaces the previous content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortalKey(pub u64);

/// Host document operations.
///
/// All methods take `&self`; implementations use interior mutability and are
/// expected to be driven from a single thread.
pub trait Document {
    /// Current `overflow` value of the body style (empty when unset).
    fn body_overflow(&self) -> String;

    /// Overwrite the body `overflow` style. An empty value clears it.
    fn set_body_overflow(&self, value: &str);

    /// Register a document-level keydown listener.
    fn add_keydown_listener(&self, listener: KeyHandler) -> ListenerId;

    /// Remove a keydown listener. Returns `false` if it was not registered.
    fn remove_keydown_listener(&self, id: ListenerId) -> bool;

    /// Create a node in the body that portals can be mounted into.
    fn create_portal_target(&self) -> Result<NodeId, DomError>;

    /// Mount (or replace) the portal owned by `key`.
    fn mount_portal(&self, key: PortalKey, portal: Portal) -> Result<(), DomError>;

    /// Remove the portal owned by `key`. Returns `false` if none was mounted.
    fn unmount_portal(&self, key: PortalKey) -> bool;
}
