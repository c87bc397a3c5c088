//! Core types for Portico overlays.
//!
//! This crate provides the pieces an overlay needs from its host:
//! - Virtual nodes: [`Node`], [`Element`], [`NodeRef`], [`Portal`]
//! - Events: [`Key`], [`KeyEvent`], [`ClickEvent`]
//! - The host document: [`Document`] and the in-memory [`MemoryDocument`]
//! - Scoped side effects: [`ScrollLock`], [`KeyListenerGuard`]

mod document;
mod dom;
mod error;
mod event;
mod listener;
mod memory;
mod scroll_lock;

pub use document::{Document, ListenerId, PortalKey};
pub use dom::{Element, Node, NodeId, NodeRef, Portal, Props};
pub use error::DomError;
pub use event::{ClickEvent, ClickHandler, Key, KeyEvent, KeyHandler};
pub use listener::KeyListenerGuard;
pub use memory::MemoryDocument;
pub use scroll_lock::{ScrollLock, ScrollLockGuard, LOCKED_OVERFLOW};
