//! Error types for portico-core.

use crate::dom::NodeId;
use thiserror::Error;

/// Errors raised by a [`Document`](crate::Document) implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    /// Portal target was never created by this document.
    #[error("unknown portal target: {0}")]
    UnknownTarget(NodeId),

    /// No global window (non-browser host).
    #[error("window not available")]
    NoWindow,

    /// Document has no body element.
    #[error("document body not available")]
    NoBody,

    /// JavaScript exception raised by a DOM call.
    #[error("JavaScript error: {0}")]
    Js(String),
}
