//! Controlled portal modal for Portico.
//!
//! This crate provides:
//! - The modal itself: [`Modal`], [`ModalBuilder`], [`WeakModal`]
//! - Async lifecycle hooks: [`LifecycleHooks`], [`HookSignal`]
//! - The render environment: [`RenderEnv`], [`ModalContext`], [`BackgroundRenderer`]
//! - A provider with the default backdrop: [`ModalProvider`], [`BaseModalBackground`]
//! - Pre-styled wrappers: [`Modal::styled`], [`StyleTemplate`]
//! - YAML configuration: [`OverlayConfig`]
//!
//! ```
//! use futures::executor::LocalPool;
//! use portico_core::{Document, MemoryDocument};
//! use portico_modal::{Modal, ModalProvider};
//! use std::rc::Rc;
//!
//! let doc = Rc::new(MemoryDocument::with_body_overflow("auto"));
//! let pool = LocalPool::new();
//! let provider = ModalProvider::new(doc.clone(), Rc::new(pool.spawner())).unwrap();
//!
//! let modal = provider.modal(Modal::builder().child("Hello"));
//! modal.set_open(true);
//! assert_eq!(doc.text_content(), "Hello");
//! assert_eq!(doc.body_overflow(), "hidden");
//!
//! modal.set_open(false);
//! assert_eq!(doc.portal_count(), 0);
//! assert_eq!(doc.body_overflow(), "auto");
//! ```

mod config;
mod env;
mod hooks;
mod modal;
mod provider;
mod styled;

pub use config::{
    BackgroundConfig, ConfigError, ModalConfig, OverlayConfig, DEFAULT_BACKGROUND_COLOR,
    DEFAULT_Z_INDEX,
};
pub use env::{BackgroundProps, BackgroundRenderer, Component, ModalContext, RenderEnv};
pub use hooks::{
    resolved, signal, AfterHook, BeforeHook, HookError, HookSignal, LifecycleHooks, ModalPhase,
};
pub use modal::{Modal, ModalBuilder, ModalProps, ModalState, WeakModal};
pub use provider::{BaseModalBackground, ModalProvider, BACKGROUND_CLASS};
pub use styled::{ModalPreset, StyleError, StyleTemplate, StyledWrapper, CLASS_PREFIX};
