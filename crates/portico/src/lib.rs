//! Portico: portal overlays and controlled modals for WASM-first Rust UIs.
//!
//! Re-exports [`portico_core`] and [`portico_modal`]; on `wasm32` the
//! [`browser`] module binds them to the page DOM.
//!
//! # Browser Usage (WASM)
//!
//! ```javascript
//! import init, { Overlay } from './portico.js';
//!
//! async function main() {
//!     await init();
//!     const overlay = new Overlay();
//!     const modal = overlay.modal('Saved!');
//!     modal.onEscape(() => modal.close());
//!     modal.onBackgroundClick(() => modal.close());
//!     modal.beforeOpen(() => fetch('/api/ready'));
//!     modal.open();
//! }
//! ```

#![allow(
    clippy::missing_const_for_fn,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::new_without_default,
    unreachable_pub
)]

pub use portico_core::*;
pub use portico_modal::*;

pub mod browser;

#[cfg(target_arch = "wasm32")]
pub use browser::{JsModal, Overlay, WasmSpawner, WebDocument};
