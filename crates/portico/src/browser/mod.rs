//! Browser runtime for Portico WASM applications.
//!
//! This module binds the overlay machinery to the real DOM: a
//! `WebDocument`, a microtask-backed `WasmSpawner` for hook signals, and
//! the JavaScript-facing `Overlay` and `JsModal`.

#[cfg(target_arch = "wasm32")]
pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod document;
#[cfg(target_arch = "wasm32")]
pub mod spawner;

#[cfg(target_arch = "wasm32")]
pub use app::{init, log, JsModal, Overlay};
#[cfg(target_arch = "wasm32")]
pub use document::{WebDocument, NODE_ID_ATTR, PORTAL_ATTR};
#[cfg(target_arch = "wasm32")]
pub use spawner::WasmSpawner;

/// Provider bound to the page document, spawning hook signals as microtasks.
///
/// # Errors
///
/// Returns an error outside a window or before `<body>` exists.
#[cfg(target_arch = "wasm32")]
pub fn provider() -> Result<portico_modal::ModalProvider, portico_core::DomError> {
    let document = WebDocument::new()?;
    portico_modal::ModalProvider::new(std::rc::Rc::new(document), std::rc::Rc::new(WasmSpawner))
}
