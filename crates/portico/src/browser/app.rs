//! JavaScript entry points.

use super::provider;
use portico_core::KeyEvent;
use portico_modal::{
    resolved, signal, HookError, HookSignal, Modal, ModalBuilder, ModalConfig, OverlayConfig,
};
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// Page-level overlay root exposed to JavaScript.
#[wasm_bindgen]
pub struct Overlay {
    provider: portico_modal::ModalProvider,
    modal_config: ModalConfig,
}

#[wasm_bindgen]
impl Overlay {
    /// Create the portal target in the page body.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Overlay, JsValue> {
        let provider = provider().map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            provider,
            modal_config: ModalConfig::default(),
        })
    }

    /// Create from a YAML overlay config.
    #[wasm_bindgen(js_name = fromYaml)]
    pub fn from_yaml(yaml: &str) -> Result<Overlay, JsValue> {
        let config = OverlayConfig::from_yaml(yaml).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let provider = provider()
            .map_err(|e| JsValue::from_str(&e.to_string()))?
            .background_config(config.background);
        Ok(Self {
            provider,
            modal_config: config.modal,
        })
    }

    /// Mount a closed modal showing `text`.
    pub fn modal(&self, text: &str) -> Result<JsModal, JsValue> {
        let builder = ModalBuilder::from_config(&self.modal_config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?
            .child(text);
        Ok(JsModal {
            modal: self.provider.modal(builder),
        })
    }
}

/// A mounted modal driven from JavaScript.
#[wasm_bindgen]
pub struct JsModal {
    modal: Modal,
}

#[wasm_bindgen]
impl JsModal {
    /// Request the open state.
    pub fn open(&self) {
        self.modal.set_open(true);
    }

    /// Request the closed state.
    pub fn close(&self) {
        self.modal.set_open(false);
    }

    /// Whether the modal is open.
    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.modal.is_open()
    }

    /// Leave page scrolling enabled while open.
    #[wasm_bindgen(js_name = setAllowScroll)]
    pub fn set_allow_scroll(&self, allow: bool) {
        self.modal.set_allow_scroll(allow);
    }

    /// Called with the key value on Escape while open.
    #[wasm_bindgen(js_name = onEscape)]
    pub fn on_escape(&self, callback: js_sys::Function) {
        self.modal
            .set_on_escape_keydown(Some(Rc::new(move |event: &KeyEvent| {
                let key = JsValue::from_str(&event.key.key_value());
                let _ = callback.call1(&JsValue::NULL, &key);
            })));
    }

    /// Called when the backdrop itself is clicked.
    #[wasm_bindgen(js_name = onBackgroundClick)]
    pub fn on_background_click(&self, callback: js_sys::Function) {
        self.modal
            .set_on_background_click(Some(Rc::new(move |_: &portico_core::ClickEvent| {
                let _ = callback.call0(&JsValue::NULL);
            })));
    }

    /// Gate opening on a callback; a returned promise delays the open.
    #[wasm_bindgen(js_name = beforeOpen)]
    pub fn before_open(&self, callback: js_sys::Function) {
        self.modal
            .update(|props| props.hooks.before_open = Some(Rc::new(js_before_hook(callback))));
    }

    /// Gate closing on a callback; a returned promise delays the close.
    #[wasm_bindgen(js_name = beforeClose)]
    pub fn before_close(&self, callback: js_sys::Function) {
        self.modal
            .update(|props| props.hooks.before_close = Some(Rc::new(js_before_hook(callback))));
    }

    /// Called after each open.
    #[wasm_bindgen(js_name = afterOpen)]
    pub fn after_open(&self, callback: js_sys::Function) {
        self.modal.update(|props| {
            props.hooks.after_open = Some(Rc::new(move || {
                let _ = callback.call0(&JsValue::NULL);
            }));
        });
    }

    /// Called after each close.
    #[wasm_bindgen(js_name = afterClose)]
    pub fn after_close(&self, callback: js_sys::Function) {
        self.modal.update(|props| {
            props.hooks.after_close = Some(Rc::new(move || {
                let _ = callback.call0(&JsValue::NULL);
            }));
        });
    }

    /// Remove the modal from the page.
    pub fn unmount(&self) {
        self.modal.unmount();
    }
}

/// A throwing callback approves the transition. A rejected promise holds it.
fn js_before_hook(callback: js_sys::Function) -> impl Fn() -> Result<HookSignal, HookError> {
    move || {
        let value = callback
            .call0(&JsValue::NULL)
            .map_err(|err| HookError::new(err.as_string().unwrap_or_else(|| format!("{err:?}"))))?;
        let Ok(promise) = value.dyn_into::<js_sys::Promise>() else {
            return Ok(resolved());
        };
        Ok(signal(async move {
            if let Err(err) = JsFuture::from(promise).await {
                warn!(error = ?err, "hook promise rejected, transition held");
                futures::future::pending::<()>().await;
            }
        }))
    }
}

/// Initialize panic hook for better error messages.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log to browser console.
#[wasm_bindgen]
pub fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}
