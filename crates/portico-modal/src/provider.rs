//! Provider that sets up the portal target and the default backdrop.

use crate::config::BackgroundConfig;
use crate::env::{BackgroundProps, BackgroundRenderer, ModalContext, RenderEnv};
use crate::modal::{Modal, ModalBuilder};
use futures::task::LocalSpawn;
use portico_core::{Document, DomError, Element, Node, NodeId};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Class carried by the default backdrop element.
pub const BACKGROUND_CLASS: &str = "portico-background";

/// Default backdrop: a fixed, full-viewport, flex-centred dimmed `div`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseModalBackground {
    config: BackgroundConfig,
}

impl BaseModalBackground {
    /// Backdrop with the built-in colour and stacking order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backdrop with custom appearance.
    #[must_use]
    pub const fn with_config(config: BackgroundConfig) -> Self {
        Self { config }
    }

    /// Appearance settings.
    #[must_use]
    pub const fn config(&self) -> &BackgroundConfig {
        &self.config
    }
}

impl BackgroundRenderer for BaseModalBackground {
    fn render(&self, props: BackgroundProps) -> Node {
        let element = Element::new("div")
            .with_attr("class", BACKGROUND_CLASS)
            .with_attr("style", self.config.style())
            .with_attrs(&props.props)
            .on_click(props.on_click)
            .with_children(props.children);
        props.node_ref.set(element.id());
        element.into()
    }
}

/// Owns the portal target for a document and hands out modal environments.
pub struct ModalProvider {
    env: RenderEnv,
    portal_target: NodeId,
}

impl fmt::Debug for ModalProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalProvider")
            .field("portal_target", &self.portal_target)
            .field("env", &self.env)
            .finish()
    }
}

impl ModalProvider {
    /// Create the portal target in `document` and install the default
    /// backdrop.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot create the portal target.
    pub fn new(document: Rc<dyn Document>, spawner: Rc<dyn LocalSpawn>) -> Result<Self, DomError> {
        let portal_target = document.create_portal_target()?;
        debug!(portal_target = %portal_target, "modal provider ready");
        let env = RenderEnv::new(document, spawner).with_context(ModalContext {
            portal_target: Some(portal_target),
            background: Some(Rc::new(BaseModalBackground::new())),
        });
        Ok(Self { env, portal_target })
    }

    /// Replace the backdrop renderer for modals mounted afterwards.
    #[must_use]
    pub fn background(mut self, renderer: impl BackgroundRenderer + 'static) -> Self {
        self.set_background(Rc::new(renderer));
        self
    }

    /// Use the default backdrop with custom appearance.
    #[must_use]
    pub fn background_config(self, config: BackgroundConfig) -> Self {
        self.background(BaseModalBackground::with_config(config))
    }

    fn set_background(&mut self, renderer: Rc<dyn BackgroundRenderer>) {
        let context = ModalContext {
            portal_target: Some(self.portal_target),
            background: Some(renderer),
        };
        self.env = self.env.clone().with_context(context);
    }

    /// Node modal portals are mounted into.
    #[must_use]
    pub const fn portal_target(&self) -> Option<NodeId> {
        Some(self.portal_target)
    }

    /// Environment for mounting modals under this provider.
    #[must_use]
    pub fn env(&self) -> RenderEnv {
        self.env.clone()
    }

    /// Mount a modal under this provider.
    pub fn modal(&self, builder: ModalBuilder) -> Modal {
        builder.mount(&self.env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::LocalPool;
    use portico_core::{ClickEvent, MemoryDocument, NodeRef, Props};

    fn provider() -> (Rc<MemoryDocument>, ModalProvider) {
        let doc = Rc::new(MemoryDocument::new());
        let pool = LocalPool::new();
        let provider = ModalProvider::new(doc.clone(), Rc::new(pool.spawner())).unwrap();
        (doc, provider)
    }

    #[test]
    fn test_provider_creates_target() {
        let (doc, provider) = provider();
        assert_eq!(doc.portal_targets(), vec![provider.portal_target().unwrap()]);
        assert!(provider.env().context().is_complete());
    }

    #[test]
    fn test_base_background_attributes() {
        let node_ref = NodeRef::new();
        let node = BaseModalBackground::new().render(BackgroundProps {
            props: Props::new().with("data-testid", "bg"),
            on_click: Rc::new(|_: &ClickEvent| {}),
            node_ref: node_ref.clone(),
            children: vec!["content".into()],
        });
        let el = node.as_element().unwrap();
        assert_eq!(node_ref.get(), Some(el.id()));
        assert_eq!(el.tag(), "div");
        assert_eq!(el.attr("class"), Some(BACKGROUND_CLASS));
        assert_eq!(el.attr("data-testid"), Some("bg"));
        assert!(el.click_handler().is_some());
        let style = el.attr("style").unwrap();
        assert!(style.contains("rgba(0, 0, 0, 0.5)"));
        assert!(style.contains("z-index: 30"));
        assert_eq!(node.text_content(), "content");
    }

    #[test]
    fn test_background_props_override_defaults() {
        let node = BaseModalBackground::new().render(BackgroundProps {
            props: Props::new().with("style", "display: none;"),
            on_click: Rc::new(|_: &ClickEvent| {}),
            node_ref: NodeRef::new(),
            children: Vec::new(),
        });
        assert_eq!(node.as_element().unwrap().attr("style"), Some("display: none;"));
    }

    #[test]
    fn test_background_config_changes_style() {
        let (doc, provider) = provider();
        let provider = provider.background_config(BackgroundConfig {
            color: "red".to_string(),
            z_index: 5,
        });
        let modal = provider.modal(Modal::builder().is_open(true));
        let background = modal.background_node().unwrap();
        let style = doc.attr(background, "style").unwrap();
        assert!(style.contains("background-color: red;"));
        assert!(style.contains("z-index: 5;"));
    }

    #[test]
    fn test_custom_background_renderer() {
        struct Plain;
        impl BackgroundRenderer for Plain {
            fn render(&self, props: BackgroundProps) -> Node {
                let el = Element::new("aside")
                    .with_attr("data-testid", "plain")
                    .on_click(props.on_click)
                    .with_children(props.children);
                props.node_ref.set(el.id());
                el.into()
            }
        }

        let (doc, provider) = provider();
        let provider = provider.background(Plain);
        let modal = provider.modal(Modal::builder().is_open(true));
        assert_eq!(doc.find_by_test_id("plain"), modal.background_node());
    }

    #[test]
    fn test_modals_share_scroll_lock() {
        let (_, provider) = provider();
        assert!(Rc::ptr_eq(
            &provider.env().scroll_lock(),
            &provider.env().scroll_lock()
        ));
    }
}
