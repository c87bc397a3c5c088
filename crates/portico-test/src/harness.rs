//! Test harness driving modals against an in-memory document.

use futures::executor::LocalPool;
use portico_core::{Document, Key, KeyEvent, MemoryDocument, NodeId, LOCKED_OVERFLOW};
use portico_modal::{Modal, ModalBuilder, ModalProvider, OverlayConfig, RenderEnv};
use std::rc::Rc;
use tracing::warn;

/// Harness owning a document, a local executor and a provider.
///
/// Every interaction settles the executor afterwards, so pending hook
/// signals that can complete have completed by the time it returns.
pub struct ModalHarness {
    document: Rc<MemoryDocument>,
    pool: LocalPool,
    provider: ModalProvider,
}

impl ModalHarness {
    /// Harness over an empty document.
    pub fn new() -> Self {
        Self::with_document(MemoryDocument::new())
    }

    /// Harness whose body starts with `overflow` set.
    pub fn with_body_overflow(overflow: &str) -> Self {
        Self::with_document(MemoryDocument::with_body_overflow(overflow))
    }

    /// Harness whose provider uses the configured backdrop.
    pub fn with_config(config: &OverlayConfig) -> Self {
        let mut harness = Self::new();
        harness.provider = harness
            .provider
            .background_config(config.background.clone());
        harness
    }

    fn with_document(document: MemoryDocument) -> Self {
        let document = Rc::new(document);
        let pool = LocalPool::new();
        let provider = ModalProvider::new(document.clone(), Rc::new(pool.spawner()))
            .expect("in-memory document always creates portal targets");
        Self {
            document,
            pool,
            provider,
        }
    }

    /// The in-memory document.
    #[must_use]
    pub fn document(&self) -> &Rc<MemoryDocument> {
        &self.document
    }

    /// The provider modals are mounted under.
    #[must_use]
    pub const fn provider(&self) -> &ModalProvider {
        &self.provider
    }

    /// Environment for mounting modals by hand.
    #[must_use]
    pub fn env(&self) -> RenderEnv {
        self.provider.env()
    }

    // === Driving ===

    /// Mount a modal and settle.
    pub fn mount(&mut self, builder: ModalBuilder) -> Modal {
        let modal = self.provider.modal(builder);
        self.settle();
        modal
    }

    /// Run every task that can make progress.
    pub fn settle(&mut self) -> &mut Self {
        self.pool.run_until_stalled();
        self
    }

    /// Change a modal's desired open state and settle.
    pub fn set_open(&mut self, modal: &Modal, open: bool) -> &mut Self {
        modal.set_open(open);
        self.settle()
    }

    /// Simulate a keydown on the document.
    pub fn press_key(&mut self, key: Key) -> &mut Self {
        self.document.dispatch_keydown(&KeyEvent::new(key));
        self.settle()
    }

    /// Simulate pressing Escape.
    pub fn press_escape(&mut self) -> &mut Self {
        self.press_key(Key::Escape)
    }

    /// Click the node carrying `data-testid="{test_id}"`.
    pub fn click(&mut self, test_id: &str) -> &mut Self {
        match self.document.find_by_test_id(test_id) {
            Some(node) => self.click_node(node),
            None => {
                warn!(test_id, "click target not found");
                self
            }
        }
    }

    /// Click a node by id.
    pub fn click_node(&mut self, node: NodeId) -> &mut Self {
        self.document.click(node);
        self.settle()
    }

    /// Click a modal's backdrop element.
    pub fn click_background(&mut self, modal: &Modal) -> &mut Self {
        match modal.background_node() {
            Some(node) => self.click_node(node),
            None => {
                warn!(modal = modal.id().0, "modal has no background to click");
                self
            }
        }
    }

    // === Queries ===

    /// Whether a node with the test id is mounted.
    #[must_use]
    pub fn exists(&self, test_id: &str) -> bool {
        self.document.find_by_test_id(test_id).is_some()
    }

    /// Text of everything mounted through portals.
    #[must_use]
    pub fn text(&self) -> String {
        self.document.text_content()
    }

    /// Current body overflow style.
    #[must_use]
    pub fn body_overflow(&self) -> String {
        self.document.body_overflow()
    }

    // === Assertions ===

    /// Assert that the modal is open.
    ///
    /// # Panics
    ///
    /// Panics if the modal is closed.
    pub fn assert_open(&self, modal: &Modal) -> &Self {
        assert!(modal.is_open(), "Expected modal {} to be open", modal.id().0);
        assert!(
            self.document.portal(modal.id()).is_some(),
            "Expected modal {} to have a mounted portal",
            modal.id().0
        );
        self
    }

    /// Assert that the modal is closed.
    ///
    /// # Panics
    ///
    /// Panics if the modal is open or still has a mounted portal.
    pub fn assert_closed(&self, modal: &Modal) -> &Self {
        assert!(!modal.is_open(), "Expected modal {} to be closed", modal.id().0);
        assert!(
            self.document.portal(modal.id()).is_none(),
            "Expected modal {} to have no mounted portal",
            modal.id().0
        );
        self
    }

    /// Assert that page scrolling is locked.
    ///
    /// # Panics
    ///
    /// Panics if the body overflow is not the locked value.
    pub fn assert_scroll_locked(&self) -> &Self {
        let actual = self.body_overflow();
        assert_eq!(
            actual, LOCKED_OVERFLOW,
            "Expected body overflow '{LOCKED_OVERFLOW}' but got '{actual}'"
        );
        self
    }

    /// Assert that the body overflow has a specific value.
    ///
    /// # Panics
    ///
    /// Panics if the value differs.
    pub fn assert_scroll_style(&self, expected: &str) -> &Self {
        let actual = self.body_overflow();
        assert_eq!(
            actual, expected,
            "Expected body overflow '{expected}' but got '{actual}'"
        );
        self
    }

    /// Assert the mounted text exactly.
    ///
    /// # Panics
    ///
    /// Panics if the text does not match.
    pub fn assert_text(&self, expected: &str) -> &Self {
        let actual = self.text();
        assert_eq!(actual, expected, "Expected text '{expected}' but got '{actual}'");
        self
    }

    /// Assert that the mounted text contains a substring.
    ///
    /// # Panics
    ///
    /// Panics if the substring is missing.
    pub fn assert_text_contains(&self, substring: &str) -> &Self {
        let actual = self.text();
        assert!(
            actual.contains(substring),
            "Expected text to contain '{substring}' but got '{actual}'"
        );
        self
    }

    /// Assert that a node with the test id is mounted.
    ///
    /// # Panics
    ///
    /// Panics if it is not.
    pub fn assert_exists(&self, test_id: &str) -> &Self {
        assert!(
            self.exists(test_id),
            "Expected node with test id '{test_id}' to exist"
        );
        self
    }

    /// Assert that no node with the test id is mounted.
    ///
    /// # Panics
    ///
    /// Panics if one is.
    pub fn assert_not_exists(&self, test_id: &str) -> &Self {
        assert!(
            !self.exists(test_id),
            "Expected node with test id '{test_id}' to not exist"
        );
        self
    }

    /// Assert the number of document keydown listeners.
    ///
    /// # Panics
    ///
    /// Panics if the count differs.
    pub fn assert_listener_count(&self, expected: usize) -> &Self {
        let actual = self.document.listener_count();
        assert_eq!(
            actual, expected,
            "Expected {expected} keydown listeners but found {actual}"
        );
        self
    }
}

impl Default for ModalHarness {
    fn default() -> Self {
        Self::new()
    }
}
