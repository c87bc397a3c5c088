//! Testing harness for Portico overlays.
//!
//! ```
//! use portico_modal::Modal;
//! use portico_test::ModalHarness;
//!
//! let mut harness = ModalHarness::with_body_overflow("auto");
//! let modal = harness.mount(Modal::builder().child("Saved"));
//! harness.set_open(&modal, true);
//! harness.assert_open(&modal).assert_text("Saved").assert_scroll_locked();
//! ```

mod harness;

pub use harness::ModalHarness;

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber that writes through the test output capture.
///
/// Honors `RUST_LOG`, defaulting to debug output for the portico crates.
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("portico_core=debug,portico_modal=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
