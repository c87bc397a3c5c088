//! Lifecycle hooks run around open/close transitions.
//!
//! Before-hooks gate a transition: the state only flips once the returned
//! [`HookSignal`] completes. A hook that fails synchronously approves the
//! transition instead of blocking it. After-hooks run once per completed
//! transition.

use futures::future::{self, FutureExt, LocalBoxFuture};
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use thiserror::Error;

/// Deferred completion returned by a before-hook.
pub type HookSignal = LocalBoxFuture<'static, ()>;

/// Before-open / before-close callback.
pub type BeforeHook = Rc<dyn Fn() -> Result<HookSignal, HookError>>;

/// After-open / after-close callback.
pub type AfterHook = Rc<dyn Fn()>;

/// Synchronous failure raised by a before-hook.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("lifecycle hook failed: {message}")]
pub struct HookError {
    message: String,
}

impl HookError {
    /// Create a hook error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Point in the open/close cycle a hook is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalPhase {
    /// Before the modal opens
    BeforeOpen,
    /// After the modal opened
    AfterOpen,
    /// Before the modal closes
    BeforeClose,
    /// After the modal closed
    AfterClose,
}

impl ModalPhase {
    /// Before-phase for a transition towards `open`.
    #[must_use]
    pub const fn before(open: bool) -> Self {
        if open {
            Self::BeforeOpen
        } else {
            Self::BeforeClose
        }
    }

    /// After-phase for a transition towards `open`.
    #[must_use]
    pub const fn after(open: bool) -> Self {
        if open {
            Self::AfterOpen
        } else {
            Self::AfterClose
        }
    }

    /// Name used in log fields.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BeforeOpen => "before_open",
            Self::AfterOpen => "after_open",
            Self::BeforeClose => "before_close",
            Self::AfterClose => "after_close",
        }
    }
}

/// The four optional hook slots.
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    /// Gate for opening
    pub before_open: Option<BeforeHook>,
    /// Runs after opening
    pub after_open: Option<AfterHook>,
    /// Gate for closing
    pub before_close: Option<BeforeHook>,
    /// Runs after closing
    pub after_close: Option<AfterHook>,
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("before_open", &self.before_open.is_some())
            .field("after_open", &self.after_open.is_some())
            .field("before_close", &self.before_close.is_some())
            .field("after_close", &self.after_close.is_some())
            .finish()
    }
}

impl LifecycleHooks {
    /// No hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the before-open gate.
    #[must_use]
    pub fn before_open<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> Result<HookSignal, HookError> + 'static,
    {
        self.before_open = Some(Rc::new(hook));
        self
    }

    /// Set the after-open callback.
    #[must_use]
    pub fn after_open<F: Fn() + 'static>(mut self, hook: F) -> Self {
        self.after_open = Some(Rc::new(hook));
        self
    }

    /// Set the before-close gate.
    #[must_use]
    pub fn before_close<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> Result<HookSignal, HookError> + 'static,
    {
        self.before_close = Some(Rc::new(hook));
        self
    }

    /// Set the after-close callback.
    #[must_use]
    pub fn after_close<F: Fn() + 'static>(mut self, hook: F) -> Self {
        self.after_close = Some(Rc::new(hook));
        self
    }

    /// Gate for a transition towards `open`.
    #[must_use]
    pub fn before(&self, open: bool) -> Option<BeforeHook> {
        if open {
            self.before_open.clone()
        } else {
            self.before_close.clone()
        }
    }

    /// Callback for a completed transition to `open`.
    #[must_use]
    pub fn after(&self, open: bool) -> Option<AfterHook> {
        if open {
            self.after_open.clone()
        } else {
            self.after_close.clone()
        }
    }
}

/// A signal that is already complete.
pub fn resolved() -> HookSignal {
    future::ready(()).boxed_local()
}

/// Wrap any local future as a hook signal.
pub fn signal<F>(fut: F) -> HookSignal
where
    F: Future<Output = ()> + 'static,
{
    fut.boxed_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_phase_selection() {
        assert_eq!(ModalPhase::before(true), ModalPhase::BeforeOpen);
        assert_eq!(ModalPhase::before(false), ModalPhase::BeforeClose);
        assert_eq!(ModalPhase::after(true), ModalPhase::AfterOpen);
        assert_eq!(ModalPhase::after(false).name(), "after_close");
    }

    #[test]
    fn test_hook_slots() {
        let hooks = LifecycleHooks::new()
            .before_open(|| Ok(resolved()))
            .after_close(|| {});
        assert!(hooks.before(true).is_some());
        assert!(hooks.before(false).is_none());
        assert!(hooks.after(true).is_none());
        assert!(hooks.after(false).is_some());
        assert_eq!(
            format!("{hooks:?}"),
            "LifecycleHooks { before_open: true, after_open: false, before_close: false, after_close: true }"
        );
    }

    #[test]
    fn test_resolved_signal_completes() {
        block_on(resolved());
        block_on(signal(async {}));
    }

    #[test]
    fn test_hook_error_display() {
        let err = HookError::new("network down");
        assert_eq!(err.message(), "network down");
        assert_eq!(err.to_string(), "lifecycle hook failed: network down");
    }
}
