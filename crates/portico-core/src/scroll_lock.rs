//! Page scroll lock shared by every overlay on a document.
//!
//! The lock overrides the body `overflow` style while at least one guard is
//! alive. Acquisitions nest: the first saves the prior value, the last
//! release restores it, so overlapping overlays never restore a value one of
//! them wrote.

use crate::document::Document;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Overflow value written while locked.
pub const LOCKED_OVERFLOW: &str = "hidden";

#[derive(Debug, Default)]
struct LockState {
    depth: usize,
    saved: Option<String>,
}

/// Depth-counted scroll lock. Create one per document and share it.
pub struct ScrollLock {
    document: Rc<dyn Document>,
    state: RefCell<LockState>,
}

impl fmt::Debug for ScrollLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLock")
            .field("state", &self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl ScrollLock {
    /// Create the lock for a document.
    pub fn new(document: Rc<dyn Document>) -> Rc<Self> {
        Rc::new(Self {
            document,
            state: RefCell::new(LockState::default()),
        })
    }

    /// Acquire the lock; it is held until the guard is dropped.
    pub fn acquire(self: &Rc<Self>) -> ScrollLockGuard {
        let mut state = self.state.borrow_mut();
        if state.depth == 0 {
            state.saved = Some(self.document.body_overflow());
            self.document.set_body_overflow(LOCKED_OVERFLOW);
        }
        state.depth += 1;
        debug!(depth = state.depth, "scroll lock acquired");
        ScrollLockGuard {
            lock: Rc::clone(self),
        }
    }

    /// Number of live guards.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.state.borrow().depth
    }

    /// Whether any guard is alive.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.depth() > 0
    }

    fn release(&self) {
        let mut state = self.state.borrow_mut();
        state.depth = state.depth.saturating_sub(1);
        if state.depth == 0 {
            let prior = state.saved.take().unwrap_or_default();
            self.document.set_body_overflow(&prior);
            debug!(restored = %prior, "scroll lock released");
        }
    }
}

/// Keeps the page scroll locked while alive.
#[must_use = "the scroll lock is released as soon as the guard is dropped"]
pub struct ScrollLockGuard {
    lock: Rc<ScrollLock>,
}

impl fmt::Debug for ScrollLockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLockGuard")
            .field("depth", &self.lock.depth())
            .finish()
    }
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        self.lock.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryDocument;
    use proptest::prelude::*;

    fn setup(initial: &str) -> (Rc<MemoryDocument>, Rc<ScrollLock>) {
        let doc = Rc::new(MemoryDocument::with_body_overflow(initial));
        let lock = ScrollLock::new(doc.clone());
        (doc, lock)
    }

    #[test]
    fn test_acquire_sets_hidden_and_release_restores() {
        let (doc, lock) = setup("scroll");
        let guard = lock.acquire();
        assert_eq!(doc.body_overflow(), LOCKED_OVERFLOW);
        assert!(lock.is_locked());
        drop(guard);
        assert_eq!(doc.body_overflow(), "scroll");
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_release_restores_empty_when_unset() {
        let (doc, lock) = setup("");
        drop(lock.acquire());
        assert_eq!(doc.body_overflow(), "");
    }

    #[test]
    fn test_nested_guards_restore_once() {
        let (doc, lock) = setup("auto");
        let first = lock.acquire();
        let second = lock.acquire();
        assert_eq!(lock.depth(), 2);
        drop(first);
        assert_eq!(doc.body_overflow(), LOCKED_OVERFLOW);
        drop(second);
        assert_eq!(doc.body_overflow(), "auto");
    }

    #[test]
    fn test_reacquire_saves_fresh_value() {
        let (doc, lock) = setup("auto");
        drop(lock.acquire());
        doc.set_body_overflow("clip");
        let guard = lock.acquire();
        drop(guard);
        assert_eq!(doc.body_overflow(), "clip");
    }

    proptest! {
        #[test]
        fn prop_any_release_order_restores(initial in "[a-z]{0,8}", n in 1usize..8, order in proptest::collection::vec(any::<usize>(), 8)) {
            let (doc, lock) = setup(&initial);
            let mut guards: Vec<ScrollLockGuard> = (0..n).map(|_| lock.acquire()).collect();
            for pick in order.iter().take(n) {
                let idx = pick % guards.len();
                drop(guards.remove(idx));
                if guards.is_empty() {
                    break;
                }
                prop_assert_eq!(doc.body_overflow(), LOCKED_OVERFLOW);
            }
            guards.clear();
            prop_assert_eq!(doc.body_overflow(), initial);
            prop_assert_eq!(lock.depth(), 0);
        }
    }
}
