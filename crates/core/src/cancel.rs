//! Cooperative cancellation for blocked snapshot readers.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

/// Something a cancelled token must wake so its waiters can observe the flag.
pub(crate) trait Waker: Send + Sync {
    fn wake(&self);
}

/// Cloneable handle that cancels every snapshot wait it was passed to.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

#[derive(Default)]
struct TokenInner {
    cancelled: AtomicBool,
    waiters: Mutex<Vec<Weak<dyn Waker>>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let waiters = std::mem::take(&mut *self.inner.waiters.lock());
        debug!(waiters = waiters.len(), "cancel token fired");
        for waiter in waiters.iter().filter_map(Weak::upgrade) {
            waiter.wake();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Registers a waiter. Callers must check [`Self::is_cancelled`] after
    /// registering and before blocking.
    pub(crate) fn register(&self, waiter: Weak<dyn Waker>) {
        let mut waiters = self.inner.waiters.lock();
        if self.is_cancelled() {
            return;
        }
        waiters.retain(|w| w.strong_count() > 0);
        if !waiters.iter().any(|w| Weak::ptr_eq(w, &waiter)) {
            waiters.push(waiter);
        }
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
