//! Bounded top-K set shared between stream writers and snapshot readers.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::cancel::{CancelToken, Waker};
use crate::config::TopKConfig;
use crate::heap::MinHeap;
use crate::ordering::{Natural, TotalOrder};
use crate::snapshot::Snapshot;
use crate::{Result, TopKError};

/// Keeps the `capacity` greatest elements seen so far.
///
/// Readers block in [`snapshot`](Self::snapshot) until the set has filled up
/// once. Clones are handles to the same set.
pub struct BoundedTopK<E> {
    shared: Arc<Shared<E>>,
}

struct Shared<E> {
    state: Mutex<State<E>>,
    ready: Condvar,
    capacity: usize,
    recheck_interval: Duration,
}

struct State<E> {
    retained: MinHeap<E>,
    is_ready: bool,
    stats: TopKStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TopKStats {
    pub recorded: u64,
    pub evicted: u64,
    pub snapshots: u64,
}

impl<E> BoundedTopK<E> {
    pub fn new<O>(capacity: usize, ordering: O) -> Result<Self>
    where
        O: TotalOrder<E> + 'static,
    {
        Self::with_config(TopKConfig::with_capacity(capacity), ordering)
    }

    pub fn with_config<O>(cfg: TopKConfig, ordering: O) -> Result<Self>
    where
        O: TotalOrder<E> + 'static,
    {
        cfg.validate()?;
        debug!(capacity = cfg.capacity, recheck_ms = cfg.recheck_interval.as_millis() as u64, "creating top-k set");
        let state = State {
            retained: MinHeap::new(Arc::new(ordering)),
            is_ready: false,
            stats: TopKStats::default(),
        };
        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                ready: Condvar::new(),
                capacity: cfg.capacity,
                recheck_interval: cfg.recheck_interval,
            }),
        })
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn len(&self) -> usize {
        self.shared.state.lock().retained.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().retained.is_empty()
    }

    pub fn is_ready(&self) -> bool {
        self.shared.state.lock().is_ready
    }

    pub fn stats(&self) -> TopKStats {
        self.shared.state.lock().stats
    }

    /// Inserts one element, evicting the current minimum if the set overflows.
    pub fn record(&self, element: E) {
        let mut state = self.shared.state.lock();
        let capacity = self.shared.capacity;

        state.retained.push(element);
        state.stats.recorded += 1;
        if state.retained.len() > capacity {
            state.retained.pop_min();
            state.stats.evicted += 1;
        }

        let now_ready = state.retained.len() == capacity;
        trace!(len = state.retained.len(), capacity, "recorded element");
        if now_ready != state.is_ready {
            state.is_ready = now_ready;
            if now_ready {
                debug!(capacity, "top-k set filled, releasing readers");
                self.shared.ready.notify_all();
            } else {
                warn!(len = state.retained.len(), capacity, "top-k set dropped below capacity");
            }
        }
    }

    /// Records each element in turn. Readers may observe any prefix.
    pub fn record_all<I>(&self, elements: I)
    where
        I: IntoIterator<Item = E>,
    {
        for element in elements {
            self.record(element);
        }
    }
}

impl<E: Ord + 'static> BoundedTopK<E> {
    pub fn natural(capacity: usize) -> Result<Self> {
        Self::new(capacity, Natural)
    }
}

impl<E: Clone + Send + 'static> BoundedTopK<E> {
    /// Blocks until the set has filled, then copies it out.
    pub fn snapshot(&self) -> Result<Snapshot<E>> {
        self.wait_snapshot(None, None)
    }

    /// Like [`snapshot`](Self::snapshot), but gives up with
    /// [`TopKError::Cancelled`] once `token` is cancelled.
    pub fn snapshot_cancellable(&self, token: &CancelToken) -> Result<Snapshot<E>> {
        self.wait_snapshot(Some(token), None)
    }

    /// Like [`snapshot`](Self::snapshot), but fails with
    /// [`TopKError::TimedOut`] if the set is still filling after `timeout`.
    pub fn snapshot_timeout(&self, timeout: Duration) -> Result<Snapshot<E>> {
        self.wait_snapshot(None, Some(timeout))
    }

    /// Returns a snapshot only if the set is already full.
    pub fn try_snapshot(&self) -> Option<Snapshot<E>> {
        let state = self.shared.state.lock();
        if !state.is_ready {
            return None;
        }
        Some(copy_and_release(state))
    }

    fn wait_snapshot(&self, cancel: Option<&CancelToken>, timeout: Option<Duration>) -> Result<Snapshot<E>> {
        if let Some(token) = cancel {
            let shared: Arc<dyn Waker> = self.shared.clone();
            token.register(Arc::downgrade(&shared));
        }
        // A deadline past the end of representable time means no deadline.
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t).map(|d| (t, d)));

        let mut state = self.shared.state.lock();
        while !state.is_ready {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                warn!(len = state.retained.len(), "snapshot wait cancelled");
                return Err(TopKError::Cancelled);
            }
            let mut wait = self.shared.recheck_interval;
            if let Some((timeout, deadline)) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    return Err(TopKError::TimedOut(timeout));
                }
                wait = wait.min(deadline - now);
            }
            if self.shared.ready.wait_for(&mut state, wait).timed_out() {
                debug!(
                    len = state.retained.len(),
                    capacity = self.shared.capacity,
                    "waiting for top-k set to fill"
                );
            }
        }
        Ok(copy_and_release(state))
    }
}

/// Copies the retained set under the lock and sorts the copy after releasing it.
fn copy_and_release<E: Clone>(mut state: MutexGuard<'_, State<E>>) -> Snapshot<E> {
    state.stats.snapshots += 1;
    let elements = state.retained.to_unsorted_vec();
    let order = Arc::clone(state.retained.order());
    drop(state);

    let snapshot = Snapshot::from_unsorted(elements, order.as_ref());
    debug!(len = snapshot.len(), "snapshot taken");
    snapshot
}

impl<E: Send> Waker for Shared<E> {
    fn wake(&self) {
        // Holding the lock orders this notify after any waiter's flag check.
        let _state = self.state.lock();
        self.ready.notify_all();
    }
}

impl<E> Clone for BoundedTopK<E> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<E> fmt::Debug for BoundedTopK<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("BoundedTopK")
            .field("capacity", &self.shared.capacity)
            .field("len", &state.retained.len())
            .field("is_ready", &state.is_ready)
            .finish()
    }
}
