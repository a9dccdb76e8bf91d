//! crates/quiz_core/src/guard.rs
//!
//! A last-issued-wins guard for a logical operation that may have several
//! requests in flight. Only the most recently issued request may apply its
//! result; everything older is discarded when it completes.

use std::sync::atomic::{AtomicU64, Ordering};

/// The token captured when a request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Ticket {
    pub fn token(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct StaleGuard {
    counter: AtomicU64,
}

impl StaleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, superseding every outstanding ticket.
    pub fn issue(&self) -> Ticket {
        Ticket(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Supersedes every outstanding ticket without starting a request.
    pub fn invalidate(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.counter.load(Ordering::SeqCst) == ticket.0
    }

    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Runs `apply` only if `ticket` is still the latest one.
    /// Returns `None` when the result was stale and dropped.
    pub fn apply_if_current<T, R>(
        &self,
        ticket: Ticket,
        value: T,
        apply: impl FnOnce(T) -> R,
    ) -> Option<R> {
        if self.is_current(ticket) {
            Some(apply(value))
        } else {
            None
        }
    }
}
