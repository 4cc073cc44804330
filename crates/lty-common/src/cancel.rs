//! Cooperative cancellation for long-running queries.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag checked by the inferrer at every recursive step.
///
/// Clones share the same flag. Cancelling never interrupts a thread; the
/// running query notices on its next step and unwinds with `Unknown`.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Clear the flag so the token can be reused for the next query.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}
