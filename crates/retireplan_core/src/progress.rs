//! Shared window counter and cancel flag for long-running sweeps

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Cloneable handle observed by simulations and sweeps.
///
/// Clones share the same state, so a caller can keep one clone to cancel or
/// poll while the computation holds another.
#[derive(Debug, Clone, Default)]
pub struct SweepProgress {
    /// Rolling windows simulated so far
    windows_done: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl SweepProgress {
    #[must_use]
    pub fn completed(&self) -> usize {
        self.windows_done.load(Ordering::Relaxed)
    }

    /// Record one simulated window
    pub fn increment(&self) {
        self.windows_done.fetch_add(1, Ordering::Relaxed);
    }

    /// Ask every sweep holding a clone to stop at its next window
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
