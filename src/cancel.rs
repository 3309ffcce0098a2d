//! Cooperative cancellation flag shared between the run surface and the pipeline.
//!
//! Cancellation is checked once per folder iteration, never mid-folder:
//! a request made while a model call is in flight takes effect only after
//! that call returns. The flag is therefore just a shared atomic, cloned
//! freely across tasks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cloneable cancellation signal.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag {
    inner: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Create a new, unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn request(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once cancellation has been requested.
    pub fn is_requested(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset() {
        let flag = CancelFlag::new();
        assert!(!flag.is_requested());
    }

    #[test]
    fn request_is_visible_through_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        clone.request();
        assert!(flag.is_requested());
        // Requesting again is harmless
        flag.request();
        assert!(clone.is_requested());
    }
}
