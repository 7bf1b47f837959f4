use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A flag one side raises to ask long-running work to stop.
///
/// Clones share the same flag. The worker polls `is_cancelled()` at points
/// where stopping leaves no partial state behind.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
