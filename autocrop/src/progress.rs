//! Progress reporting for crop searches.

use std::sync::Arc;

/// Progress information for a crop search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProgress {
    pub stage: SearchStage,
    /// Units of work finished in the current stage: rows for rasterizing and
    /// bounding box scans, candidates for the rectangle search.
    pub processed: usize,
    /// Candidates still waiting in the queue.
    pub queued: usize,
    /// Area of the best fully covered rectangle found so far.
    pub best_area: u64,
    /// Largest area any remaining candidate could still reach.
    pub bound_area: u64,
}

/// Stage of a crop search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStage {
    /// Evaluating coverage for the whole canvas up front.
    Rasterizing,
    /// Locating the bounding box of covered pixels.
    BoundingBox,
    /// Branch-and-bound over candidate rectangles.
    Searching,
    Done,
}

/// Callback type for progress reporting.
pub type ProgressCallback = Option<Arc<dyn Fn(SearchProgress) + Send + Sync>>;

/// Report progress using the callback if set.
#[inline]
pub fn report_progress(callback: &ProgressCallback, progress: SearchProgress) {
    if let Some(f) = callback.as_ref() {
        f(progress);
    }
}

impl SearchProgress {
    pub(crate) fn stage(stage: SearchStage, processed: usize) -> Self {
        Self {
            stage,
            processed,
            queued: 0,
            best_area: 0,
            bound_area: 0,
        }
    }
}
