//! Exhaustive row sweep for the largest covered rectangle.
//!
//! Row by row, each column keeps the height of the covered run ending in
//! that row. The largest rectangle under that histogram comes from two
//! monotonic stacks giving, for each column, how far left and right the
//! bar's height holds. Every maximal covered rectangle shows up as one such
//! bar, so the best bar over all rows is the answer. The work is linear in
//! the area swept, independent of how fragmented the coverage is.

use common::CancelToken;

use super::Candidate;
use crate::coverage::CoverageSampler;
use crate::footprint::Footprint;
use crate::rect::CropRect;
use crate::result::SearchOutcome;

/// Largest covered rectangle inside `within`, ties broken as the heap does.
///
/// Rasterizes the whole canvas first unless that already happened.
pub(super) fn sweep_largest<F: Footprint>(
    sampler: &mut CoverageSampler<'_, F>,
    within: CropRect,
    cancel: &CancelToken,
) -> SearchOutcome {
    if !sampler.cache().is_complete() && !sampler.rasterize(cancel) {
        tracing::info!("Crop sweep cancelled while rasterizing");
        return SearchOutcome::Cancelled;
    }

    let width = within.width();
    let mut heights = vec![0usize; width];
    let mut left_limits = vec![0usize; width];
    let mut stack: Vec<usize> = Vec::with_capacity(width);
    let mut best: Option<Candidate> = None;

    for y in within.top..within.bottom {
        if cancel.is_cancelled() {
            tracing::info!("Crop sweep cancelled at row {}", y);
            return SearchOutcome::Cancelled;
        }

        for (i, height) in heights.iter_mut().enumerate() {
            *height = if sampler.is_covered(within.left + i, y) {
                *height + 1
            } else {
                0
            };
        }

        stack.clear();
        for i in 0..width {
            while stack.last().is_some_and(|&j| heights[j] >= heights[i]) {
                stack.pop();
            }
            left_limits[i] = stack.last().map_or(0, |&j| j + 1);
            stack.push(i);
        }

        stack.clear();
        for i in (0..width).rev() {
            while stack.last().is_some_and(|&j| heights[j] >= heights[i]) {
                stack.pop();
            }
            let right_limit = stack.last().copied().unwrap_or(width);
            stack.push(i);

            if heights[i] == 0 {
                continue;
            }
            let bar = Candidate::new(CropRect::new(
                within.left + left_limits[i],
                y + 1 - heights[i],
                within.left + right_limit,
                y + 1,
            ));
            if best.is_none_or(|best| bar > best) {
                best = Some(bar);
            }
        }
    }

    match best {
        Some(candidate) => {
            tracing::debug!(
                "Best crop {} (area {}) by sweep",
                candidate.rect,
                candidate.area
            );
            SearchOutcome::Found(candidate.rect)
        }
        None => SearchOutcome::NoCoverage,
    }
}
