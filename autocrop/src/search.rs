//! Largest fully covered rectangle by branch-and-bound.
//!
//! Candidates sit in a max-heap keyed by area, which is also the upper bound
//! of anything found inside them. A popped candidate is either fully covered
//! or has an uncovered pixel `p`. In the second case every covered rectangle
//! inside it avoids `p`, so it lies entirely left, right, above or below `p`,
//! and those four sub-rectangles replace the candidate.
//!
//! The first covered candidate popped is optimal: every covered rectangle is
//! contained in some queued candidate, and none of those is larger. Among
//! equal areas the heap pops the lowest `left`, then the lowest `top`, then
//! the widest, which makes the result canonical.
//!
//! Before the loop a covered rectangle grown from a few seed pixels gives a
//! floor. Candidates smaller than the floor are dropped, and every candidate
//! is tightened: an edge row or column without a covered run long enough to
//! reach the floor cannot belong to a rectangle that does, so it is cut off.
//! If the budget of candidates runs out anyway, the bounding box is swept
//! exhaustively.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use common::CancelToken;
use hashbrown::HashSet;

use crate::coverage::CoverageSampler;
use crate::footprint::Footprint;
use crate::progress::{report_progress, ProgressCallback, SearchProgress, SearchStage};
use crate::rect::CropRect;
use crate::result::{SearchOutcome, SearchStats};

mod lower_bound;
mod sweep;

use lower_bound::covered_lower_bound;
use sweep::sweep_largest;

/// Shared knobs of one search run.
pub(crate) struct SearchContext<'a> {
    pub cancel: &'a CancelToken,
    pub progress: &'a ProgressCallback,
    pub progress_interval: usize,
    pub border_stride: usize,
    pub candidate_budget: usize,
}

#[cfg(test)]
impl<'a> SearchContext<'a> {
    pub fn for_tests(cancel: &'a CancelToken) -> Self {
        static NO_PROGRESS: ProgressCallback = None;
        Self {
            cancel,
            progress: &NO_PROGRESS,
            progress_interval: 64,
            border_stride: 4,
            candidate_budget: usize::MAX,
        }
    }
}

/// Heap entry ordered by area, then canonical position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    rect: CropRect,
    area: u64,
}

impl Candidate {
    fn new(rect: CropRect) -> Self {
        Self {
            rect,
            area: rect.area(),
        }
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.area
            .cmp(&other.area)
            .then_with(|| other.rect.left.cmp(&self.rect.left))
            .then_with(|| other.rect.top.cmp(&self.rect.top))
            .then_with(|| self.rect.right.cmp(&other.rect.right))
            .then_with(|| self.rect.bottom.cmp(&other.rect.bottom))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Largest rectangle inside `seed` that contains only covered pixels.
pub(crate) fn maximal_rectangle<F: Footprint>(
    sampler: &mut CoverageSampler<'_, F>,
    seed: CropRect,
    ctx: &SearchContext<'_>,
    stats: &mut SearchStats,
) -> SearchOutcome {
    let floor = match covered_lower_bound(sampler, seed, ctx.cancel) {
        Some(hint) => {
            tracing::debug!("Covered lower bound {} (area {})", hint, hint.area());
            hint.area()
        }
        None => 0,
    };

    let mut queue = BinaryHeap::new();
    let mut queued: HashSet<CropRect> = HashSet::new();
    if let Some(start) = tighten(sampler, seed, floor) {
        queued.insert(start);
        queue.push(Candidate::new(start));
        stats.candidates_queued += 1;
    }

    while let Some(candidate) = queue.pop() {
        if ctx.cancel.is_cancelled() {
            tracing::info!(
                "Crop search cancelled after {} candidates",
                stats.candidates_processed
            );
            return SearchOutcome::Cancelled;
        }
        // Children are strictly smaller than their parent and parents pop
        // in non-increasing area, so a popped rectangle never comes back.
        queued.remove(&candidate.rect);

        if stats.candidates_processed >= ctx.candidate_budget {
            tracing::debug!(
                "Candidate budget of {} spent with {} queued, sweeping {}",
                ctx.candidate_budget,
                queue.len(),
                seed
            );
            stats.swept = true;
            return sweep_largest(sampler, seed, ctx.cancel);
        }

        stats.candidates_processed += 1;
        if stats.candidates_processed % ctx.progress_interval == 0 {
            report_progress(
                ctx.progress,
                SearchProgress {
                    stage: SearchStage::Searching,
                    processed: stats.candidates_processed,
                    queued: queue.len(),
                    best_area: floor,
                    bound_area: candidate.area,
                },
            );
        }

        let rect = candidate.rect;
        match find_uncovered(sampler, rect, ctx.border_stride) {
            None => {
                tracing::debug!("Best crop {} (area {})", rect, candidate.area);
                return SearchOutcome::Found(rect);
            }
            Some((x, y)) => {
                for child in split_around(rect, x, y) {
                    let Some(child) = tighten(sampler, child, floor) else {
                        continue;
                    };
                    if queued.insert(child) {
                        queue.push(Candidate::new(child));
                        stats.candidates_queued += 1;
                    }
                }
            }
        }
    }

    SearchOutcome::NoCoverage
}

/// Shrinks `rect` to the part that can still hold a covered rectangle of at
/// least `floor` pixels, or `None` if no such rectangle fits.
///
/// A covered rectangle of area `>= floor` inside `rect` is at least
/// `floor / rect.height()` wide. If it touches the top edge, the top row has a
/// covered run that long. Without one the row is cut, and likewise for the
/// other edges.
fn tighten<F: Footprint>(
    sampler: &mut CoverageSampler<'_, F>,
    mut rect: CropRect,
    floor: u64,
) -> Option<CropRect> {
    loop {
        if rect.is_empty() || rect.area() < floor {
            return None;
        }
        if floor == 0 {
            return Some(rect);
        }
        let min_width = floor.div_ceil(rect.height() as u64) as usize;
        let min_height = floor.div_ceil(rect.width() as u64) as usize;
        let (last_row, last_column) = (rect.bottom - 1, rect.right - 1);

        if !sampler.has_covered_run_in_row(rect.top, rect.left, rect.right, min_width) {
            rect.top += 1;
        } else if !sampler.has_covered_run_in_row(last_row, rect.left, rect.right, min_width) {
            rect.bottom -= 1;
        } else if !sampler.has_covered_run_in_column(rect.left, rect.top, rect.bottom, min_height) {
            rect.left += 1;
        } else if !sampler.has_covered_run_in_column(last_column, rect.top, rect.bottom, min_height) {
            rect.right -= 1;
        } else {
            return Some(rect);
        }
    }
}

/// The four largest sub-rectangles of `rect` that exclude pixel (x, y).
///
/// Degenerate pieces are dropped.
fn split_around(rect: CropRect, x: usize, y: usize) -> impl Iterator<Item = CropRect> {
    debug_assert!(rect.contains(x, y));
    [
        CropRect::new(rect.left, rect.top, x, rect.bottom),
        CropRect::new(x + 1, rect.top, rect.right, rect.bottom),
        CropRect::new(rect.left, rect.top, rect.right, y),
        CropRect::new(rect.left, y + 1, rect.right, rect.bottom),
    ]
    .into_iter()
    .filter(|child| !child.is_empty())
}

/// Some uncovered pixel of `rect`, or `None` if `rect` is fully covered.
///
/// Looks along the centre row and column first, nearest the centre, since
/// splitting there roughly halves the candidate. Then checks a strided
/// sample of the border, the whole border and finally the interior.
fn find_uncovered<F: Footprint>(
    sampler: &mut CoverageSampler<'_, F>,
    rect: CropRect,
    stride: usize,
) -> Option<(usize, usize)> {
    if let Some(pixel) = uncovered_near_centre(sampler, rect) {
        return Some(pixel);
    }

    let last_x = rect.right - 1;
    let last_y = rect.bottom - 1;

    for x in (rect.left..rect.right).step_by(stride).chain([last_x]) {
        if !sampler.is_covered(x, rect.top) {
            return Some((x, rect.top));
        }
        if !sampler.is_covered(x, last_y) {
            return Some((x, last_y));
        }
    }
    for y in (rect.top..rect.bottom).step_by(stride).chain([last_y]) {
        if !sampler.is_covered(rect.left, y) {
            return Some((rect.left, y));
        }
        if !sampler.is_covered(last_x, y) {
            return Some((last_x, y));
        }
    }

    for y in [rect.top, last_y] {
        if let Some(x) = sampler.first_uncovered_in_row(y, rect.left, rect.right) {
            return Some((x, y));
        }
    }
    for y in rect.top..rect.bottom {
        for x in [rect.left, last_x] {
            if !sampler.is_covered(x, y) {
                return Some((x, y));
            }
        }
    }

    for y in rect.top + 1..last_y {
        if let Some(x) = sampler.first_uncovered_in_row(y, rect.left + 1, last_x) {
            return Some((x, y));
        }
    }
    None
}

/// Uncovered pixel on the centre cross of `rect` closest to its centre.
fn uncovered_near_centre<F: Footprint>(
    sampler: &mut CoverageSampler<'_, F>,
    rect: CropRect,
) -> Option<(usize, usize)> {
    let cx = rect.left + (rect.width() - 1) / 2;
    let cy = rect.top + (rect.height() - 1) / 2;
    let reach = rect.width().max(rect.height());

    for d in 0..reach {
        let cross = [
            (cx.checked_sub(d), Some(cy)),
            (Some(cx + d), Some(cy)),
            (Some(cx), cy.checked_sub(d)),
            (Some(cx), Some(cy + d)),
        ];
        for (x, y) in cross {
            let (Some(x), Some(y)) = (x, y) else {
                continue;
            };
            if rect.contains(x, y) && !sampler.is_covered(x, y) {
                return Some((x, y));
            }
        }
    }
    None
}
