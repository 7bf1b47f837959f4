//! Tight bounding box of all covered pixels.
//!
//! Scans inward from each canvas edge and stops at the first row or column
//! holding a covered pixel. Rows are scanned first, so the column scans only
//! look at rows between the found top and bottom.

use crate::coverage::CoverageSampler;
use crate::footprint::Footprint;
use crate::progress::{report_progress, SearchProgress, SearchStage};
use crate::rect::CropRect;
use crate::result::SearchOutcome;
use crate::search::SearchContext;

/// Marker for a scan interrupted by cancellation.
struct Cancelled;

/// Smallest rectangle with no covered pixel outside it.
pub(crate) fn bounding_box<F: Footprint>(
    sampler: &mut CoverageSampler<'_, F>,
    ctx: &SearchContext<'_>,
) -> SearchOutcome {
    match scan_bounds(sampler, ctx) {
        Ok(Some(rect)) => {
            tracing::debug!("Covered pixels span {}", rect);
            SearchOutcome::Found(rect)
        }
        Ok(None) => SearchOutcome::NoCoverage,
        Err(Cancelled) => SearchOutcome::Cancelled,
    }
}

fn scan_bounds<F: Footprint>(
    sampler: &mut CoverageSampler<'_, F>,
    ctx: &SearchContext<'_>,
) -> Result<Option<CropRect>, Cancelled> {
    let canvas = sampler.canvas();
    let mut scanned = 0usize;

    let mut row_has_coverage = |sampler: &mut CoverageSampler<'_, F>, y: usize| {
        if ctx.cancel.is_cancelled() {
            return Err(Cancelled);
        }
        scanned += 1;
        if scanned % ctx.progress_interval == 0 {
            report_progress(
                ctx.progress,
                SearchProgress::stage(SearchStage::BoundingBox, scanned),
            );
        }
        Ok(sampler.first_covered_in_row(y, 0, canvas.width).is_some())
    };

    let mut top = None;
    for y in 0..canvas.height {
        if row_has_coverage(sampler, y)? {
            top = Some(y);
            break;
        }
    }
    let Some(top) = top else {
        return Ok(None);
    };

    // Row `top` is covered, so this always finds a row.
    let mut bottom = top + 1;
    for y in (top..canvas.height).rev() {
        if row_has_coverage(sampler, y)? {
            bottom = y + 1;
            break;
        }
    }

    let mut column_has_coverage = |sampler: &mut CoverageSampler<'_, F>, x: usize| {
        if ctx.cancel.is_cancelled() {
            return Err(Cancelled);
        }
        Ok(sampler.first_covered_in_column(x, top, bottom).is_some())
    };

    let mut left = 0;
    for x in 0..canvas.width {
        if column_has_coverage(sampler, x)? {
            left = x;
            break;
        }
    }

    let mut right = left + 1;
    for x in (left..canvas.width).rev() {
        if column_has_coverage(sampler, x)? {
            right = x + 1;
            break;
        }
    }

    Ok(Some(CropRect::new(left, top, right, bottom)))
}
