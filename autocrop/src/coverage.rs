//! Canvas coverage under union or intersection semantics.

use common::{BitBuffer2, CancelToken};

use crate::config::CoverageMode;
use crate::footprint::Footprint;
use crate::rect::Canvas;
use crate::stacks::{singleton_stacks, Stack};

/// Memo of pixels whose coverage has already been evaluated.
///
/// Two bit planes give the three states untested / covered / uncovered.
/// Once a pixel is tested its answer never changes during a search.
#[derive(Debug, Clone)]
pub struct PixelTestCache {
    tested: BitBuffer2,
    covered: BitBuffer2,
    /// Every pixel has been tested.
    complete: bool,
}

impl PixelTestCache {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            tested: BitBuffer2::new_default(canvas.width, canvas.height),
            covered: BitBuffer2::new_default(canvas.width, canvas.height),
            complete: false,
        }
    }

    /// A cache holding an already rasterized coverage bitmap.
    pub fn from_bitmap(covered: BitBuffer2) -> Self {
        Self {
            tested: BitBuffer2::new_filled(covered.width(), covered.height(), true),
            covered,
            complete: true,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        if self.complete || self.tested.get_xy(x, y) {
            Some(self.covered.get_xy(x, y))
        } else {
            None
        }
    }

    #[inline]
    pub fn insert(&mut self, x: usize, y: usize, covered: bool) {
        self.tested.set_xy(x, y, true);
        self.covered.set_xy(x, y, covered);
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Number of pixels tested so far.
    pub fn tested_count(&self) -> usize {
        self.tested.count_ones()
    }

    pub fn covered_bitmap(&self) -> &BitBuffer2 {
        &self.covered
    }
}

/// Answers "is pixel (x, y) covered?" for a fixed set of footprints.
///
/// Footprints are only borrowed. Answers are memoized in a
/// [`PixelTestCache`], which is why queries take `&mut self`.
pub struct CoverageSampler<'a, F: Footprint> {
    footprints: &'a [F],
    mode: CoverageMode,
    stacks: Vec<Stack>,
    canvas: Canvas,
    cache: PixelTestCache,
    evaluations: u64,
}

impl<'a, F: Footprint> CoverageSampler<'a, F> {
    /// Sampler over `footprints`.
    ///
    /// `stacks` only matter in intersection mode. Empty `stacks` there means
    /// every image is its own stack. Stack members must index `footprints`.
    pub fn new(canvas: Canvas, footprints: &'a [F], mode: CoverageMode, stacks: &[Stack]) -> Self {
        let stacks = match mode {
            CoverageMode::Union => Vec::new(),
            CoverageMode::Intersection if stacks.is_empty() => singleton_stacks(footprints.len()),
            CoverageMode::Intersection => stacks.to_vec(),
        };
        debug_assert!(stacks.iter().flatten().all(|&i| i < footprints.len()));

        Self {
            footprints,
            mode,
            stacks,
            canvas,
            cache: PixelTestCache::new(canvas),
            evaluations: 0,
        }
    }

    #[inline]
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    #[inline]
    pub fn mode(&self) -> CoverageMode {
        self.mode
    }

    /// Number of pixels whose coverage was computed from the footprints.
    #[inline]
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    pub fn cache(&self) -> &PixelTestCache {
        &self.cache
    }

    /// Whether the pixel is covered, memoized.
    #[inline]
    pub fn is_covered(&mut self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.canvas.width && y < self.canvas.height);
        if let Some(covered) = self.cache.get(x, y) {
            return covered;
        }
        let covered = evaluate(self.footprints, self.mode, &self.stacks, x, y);
        self.evaluations += 1;
        self.cache.insert(x, y, covered);
        covered
    }

    /// Evaluate every pixel of the canvas up front, rows in parallel.
    ///
    /// Returns `false` without touching the cache if `cancel` fires while
    /// rasterizing.
    pub fn rasterize(&mut self, cancel: &CancelToken) -> bool {
        let footprints = self.footprints;
        let mode = self.mode;
        let stacks = &self.stacks;

        let bitmap = BitBuffer2::from_fn(self.canvas.width, self.canvas.height, |x, y| {
            !cancel.is_cancelled() && evaluate(footprints, mode, stacks, x, y)
        });
        if cancel.is_cancelled() {
            return false;
        }

        self.evaluations += self.canvas.area();
        self.cache = PixelTestCache::from_bitmap(bitmap);
        true
    }

    /// First uncovered pixel in row `y` within columns `x_start..x_end`.
    pub fn first_uncovered_in_row(&mut self, y: usize, x_start: usize, x_end: usize) -> Option<usize> {
        if self.cache.is_complete() {
            return self.cache.covered_bitmap().first_unset_in_row(y, x_start, x_end);
        }
        (x_start..x_end).find(|&x| !self.is_covered(x, y))
    }

    /// First covered pixel in row `y` within columns `x_start..x_end`.
    pub fn first_covered_in_row(&mut self, y: usize, x_start: usize, x_end: usize) -> Option<usize> {
        if self.cache.is_complete() {
            return self.cache.covered_bitmap().first_set_in_row(y, x_start, x_end);
        }
        (x_start..x_end).find(|&x| self.is_covered(x, y))
    }

    /// First covered pixel in column `x` within rows `y_start..y_end`.
    pub fn first_covered_in_column(&mut self, x: usize, y_start: usize, y_end: usize) -> Option<usize> {
        (y_start..y_end).find(|&y| self.is_covered(x, y))
    }

    /// First uncovered pixel in column `x` within rows `y_start..y_end`.
    pub fn first_uncovered_in_column(&mut self, x: usize, y_start: usize, y_end: usize) -> Option<usize> {
        (y_start..y_end).find(|&y| !self.is_covered(x, y))
    }

    /// Longest run of covered pixels in row `y` within `x_start..x_end`, as
    /// a half-open column range. The leftmost one wins ties.
    pub fn longest_covered_run_in_row(
        &mut self,
        y: usize,
        x_start: usize,
        x_end: usize,
    ) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        let mut x = x_start;
        while let Some(start) = self.first_covered_in_row(y, x, x_end) {
            let end = self.first_uncovered_in_row(y, start, x_end).unwrap_or(x_end);
            if best.is_none_or(|(left, right)| end - start > right - left) {
                best = Some((start, end));
            }
            x = end;
        }
        best
    }

    /// Whether row `y` holds `len` consecutive covered pixels within
    /// `x_start..x_end`.
    pub fn has_covered_run_in_row(&mut self, y: usize, x_start: usize, x_end: usize, len: usize) -> bool {
        let mut start = x_start;
        while start + len <= x_end {
            // Checking each window from its far end skips `len` pixels per
            // uncovered hit.
            match (start..start + len).rev().find(|&x| !self.is_covered(x, y)) {
                None => return true,
                Some(x) => start = x + 1,
            }
        }
        false
    }

    /// Whether column `x` holds `len` consecutive covered pixels within
    /// `y_start..y_end`.
    pub fn has_covered_run_in_column(&mut self, x: usize, y_start: usize, y_end: usize, len: usize) -> bool {
        let mut start = y_start;
        while start + len <= y_end {
            match (start..start + len).rev().find(|&y| !self.is_covered(x, y)) {
                None => return true,
                Some(y) => start = y + 1,
            }
        }
        false
    }
}

/// Coverage of one pixel, straight from the footprints.
fn evaluate<F: Footprint>(
    footprints: &[F],
    mode: CoverageMode,
    stacks: &[Stack],
    x: usize,
    y: usize,
) -> bool {
    if footprints.is_empty() {
        return false;
    }
    match mode {
        CoverageMode::Union => footprints.iter().any(|f| f.covers(x, y)),
        CoverageMode::Intersection => stacks
            .iter()
            .all(|stack| stack.iter().any(|&i| footprints[i].covers(x, y))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::RectFootprint;
    use crate::rect::CropRect;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn two_overlapping() -> [RectFootprint; 2] {
        [
            RectFootprint(CropRect::new(0, 0, 60, 50)),
            RectFootprint(CropRect::new(40, 0, 100, 50)),
        ]
    }

    #[test]
    fn test_union_covers_either_image() {
        let footprints = two_overlapping();
        let mut sampler =
            CoverageSampler::new(Canvas::new(100, 50), &footprints, CoverageMode::Union, &[]);
        assert!(sampler.is_covered(0, 0));
        assert!(sampler.is_covered(50, 10));
        assert!(sampler.is_covered(99, 49));
    }

    #[test]
    fn test_intersection_needs_every_image() {
        let footprints = two_overlapping();
        let mut sampler = CoverageSampler::new(
            Canvas::new(100, 50),
            &footprints,
            CoverageMode::Intersection,
            &[],
        );
        assert!(!sampler.is_covered(39, 0));
        assert!(sampler.is_covered(40, 0));
        assert!(sampler.is_covered(59, 49));
        assert!(!sampler.is_covered(60, 49));
    }

    #[test]
    fn test_stack_members_substitute_for_each_other() {
        // Images 0 and 1 form one bracket, image 2 is alone.
        let footprints = [
            RectFootprint(CropRect::new(0, 0, 50, 10)),
            RectFootprint(CropRect::new(50, 0, 100, 10)),
            RectFootprint(CropRect::new(20, 0, 80, 10)),
        ];
        let stacks = vec![vec![0, 1], vec![2]];
        let mut sampler = CoverageSampler::new(
            Canvas::new(100, 10),
            &footprints,
            CoverageMode::Intersection,
            &stacks,
        );
        assert!(sampler.is_covered(20, 5));
        assert!(sampler.is_covered(79, 5));
        assert!(!sampler.is_covered(19, 5));
        assert!(!sampler.is_covered(80, 5));
    }

    #[test]
    fn test_no_footprints_means_nothing_covered() {
        let footprints: [RectFootprint; 0] = [];
        for mode in [CoverageMode::Union, CoverageMode::Intersection] {
            let mut sampler = CoverageSampler::new(Canvas::new(4, 4), &footprints, mode, &[]);
            assert!(!sampler.is_covered(1, 1), "{mode:?}");
        }
    }

    #[test]
    fn test_memoizes_each_pixel_once() {
        let calls = AtomicUsize::new(0);
        let footprint = |x: usize, _y: usize| {
            calls.fetch_add(1, Ordering::Relaxed);
            x < 3
        };
        let footprints = [footprint];
        let mut sampler =
            CoverageSampler::new(Canvas::new(8, 2), &footprints, CoverageMode::Union, &[]);

        for _ in 0..3 {
            assert!(sampler.is_covered(2, 1));
            assert!(!sampler.is_covered(5, 1));
        }
        assert_eq!(calls.load(Ordering::Relaxed), 2);
        assert_eq!(sampler.evaluations(), 2);
        assert_eq!(sampler.cache().tested_count(), 2);
    }

    #[test]
    fn test_row_scans_agree_between_lazy_and_rasterized() {
        let footprints = [|x: usize, y: usize| (x * 7 + y * 3) % 5 != 0];
        let canvas = Canvas::new(150, 6);
        let mut lazy = CoverageSampler::new(canvas, &footprints, CoverageMode::Union, &[]);
        let mut eager = CoverageSampler::new(canvas, &footprints, CoverageMode::Union, &[]);
        assert!(eager.rasterize(&CancelToken::new()));
        assert!(eager.cache().is_complete());

        for y in 0..canvas.height {
            for start in [0, 1, 63, 64, 100] {
                assert_eq!(
                    lazy.first_uncovered_in_row(y, start, canvas.width),
                    eager.first_uncovered_in_row(y, start, canvas.width),
                    "uncovered scan of row {y} from {start}"
                );
                assert_eq!(
                    lazy.first_covered_in_row(y, start, canvas.width),
                    eager.first_covered_in_row(y, start, canvas.width),
                    "covered scan of row {y} from {start}"
                );
            }
        }
    }

    #[test]
    fn test_rasterize_honours_cancellation() {
        let footprints = [RectFootprint(CropRect::new(0, 0, 10, 10))];
        let mut sampler =
            CoverageSampler::new(Canvas::new(10, 10), &footprints, CoverageMode::Union, &[]);
        let cancel = CancelToken::new();
        cancel.cancel();

        assert!(!sampler.rasterize(&cancel));
        assert!(!sampler.cache().is_complete());
        assert_eq!(sampler.evaluations(), 0);
    }

    #[test]
    fn test_covered_runs() {
        // Row 0: covered at 2..5 and 7..13. Column 3: covered at 0..4.
        let footprints = [|x: usize, y: usize| {
            (y == 0 && ((2..5).contains(&x) || (7..13).contains(&x)))
                || (x == 3 && (1..4).contains(&y))
        }];
        let mut sampler =
            CoverageSampler::new(Canvas::new(16, 8), &footprints, CoverageMode::Union, &[]);

        assert_eq!(sampler.longest_covered_run_in_row(0, 0, 16), Some((7, 13)));
        assert_eq!(sampler.longest_covered_run_in_row(0, 0, 9), Some((2, 5)));
        assert_eq!(sampler.longest_covered_run_in_row(5, 0, 16), None);

        assert!(sampler.has_covered_run_in_row(0, 0, 16, 6));
        assert!(!sampler.has_covered_run_in_row(0, 0, 16, 7));
        assert!(!sampler.has_covered_run_in_row(0, 8, 16, 6));
        assert!(sampler.has_covered_run_in_row(0, 0, 16, 0));

        assert!(sampler.has_covered_run_in_column(3, 0, 8, 4));
        assert!(!sampler.has_covered_run_in_column(3, 0, 8, 5));
        assert!(!sampler.has_covered_run_in_column(3, 2, 8, 4));
        assert_eq!(sampler.first_uncovered_in_column(3, 0, 8), Some(4));
        assert_eq!(sampler.first_uncovered_in_column(3, 1, 4), None);
    }

    #[test]
    fn test_first_covered_in_column() {
        let footprints = [RectFootprint(CropRect::new(3, 4, 5, 9))];
        let mut sampler =
            CoverageSampler::new(Canvas::new(10, 10), &footprints, CoverageMode::Union, &[]);
        assert_eq!(sampler.first_covered_in_column(3, 0, 10), Some(4));
        assert_eq!(sampler.first_covered_in_column(5, 0, 10), None);
        assert_eq!(sampler.first_covered_in_column(4, 5, 10), Some(5));
    }
}
