//! Entry point tying coverage, bounding box and rectangle search together.

use std::sync::Arc;

use common::CancelToken;

use crate::config::{CoverageMode, CropConfig, CropStrategy, Sampling};
use crate::coverage::CoverageSampler;
use crate::error::{Error, Result};
use crate::footprint::Footprint;
use crate::outside::bounding_box;
use crate::progress::{report_progress, ProgressCallback, SearchProgress, SearchStage};
use crate::rect::Canvas;
use crate::result::{SearchOutcome, SearchReport, SearchStats};
use crate::search::{maximal_rectangle, SearchContext};
use crate::stacks::{validate_stacks, Stack};

/// Finds the crop rectangle of a panorama canvas.
///
/// ```rust,ignore
/// let footprints = [RectFootprint(CropRect::new(10, 5, 90, 45))];
/// let report = CropFinder::new(Canvas::new(100, 50), &footprints).run()?;
/// assert_eq!(report.outcome.rect(), Some(CropRect::new(10, 5, 90, 45)));
/// ```
pub struct CropFinder<'a, F: Footprint> {
    canvas: Canvas,
    footprints: &'a [F],
    stacks: Vec<Stack>,
    config: CropConfig,
    progress: ProgressCallback,
    cancel: CancelToken,
}

impl<'a, F: Footprint> CropFinder<'a, F> {
    pub fn new(canvas: Canvas, footprints: &'a [F]) -> Self {
        Self {
            canvas,
            footprints,
            stacks: Vec::new(),
            config: CropConfig::default(),
            progress: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_config(mut self, config: CropConfig) -> Self {
        self.config = config;
        self
    }

    /// Exposure stacks for intersection coverage. Ignored in union mode.
    pub fn with_stacks(mut self, stacks: Vec<Stack>) -> Self {
        self.stacks = stacks;
        self
    }

    pub fn with_progress<P>(mut self, progress: P) -> Self
    where
        P: Fn(SearchProgress) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(progress));
        self
    }

    /// Token the caller can fire from another thread to stop the search.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    /// Runs the search.
    ///
    /// Errors only for input rejected before searching. Finding nothing
    /// and being cancelled are reported in [`SearchReport::outcome`].
    pub fn run(&self) -> Result<SearchReport> {
        self.config.validate();
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(Error::InvalidCanvas {
                width: self.canvas.width,
                height: self.canvas.height,
            });
        }
        validate_stacks(&self.stacks, self.footprints.len())?;
        if !self.stacks.is_empty() && self.config.coverage == CoverageMode::Union {
            tracing::debug!(
                "Ignoring {} stacks under union coverage",
                self.stacks.len()
            );
        }

        tracing::debug!(
            "Crop search on {}x{} canvas: {} images, {:?} coverage, {:?} strategy, {:?} sampling",
            self.canvas.width,
            self.canvas.height,
            self.footprints.len(),
            self.config.coverage,
            self.config.strategy,
            self.config.sampling
        );

        let mut stats = SearchStats::default();
        let outcome = self.search(&mut stats);

        report_progress(
            &self.progress,
            SearchProgress {
                stage: SearchStage::Done,
                processed: stats.candidates_processed,
                queued: 0,
                best_area: outcome.area(),
                bound_area: outcome.area(),
            },
        );
        tracing::info!(
            "Crop search {}: {} candidates, {} pixels evaluated",
            outcome,
            stats.candidates_processed,
            stats.pixels_evaluated
        );

        Ok(SearchReport { outcome, stats })
    }

    fn search(&self, stats: &mut SearchStats) -> SearchOutcome {
        if self.footprints.is_empty() {
            tracing::warn!("No active images, nothing covers the canvas");
            return SearchOutcome::NoCoverage;
        }

        let mut sampler = CoverageSampler::new(
            self.canvas,
            self.footprints,
            self.config.coverage,
            &self.stacks,
        );
        let ctx = SearchContext {
            cancel: &self.cancel,
            progress: &self.progress,
            progress_interval: self.config.progress_interval,
            border_stride: self.config.border_stride,
            candidate_budget: self.config.candidate_budget,
        };

        let outcome = self.search_with(&mut sampler, &ctx, stats);
        stats.pixels_evaluated = sampler.evaluations();
        outcome
    }

    fn search_with(
        &self,
        sampler: &mut CoverageSampler<'_, F>,
        ctx: &SearchContext<'_>,
        stats: &mut SearchStats,
    ) -> SearchOutcome {
        if self.config.sampling == Sampling::Eager {
            report_progress(
                &self.progress,
                SearchProgress::stage(SearchStage::Rasterizing, 0),
            );
            if !sampler.rasterize(&self.cancel) {
                tracing::info!("Crop search cancelled while rasterizing coverage");
                return SearchOutcome::Cancelled;
            }
            report_progress(
                &self.progress,
                SearchProgress::stage(SearchStage::Rasterizing, self.canvas.height),
            );
        }

        // Every covered rectangle lies inside the bounding box of coverage.
        let bounds = match bounding_box(sampler, ctx) {
            SearchOutcome::Found(bounds) => bounds,
            other => return other,
        };

        match self.config.strategy {
            CropStrategy::Outside => SearchOutcome::Found(bounds),
            CropStrategy::Inside => maximal_rectangle(sampler, bounds, ctx, stats),
        }
    }
}

/// Runs a crop search with default progress and cancellation handling.
pub fn find_crop<F: Footprint>(
    canvas: Canvas,
    footprints: &[F],
    config: CropConfig,
) -> Result<SearchOutcome> {
    CropFinder::new(canvas, footprints)
        .with_config(config)
        .run()
        .map(|report| report.outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::RectFootprint;
    use crate::rect::CropRect;
    use std::sync::Mutex;

    #[test]
    fn test_invalid_canvas_rejected() {
        let footprints = [RectFootprint(CropRect::new(0, 0, 1, 1))];
        for (w, h) in [(0, 10), (10, 0), (0, 0)] {
            assert_eq!(
                find_crop(Canvas::new(w, h), &footprints, CropConfig::default()),
                Err(Error::InvalidCanvas {
                    width: w,
                    height: h
                })
            );
        }
    }

    #[test]
    fn test_no_images_is_no_coverage() {
        let footprints: [RectFootprint; 0] = [];
        for config in [
            CropConfig::inside(),
            CropConfig::intersection(),
            CropConfig::outside(),
        ] {
            assert_eq!(
                find_crop(Canvas::new(20, 20), &footprints, config),
                Ok(SearchOutcome::NoCoverage)
            );
        }
    }

    #[test]
    fn test_bad_stack_member_rejected() {
        let footprints = [RectFootprint(CropRect::new(0, 0, 5, 5))];
        let result = CropFinder::new(Canvas::new(10, 10), &footprints)
            .with_config(CropConfig::intersection())
            .with_stacks(vec![vec![0, 1]])
            .run();
        assert_eq!(
            result,
            Err(Error::StackMemberOutOfRange {
                stack: 0,
                member: 1,
                image_count: 1
            })
        );
    }

    #[test]
    fn test_stacks_ignored_in_union_mode() {
        let footprints = [
            RectFootprint(CropRect::new(0, 0, 6, 10)),
            RectFootprint(CropRect::new(4, 0, 10, 10)),
        ];
        let outcome = CropFinder::new(Canvas::new(10, 10), &footprints)
            .with_stacks(vec![vec![0], vec![1]])
            .run()
            .unwrap()
            .outcome;
        assert_eq!(outcome, SearchOutcome::Found(CropRect::new(0, 0, 10, 10)));
    }

    #[test]
    fn test_outside_strategy_returns_bounds() {
        let footprints = [
            RectFootprint(CropRect::new(5, 5, 10, 10)),
            RectFootprint(CropRect::new(20, 2, 25, 7)),
        ];
        assert_eq!(
            find_crop(Canvas::new(40, 40), &footprints, CropConfig::outside()),
            Ok(SearchOutcome::Found(CropRect::new(5, 2, 25, 10)))
        );
    }

    #[test]
    fn test_lazy_and_eager_agree() {
        let footprints = [
            RectFootprint(CropRect::new(3, 1, 40, 20)),
            RectFootprint(CropRect::new(30, 8, 70, 33)),
        ];
        let canvas = Canvas::new(80, 40);
        for config in [
            CropConfig::inside(),
            CropConfig::intersection(),
            CropConfig::outside(),
        ] {
            let lazy = find_crop(canvas, &footprints, config.clone()).unwrap();
            let eager =
                find_crop(canvas, &footprints, config.with_sampling(Sampling::Eager)).unwrap();
            assert_eq!(lazy, eager);
        }
    }

    #[test]
    fn test_candidate_budget_does_not_change_the_crop() {
        // Staggered shots leave a ragged coverage edge.
        let footprints: Vec<_> = [(0, 30), (2, 33), (4, 32), (1, 31), (3, 30), (0, 33)]
            .into_iter()
            .enumerate()
            .map(|(i, (top, bottom))| RectFootprint(CropRect::new(i * 12, top, i * 12 + 20, bottom)))
            .collect();
        let canvas = Canvas::new(100, 40);

        let searched = CropFinder::new(canvas, &footprints).run().unwrap();
        let swept = CropFinder::new(canvas, &footprints)
            .with_config(CropConfig::inside().with_candidate_budget(0))
            .run()
            .unwrap();

        assert!(!searched.stats.swept);
        assert!(swept.stats.swept);
        assert_eq!(searched.outcome, swept.outcome);
        assert!(searched.outcome.rect().is_some());
    }

    #[test]
    fn test_eager_counts_every_pixel() {
        let footprints = [RectFootprint(CropRect::new(0, 0, 8, 8))];
        let report = CropFinder::new(Canvas::new(16, 8), &footprints)
            .with_config(CropConfig::inside().with_sampling(Sampling::Eager))
            .run()
            .unwrap();
        assert_eq!(report.stats.pixels_evaluated, 128);
        assert_eq!(report.outcome.rect(), Some(CropRect::new(0, 0, 8, 8)));
    }

    #[test]
    fn test_cancelled_before_start() {
        let footprints = [RectFootprint(CropRect::new(0, 0, 8, 8))];
        let cancel = CancelToken::new();
        cancel.cancel();
        for sampling in [Sampling::Lazy, Sampling::Eager] {
            let report = CropFinder::new(Canvas::new(16, 8), &footprints)
                .with_config(CropConfig::inside().with_sampling(sampling))
                .with_cancel_token(cancel.clone())
                .run()
                .unwrap();
            assert_eq!(report.outcome, SearchOutcome::Cancelled, "{sampling:?}");
        }
    }

    #[test]
    fn test_progress_ends_with_done() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stages);
        let footprints = [RectFootprint(CropRect::new(2, 2, 30, 30))];

        CropFinder::new(Canvas::new(32, 32), &footprints)
            .with_config(CropConfig::inside().with_sampling(Sampling::Eager))
            .with_progress(move |p| sink.lock().unwrap().push(p.stage))
            .run()
            .unwrap();

        let stages = stages.lock().unwrap();
        assert_eq!(stages.first(), Some(&SearchStage::Rasterizing));
        assert_eq!(stages.last(), Some(&SearchStage::Done));
    }
}
