//! Crop search configuration.

use serde::{Deserialize, Serialize};

/// How per-image footprints combine into canvas coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoverageMode {
    /// Covered if any image covers the pixel.
    #[default]
    Union,
    /// Covered if every stack has at least one member covering the pixel.
    /// Without explicit stacks every image is its own stack.
    Intersection,
}

/// Which rectangle the search looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CropStrategy {
    /// Largest rectangle containing only covered pixels.
    #[default]
    Inside,
    /// Smallest rectangle with no covered pixel outside it.
    Outside,
}

/// When coverage is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sampling {
    /// Test pixels on demand and memoize the answers.
    #[default]
    Lazy,
    /// Rasterize the whole canvas up front, rows in parallel.
    Eager,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropConfig {
    pub coverage: CoverageMode,
    pub strategy: CropStrategy,
    pub sampling: Sampling,
    /// Stride of the quick first pass over a candidate's border.
    /// A stride of 1 makes the quick pass exhaustive.
    pub border_stride: usize,
    /// Report progress every this many processed candidates.
    pub progress_interval: usize,
    /// Candidates the branch-and-bound search may process before it
    /// rasterizes the bounding box and sweeps it row by row instead.
    /// Both give the same rectangle.
    pub candidate_budget: usize,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            coverage: CoverageMode::Union,
            strategy: CropStrategy::Inside,
            sampling: Sampling::Lazy,
            border_stride: 8,
            progress_interval: 256,
            candidate_budget: 10_000,
        }
    }
}

impl CropConfig {
    /// Largest fully covered rectangle of the union of all images.
    pub fn inside() -> Self {
        Self::default()
    }

    /// Largest rectangle covered by every image (or every stack).
    pub fn intersection() -> Self {
        Self {
            coverage: CoverageMode::Intersection,
            ..Self::default()
        }
    }

    /// Bounding box of everything any image covers.
    pub fn outside() -> Self {
        Self {
            strategy: CropStrategy::Outside,
            ..Self::default()
        }
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_candidate_budget(mut self, candidate_budget: usize) -> Self {
        self.candidate_budget = candidate_budget;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) {
        assert!(self.border_stride > 0, "border_stride must be positive");
        assert!(
            self.progress_interval > 0,
            "progress_interval must be positive"
        );
    }
}
