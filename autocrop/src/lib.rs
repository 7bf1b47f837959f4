//! Autocrop - optimal crop rectangles for stitched panoramas.
//!
//! Given the output canvas of a panorama and, for every active image, a test
//! telling whether a canvas pixel receives data from that image, this crate
//! finds:
//! - the largest axis-aligned rectangle containing only covered pixels
//!   (union of images, or intersection of images / exposure stacks)
//! - the tight bounding box of all covered pixels
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use autocrop::{Canvas, CropConfig, CropFinder, CropRect, RectFootprint};
//!
//! let footprints = [
//!     RectFootprint(CropRect::new(0, 0, 60, 50)),
//!     RectFootprint(CropRect::new(40, 0, 100, 50)),
//! ];
//! let report = CropFinder::new(Canvas::new(100, 50), &footprints)
//!     .with_config(CropConfig::intersection())
//!     .run()?;
//!
//! assert_eq!(report.outcome.rect(), Some(CropRect::new(40, 0, 60, 50)));
//! ```

mod config;
mod coverage;
mod crop_spec;
mod error;
mod finder;
mod footprint;
mod outside;
mod progress;
mod rect;
mod result;
mod search;
mod stacks;

// ============================================================================
// Geometry
// ============================================================================

pub use rect::{Canvas, CropRect};

// ============================================================================
// Coverage
// ============================================================================

pub use coverage::{CoverageSampler, PixelTestCache};
pub use footprint::{Footprint, MaskFootprint, ProjectedFootprint, RectFootprint};
pub use stacks::{singleton_stacks, stacks_from_groups, Stack};

// ============================================================================
// Search
// ============================================================================

pub use config::{CoverageMode, CropConfig, CropStrategy, Sampling};
pub use finder::{find_crop, CropFinder};
pub use progress::{ProgressCallback, SearchProgress, SearchStage};
pub use result::{SearchOutcome, SearchReport, SearchStats};

// ============================================================================
// Crop requests
// ============================================================================

pub use crop_spec::{AspectRatio, CropSpec};

pub use common::CancelToken;
pub use error::{Error, Result};
