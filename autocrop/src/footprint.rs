//! Per-image coverage tests on the output canvas.
//!
//! A footprint answers one question: does pixel (x, y) of the canvas map to
//! valid data in this image? The search never mutates footprints and never
//! looks at how they are computed.

use common::BitBuffer2;
use glam::{DMat3, DVec3};

use crate::rect::CropRect;

/// Coverage test of one input image on the output canvas.
///
/// Implementations must be deterministic: the same pixel always gives the
/// same answer for the lifetime of a search. Mixed footprint kinds can be
/// passed as `Box<dyn Fn(usize, usize) -> bool + Send + Sync>`.
pub trait Footprint: Sync {
    fn covers(&self, x: usize, y: usize) -> bool;
}

impl<F> Footprint for F
where
    F: Fn(usize, usize) -> bool + Sync,
{
    #[inline]
    fn covers(&self, x: usize, y: usize) -> bool {
        self(x, y)
    }
}

/// Footprint that is exactly an axis-aligned rectangle of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectFootprint(pub CropRect);

impl Footprint for RectFootprint {
    #[inline]
    fn covers(&self, x: usize, y: usize) -> bool {
        self.0.contains(x, y)
    }
}

/// Footprint given as a canvas-sized bitmap.
#[derive(Debug, Clone)]
pub struct MaskFootprint {
    mask: BitBuffer2,
}

impl MaskFootprint {
    pub fn new(mask: BitBuffer2) -> Self {
        Self { mask }
    }

    pub fn mask(&self) -> &BitBuffer2 {
        &self.mask
    }
}

impl Footprint for MaskFootprint {
    #[inline]
    fn covers(&self, x: usize, y: usize) -> bool {
        x < self.mask.width() && y < self.mask.height() && self.mask.get_xy(x, y)
    }
}

/// Footprint of a source image warped onto the canvas by a homography.
///
/// `canvas_to_source` maps homogeneous canvas coordinates to source image
/// coordinates. Pixels are sampled at their centres.
#[derive(Debug, Clone)]
pub struct ProjectedFootprint {
    canvas_to_source: DMat3,
    source_width: usize,
    source_height: usize,
    source_mask: Option<BitBuffer2>,
}

impl ProjectedFootprint {
    pub fn new(canvas_to_source: DMat3, source_width: usize, source_height: usize) -> Self {
        Self {
            canvas_to_source,
            source_width,
            source_height,
            source_mask: None,
        }
    }

    /// Source placed on the canvas with its top-left corner at `(dx, dy)`.
    pub fn translated(dx: f64, dy: f64, source_width: usize, source_height: usize) -> Self {
        let source_to_canvas = DMat3::from_translation(glam::DVec2::new(dx, dy));
        Self::new(source_to_canvas.inverse(), source_width, source_height)
    }

    /// Build from the forward source-to-canvas mapping.
    ///
    /// Returns `None` if the mapping is not invertible.
    pub fn from_source_to_canvas(
        source_to_canvas: DMat3,
        source_width: usize,
        source_height: usize,
    ) -> Option<Self> {
        let det = source_to_canvas.determinant();
        if !det.is_finite() || det.abs() < f64::EPSILON {
            return None;
        }
        Some(Self::new(
            source_to_canvas.inverse(),
            source_width,
            source_height,
        ))
    }

    /// Exclude masked-out source pixels.
    ///
    /// Returns `None` if the mask size differs from the source size.
    pub fn with_source_mask(mut self, mask: BitBuffer2) -> Option<Self> {
        if (mask.width(), mask.height()) != (self.source_width, self.source_height) {
            return None;
        }
        self.source_mask = Some(mask);
        Some(self)
    }

    /// Maps a canvas pixel centre into source coordinates.
    ///
    /// `None` when the point projects to infinity or behind the camera.
    pub fn project(&self, x: usize, y: usize) -> Option<(f64, f64)> {
        let p = self.canvas_to_source * DVec3::new(x as f64 + 0.5, y as f64 + 0.5, 1.0);
        if !(p.z > 0.0) {
            return None;
        }
        let sx = p.x / p.z;
        let sy = p.y / p.z;
        (sx.is_finite() && sy.is_finite()).then_some((sx, sy))
    }
}

impl Footprint for ProjectedFootprint {
    fn covers(&self, x: usize, y: usize) -> bool {
        let Some((sx, sy)) = self.project(x, y) else {
            return false;
        };
        if sx < 0.0 || sy < 0.0 {
            return false;
        }
        let (px, py) = (sx.floor() as usize, sy.floor() as usize);
        if px >= self.source_width || py >= self.source_height {
            return false;
        }
        self.source_mask
            .as_ref()
            .is_none_or(|mask| mask.get_xy(px, py))
    }
}
