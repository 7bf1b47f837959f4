//! Axis-aligned crop rectangle in canvas pixel coordinates.

use serde::{Deserialize, Serialize};

use crate::crop_spec::AspectRatio;

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Canvas {
    pub width: usize,
    pub height: usize,
}

impl Canvas {
    #[inline]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// The rectangle covering the whole canvas.
    #[inline]
    pub const fn rect(&self) -> CropRect {
        CropRect::new(0, 0, self.width, self.height)
    }
}

/// Rectangle with half-open bounds.
///
/// A pixel at (x, y) is inside if `left <= x < right` and `top <= y < bottom`,
/// so `width = right - left` and `height = bottom - top`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRect {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

impl CropRect {
    #[inline]
    pub const fn new(left: usize, top: usize, right: usize, bottom: usize) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle from its top-left corner and size.
    #[inline]
    pub const fn from_origin_size(left: usize, top: usize, width: usize, height: usize) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    #[inline]
    pub const fn width(&self) -> usize {
        self.right.saturating_sub(self.left)
    }

    #[inline]
    pub const fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top)
    }

    /// Area in pixels. Zero for degenerate rectangles.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// True when the rectangle holds no pixel.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    #[inline]
    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Whether `other` lies completely inside this rectangle.
    #[inline]
    pub const fn contains_rect(&self, other: &CropRect) -> bool {
        other.left >= self.left
            && other.right <= self.right
            && other.top >= self.top
            && other.bottom <= self.bottom
    }

    /// Overlap of two rectangles, `None` if they share no pixel.
    pub fn intersect(&self, other: &CropRect) -> Option<CropRect> {
        let rect = CropRect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        (!rect.is_empty()).then_some(rect)
    }

    /// Clamp the rectangle to the canvas bounds.
    pub fn clip_to(&self, canvas: Canvas) -> CropRect {
        let right = self.right.min(canvas.width);
        let bottom = self.bottom.min(canvas.height);
        CropRect::new(self.left.min(right), self.top.min(bottom), right, bottom)
    }

    /// Largest rectangle with the given aspect ratio, centred inside this one.
    ///
    /// Sizes are rounded to whole pixels and never drop below one pixel, so a
    /// non-empty input always yields a non-empty result.
    pub fn fit_aspect(&self, ratio: AspectRatio) -> CropRect {
        if self.is_empty() {
            return *self;
        }
        let width = self.width();
        let height = self.height();
        let ratio = ratio.value();

        let (new_width, new_height) = if width as f64 / height as f64 > ratio {
            let w = (height as f64 * ratio).round() as usize;
            (w.clamp(1, width), height)
        } else {
            let h = (width as f64 / ratio).round() as usize;
            (width, h.clamp(1, height))
        };

        CropRect::from_origin_size(
            self.left + (width - new_width) / 2,
            self.top + (height - new_height) / 2,
            new_width,
            new_height,
        )
    }
}

impl std::fmt::Display for CropRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}) x [{}, {}) ({}x{})",
            self.left,
            self.right,
            self.top,
            self.bottom,
            self.width(),
            self.height()
        )
    }
}
