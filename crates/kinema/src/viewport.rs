//! Fitting motion data into a drawing area.
//!
//! Data space is meters with Y increasing upward. Pixel space has its origin
//! at the top-left with Y increasing downward. [`Viewport::fit`] computes one
//! uniform scale so the whole track, plus the origin and a default 10 m
//! extent, lands inside the padded rectangle without distorting the aspect
//! ratio.
//!
//! ```text
//!   (0,0) ┌───────────────────────┐
//!         │ padding               │
//!         │   ┌───────────────┐   │
//!         │   │ max_y         │   │
//!         │   │               │   │
//!         │   │ min_y   max_x │   │
//!         │   └───────────────┘   │
//!         └───────────────────────┘ (width, height)
//! ```

use serde::{Deserialize, Serialize};

use crate::model::MotionSample;
use crate::surface::PixelPoint;

/// Smallest extent every fitted axis covers, in meters from the origin.
pub const DEFAULT_SPAN: f64 = 10.0;

/// A fixed-size drawing area with uniform padding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Padding on every side, in pixels.
    pub padding: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            padding: 60.0,
        }
    }
}

impl Viewport {
    /// Creates a viewport.
    #[inline]
    pub const fn new(width: f64, height: f64, padding: f64) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    /// Drawable width inside the padding, never below one pixel.
    #[inline]
    pub fn inner_width(&self) -> f64 {
        (self.width - 2.0 * self.padding).max(1.0)
    }

    /// Drawable height inside the padding, never below one pixel.
    #[inline]
    pub fn inner_height(&self) -> f64 {
        (self.height - 2.0 * self.padding).max(1.0)
    }

    /// Whether a pixel lies inside the padded rectangle.
    pub fn contains_inner(&self, p: PixelPoint) -> bool {
        const EPS: f64 = 1e-9;
        p.x >= self.padding - EPS
            && p.x <= self.padding + self.inner_width() + EPS
            && p.y >= self.padding - EPS
            && p.y <= self.padding + self.inner_height() + EPS
    }

    /// Computes the transform that fits `samples` into this viewport.
    pub fn fit(&self, samples: &[MotionSample]) -> ViewTransform {
        let bounds = Bounds::of(samples);
        let scale = (self.inner_width() / bounds.range_x())
            .min(self.inner_height() / bounds.range_y());

        ViewTransform {
            bounds,
            scale,
            padding: self.padding,
            height: self.height,
        }
    }
}

/// Data-space extent of a set of samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Smallest x, at most 0.
    pub min_x: f64,
    /// Largest x, at least [`DEFAULT_SPAN`].
    pub max_x: f64,
    /// Smallest y, at most 0.
    pub min_y: f64,
    /// Largest y, at least [`DEFAULT_SPAN`].
    pub max_y: f64,
}

impl Bounds {
    /// Extent of `samples`, widened to include the origin and the default span.
    pub fn of(samples: &[MotionSample]) -> Self {
        samples.iter().fold(
            Self {
                min_x: 0.0,
                max_x: DEFAULT_SPAN,
                min_y: 0.0,
                max_y: DEFAULT_SPAN,
            },
            |b, s| Self {
                min_x: b.min_x.min(s.x),
                max_x: b.max_x.max(s.x),
                min_y: b.min_y.min(s.y),
                max_y: b.max_y.max(s.y),
            },
        )
    }

    /// Horizontal range, 1 when degenerate.
    pub fn range_x(&self) -> f64 {
        non_zero(self.max_x - self.min_x)
    }

    /// Vertical range, 1 when degenerate.
    pub fn range_y(&self) -> f64 {
        non_zero(self.max_y - self.min_y)
    }
}

fn non_zero(range: f64) -> f64 {
    if range == 0.0 { 1.0 } else { range }
}

/// Linear map from meters to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// The fitted data extent.
    pub bounds: Bounds,
    /// Pixels per meter, identical on both axes.
    pub scale: f64,
    padding: f64,
    height: f64,
}

impl ViewTransform {
    /// Maps a data x to a pixel column.
    #[inline]
    pub fn to_pixel_x(&self, value: f64) -> f64 {
        self.padding + (value - self.bounds.min_x) * self.scale
    }

    /// Maps a data y to a pixel row (flipped).
    #[inline]
    pub fn to_pixel_y(&self, value: f64) -> f64 {
        self.height - self.padding - (value - self.bounds.min_y) * self.scale
    }

    /// Maps a sample's position to a pixel.
    #[inline]
    pub fn to_pixel(&self, sample: &MotionSample) -> PixelPoint {
        PixelPoint::new(self.to_pixel_x(sample.x), self.to_pixel_y(sample.y))
    }
}
