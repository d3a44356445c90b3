//! Frame rendering.
//!
//! - [`SpaceRenderer`] draws the moving object for one cursor position
//! - [`GraphRenderer`] draws the static value-vs-time chart
//! - [`Stage`] owns both for one mounted scenario and decides which exist

mod graph;
mod space;
mod stage;

pub use graph::GraphRenderer;
pub use space::{GRID_DIVISIONS, MARKER_RADIUS, SpaceRenderer};
pub use stage::{Layout, Stage};

use crate::surface::{PixelPoint, Stroke, Surface};
use crate::viewport::Viewport;

/// Draws `divisions` x `divisions` cells spanning the padded area.
pub(crate) fn draw_grid<S: Surface + ?Sized>(
    surface: &mut S,
    viewport: &Viewport,
    divisions: usize,
    stroke: Stroke,
) {
    let left = viewport.padding;
    let top = viewport.padding;
    let right = left + viewport.inner_width();
    let bottom = top + viewport.inner_height();
    let n = divisions.max(1) as f64;

    for i in 0..=divisions {
        let f = i as f64 / n;
        let x = left + f * viewport.inner_width();
        surface.line(PixelPoint::new(x, top), PixelPoint::new(x, bottom), stroke);
        let y = top + f * viewport.inner_height();
        surface.line(PixelPoint::new(left, y), PixelPoint::new(right, y), stroke);
    }
}
