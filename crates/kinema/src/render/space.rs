//! The space view: where the object is now and where it has been.

use crate::model::{MotionTrack, SpaceMotion};
use crate::surface::{Palette, PixelPoint, Stroke, Surface};
use crate::viewport::{ViewTransform, Viewport};

use super::draw_grid;

/// Grid cells per side. Independent of the data range.
pub const GRID_DIVISIONS: usize = 10;

/// Marker radius in pixels.
pub const MARKER_RADIUS: f64 = 12.0;

/// Draws frames of one track into one viewport.
///
/// The transform is computed once when the view is mounted; drawing a frame
/// only needs the cursor.
#[derive(Debug, Clone)]
pub struct SpaceRenderer {
    object: String,
    track: MotionTrack,
    viewport: Viewport,
    transform: ViewTransform,
    palette: Palette,
}

impl SpaceRenderer {
    /// Mounts a renderer for `space` in `viewport`.
    pub fn new(space: &SpaceMotion, viewport: Viewport) -> Self {
        Self {
            object: space.object.clone(),
            transform: viewport.fit(space.motion.as_slice()),
            track: space.motion.clone(),
            viewport,
            palette: Palette::default(),
        }
    }

    /// Replaces the palette.
    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// The data-to-pixel transform.
    pub const fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    /// The viewport this renderer was mounted in.
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The track being drawn.
    pub const fn track(&self) -> &MotionTrack {
        &self.track
    }

    /// Pixel positions of samples `0..=cursor`.
    pub fn trail(&self, cursor: usize) -> Vec<PixelPoint> {
        let end = cursor.min(self.track.last_index());
        self.track.as_slice()[..=end]
            .iter()
            .map(|s| self.transform.to_pixel(s))
            .collect()
    }

    /// The three labels shown beside the marker.
    pub fn annotations(&self, cursor: usize) -> [String; 3] {
        let s = self.track.sample(cursor);
        [
            format!("This dot represents: {}", self.object),
            format!("t = {:.1}s", s.time),
            format!("pos = ({:.1}, {:.1})m", s.x, s.y),
        ]
    }

    /// Draws the frame for `cursor`, back to front.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, cursor: usize) {
        let palette = self.palette;
        surface.clear(palette.background);

        draw_grid(
            surface,
            &self.viewport,
            GRID_DIVISIONS,
            Stroke::solid(palette.grid, 1.0),
        );

        let trail = self.trail(cursor);
        surface.polyline(&trail, Stroke::dashed(palette.accent, 2.0, 5.0, 5.0));

        let marker = self.transform.to_pixel(&self.track.sample(cursor));
        surface.circle(marker, MARKER_RADIUS, palette.text);

        let [label, time, position] = self.annotations(cursor);
        surface.text(marker.offset(20.0, -25.0), &label, palette.text);
        surface.text(marker.offset(20.0, -5.0), &time, palette.accent);
        surface.text(marker.offset(20.0, 12.0), &position, palette.accent);
    }
}
