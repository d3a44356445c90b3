//! The graph view: a static value-vs-time line chart.

use crate::model::GraphSeries;
use crate::surface::{Palette, PixelPoint, Stroke, Surface};
use crate::viewport::Viewport;

/// Ticks generated per axis when the series has none.
const AUTO_TICKS: usize = 5;

/// Approximate glyph width used to position labels.
const GLYPH_WIDTH: f64 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Domain {
    min: f64,
    max: f64,
}

impl Domain {
    fn covering(values: impl Iterator<Item = f64>) -> Self {
        let (min, max) = values
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min > max {
            return Self { min: 0.0, max: 1.0 };
        }
        Self { min, max }
    }

    fn span(self) -> f64 {
        let span = self.max - self.min;
        if span == 0.0 { 1.0 } else { span }
    }

    /// Position of `v` within the domain, 0 at `min` and 1 at `max`.
    fn unit(self, v: f64) -> f64 {
        (v - self.min) / self.span()
    }

    fn evenly_spaced(self, count: usize) -> Vec<f64> {
        let n = count.max(1) as f64;
        (0..=count)
            .map(|i| self.min + self.span() * i as f64 / n)
            .collect()
    }
}

/// Draws one graph series into one viewport.
#[derive(Debug, Clone)]
pub struct GraphRenderer {
    series: GraphSeries,
    viewport: Viewport,
    palette: Palette,
    time: Domain,
    value: Domain,
    time_ticks: Vec<f64>,
    value_ticks: Vec<f64>,
}

impl GraphRenderer {
    /// Mounts a renderer for `series` in `viewport`.
    pub fn new(series: &GraphSeries, viewport: Viewport) -> Self {
        let given = series.ticks.clone().unwrap_or_default();

        let time = Domain::covering(
            series
                .points
                .iter()
                .map(|p| p.time)
                .chain(given.x.iter().copied()),
        );
        let value = Domain::covering(
            series
                .points
                .iter()
                .map(|p| p.value)
                .chain(given.y.iter().copied()),
        );

        let time_ticks = if given.x.is_empty() {
            time.evenly_spaced(AUTO_TICKS)
        } else {
            given.x
        };
        let value_ticks = if given.y.is_empty() {
            value.evenly_spaced(AUTO_TICKS)
        } else {
            given.y
        };

        Self {
            series: series.clone(),
            viewport,
            palette: Palette::default(),
            time,
            value,
            time_ticks,
            value_ticks,
        }
    }

    /// Replaces the palette.
    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// The series being drawn.
    pub const fn series(&self) -> &GraphSeries {
        &self.series
    }

    /// Tick values used on the time axis.
    pub fn time_ticks(&self) -> &[f64] {
        &self.time_ticks
    }

    /// Tick values used on the value axis.
    pub fn value_ticks(&self) -> &[f64] {
        &self.value_ticks
    }

    /// Maps a (time, value) pair to a pixel.
    pub fn to_pixel(&self, time: f64, value: f64) -> PixelPoint {
        let vp = &self.viewport;
        PixelPoint::new(
            vp.padding + self.time.unit(time) * vp.inner_width(),
            vp.padding + vp.inner_height() - self.value.unit(value) * vp.inner_height(),
        )
    }

    /// Draws the whole chart.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        let palette = self.palette;
        let vp = self.viewport;
        let left = vp.padding;
        let top = vp.padding;
        let right = left + vp.inner_width();
        let bottom = top + vp.inner_height();

        surface.clear(palette.background);
        surface.text(
            PixelPoint::new(left, top / 2.0),
            self.series.kind.title(),
            palette.accent,
        );

        let grid = Stroke::dashed(palette.grid, 1.0, 3.0, 3.0);
        for &t in &self.time_ticks {
            let x = self.to_pixel(t, self.value.min).x;
            surface.line(PixelPoint::new(x, top), PixelPoint::new(x, bottom), grid);
            let label = format_tick(t);
            surface.text(
                PixelPoint::new(x - label_width(&label) / 2.0, bottom + 16.0),
                &label,
                palette.accent,
            );
        }
        for &v in &self.value_ticks {
            let y = self.to_pixel(self.time.min, v).y;
            surface.line(PixelPoint::new(left, y), PixelPoint::new(right, y), grid);
            let label = format_tick(v);
            surface.text(
                PixelPoint::new(left - label_width(&label) - 6.0, y + 4.0),
                &label,
                palette.accent,
            );
        }

        let axis = Stroke::solid(palette.axis, 1.0);
        surface.line(PixelPoint::new(left, bottom), PixelPoint::new(right, bottom), axis);
        surface.line(PixelPoint::new(left, top), PixelPoint::new(left, bottom), axis);

        surface.text(
            PixelPoint::new(
                left + vp.inner_width() / 2.0 - label_width(&self.series.x_label) / 2.0,
                bottom + 36.0,
            ),
            &self.series.x_label,
            palette.text,
        );
        surface.text(
            PixelPoint::new(left, top - 10.0),
            &self.series.y_label,
            palette.text,
        );

        let points: Vec<PixelPoint> = self
            .series
            .points
            .iter()
            .map(|p| self.to_pixel(p.time, p.value))
            .collect();
        surface.polyline(&points, Stroke::solid(palette.accent, 3.0));
        for p in points {
            surface.circle(p, 4.0, palette.axis);
        }
    }
}

fn label_width(label: &str) -> f64 {
    label.chars().count() as f64 * GLYPH_WIDTH
}

/// Formats a tick value: whole numbers without decimals, others with one.
fn format_tick(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{:.0}", v.round())
    } else {
        format!("{v:.1}")
    }
}
