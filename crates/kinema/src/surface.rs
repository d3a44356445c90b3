//! Drawing surfaces.
//!
//! Renderers draw through the [`Surface`] trait and never know what is
//! behind it. Two surfaces live here:
//!
//! - [`Recorder`] keeps every call as a [`DrawOp`], for tests and inspection
//! - [`SvgSurface`] writes an SVG document, for exporting frames
//!
//! The terminal front end adds a braille-dot canvas of its own.

use std::fmt::Write as _;

/// A position in pixel space (origin top-left, Y down).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PixelPoint {
    /// Column.
    pub x: f64,
    /// Row.
    pub y: f64,
}

impl PixelPoint {
    /// Creates a new pixel point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this point shifted by `(dx, dy)`.
    #[inline]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha, 255 is opaque.
    pub a: u8,
}

impl Color {
    /// Opaque color from a `0xRRGGBB` value.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
            a: 0xFF,
        }
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// CSS/SVG notation.
    pub fn to_css(self) -> String {
        if self.a == 0xFF {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({},{},{},{:.3})",
                self.r,
                self.g,
                self.b,
                f64::from(self.a) / 255.0
            )
        }
    }
}

/// Colors used by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Surface background.
    pub background: Color,
    /// Grid lines.
    pub grid: Color,
    /// Axes and secondary strokes.
    pub axis: Color,
    /// Trail and value line.
    pub accent: Color,
    /// Marker and primary text.
    pub text: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::hex(0x0021_3448),
            grid: Color::hex(0x0054_7792).with_alpha(0x44),
            axis: Color::hex(0x0054_7792),
            accent: Color::hex(0x0094_B4C1),
            text: Color::hex(0x00EA_E0CF),
        }
    }
}

/// How a line is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Line color.
    pub color: Color,
    /// Line width in pixels.
    pub width: f64,
    /// Dash pattern as (on, off) lengths, solid when `None`.
    pub dash: Option<(f64, f64)>,
}

impl Stroke {
    /// A solid stroke.
    pub const fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    /// A dashed stroke.
    pub const fn dashed(color: Color, width: f64, on: f64, off: f64) -> Self {
        Self {
            color,
            width,
            dash: Some((on, off)),
        }
    }
}

/// Anything a frame can be drawn onto.
pub trait Surface {
    /// Width and height in pixels.
    fn size(&self) -> (f64, f64);

    /// Wipes the surface with a background color.
    fn clear(&mut self, color: Color);

    /// Draws a straight segment.
    fn line(&mut self, from: PixelPoint, to: PixelPoint, stroke: Stroke);

    /// Draws connected segments through `points`.
    ///
    /// Fewer than two points draw nothing.
    fn polyline(&mut self, points: &[PixelPoint], stroke: Stroke) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], stroke);
        }
    }

    /// Draws a filled circle.
    fn circle(&mut self, center: PixelPoint, radius: f64, fill: Color);

    /// Draws text with its baseline starting at `at`.
    fn text(&mut self, at: PixelPoint, text: &str, color: Color);
}

/// A single recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// [`Surface::clear`].
    Clear(Color),
    /// [`Surface::line`].
    Line {
        /// Start.
        from: PixelPoint,
        /// End.
        to: PixelPoint,
        /// Stroke.
        stroke: Stroke,
    },
    /// [`Surface::polyline`] with at least two points.
    Polyline {
        /// Vertices.
        points: Vec<PixelPoint>,
        /// Stroke.
        stroke: Stroke,
    },
    /// [`Surface::circle`].
    Circle {
        /// Center.
        center: PixelPoint,
        /// Radius.
        radius: f64,
        /// Fill.
        fill: Color,
    },
    /// [`Surface::text`].
    Text {
        /// Baseline origin.
        at: PixelPoint,
        /// Content.
        text: String,
        /// Color.
        color: Color,
    },
}

/// A surface that records calls instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
}

impl Recorder {
    /// Creates an empty recorder of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    /// Every call so far, in order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Text drawn so far.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Polylines drawn so far.
    pub fn polylines(&self) -> Vec<&[PixelPoint]> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Polyline { points, .. } => Some(points.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Circle centers drawn so far.
    pub fn circles(&self) -> Vec<PixelPoint> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Circle { center, .. } => Some(*center),
                _ => None,
            })
            .collect()
    }

    /// Number of straight segments drawn with [`Surface::line`].
    pub fn line_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .count()
    }
}

impl Surface for Recorder {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear(color));
    }

    fn line(&mut self, from: PixelPoint, to: PixelPoint, stroke: Stroke) {
        self.ops.push(DrawOp::Line { from, to, stroke });
    }

    fn polyline(&mut self, points: &[PixelPoint], stroke: Stroke) {
        if points.len() < 2 {
            return;
        }
        self.ops.push(DrawOp::Polyline {
            points: points.to_vec(),
            stroke,
        });
    }

    fn circle(&mut self, center: PixelPoint, radius: f64, fill: Color) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            fill,
        });
    }

    fn text(&mut self, at: PixelPoint, text: &str, color: Color) {
        self.ops.push(DrawOp::Text {
            at,
            text: text.to_string(),
            color,
        });
    }
}

/// A surface that builds an SVG document.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    body: String,
}

impl SvgSurface {
    /// Creates an empty SVG of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    /// Returns the complete document.
    pub fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = self.width,
            h = self.height,
            body = self.body
        )
    }

    fn stroke_attrs(stroke: Stroke) -> String {
        let mut attrs = format!(
            "stroke=\"{}\" stroke-width=\"{}\"",
            stroke.color.to_css(),
            stroke.width
        );
        if let Some((on, off)) = stroke.dash {
            let _ = write!(attrs, " stroke-dasharray=\"{on} {off}\"");
        }
        attrs
    }
}

impl Surface for SvgSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        self.body.clear();
        let _ = writeln!(
            self.body,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            color.to_css()
        );
    }

    fn line(&mut self, from: PixelPoint, to: PixelPoint, stroke: Stroke) {
        let _ = writeln!(
            self.body,
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" {}/>",
            from.x,
            from.y,
            to.x,
            to.y,
            Self::stroke_attrs(stroke)
        );
    }

    fn polyline(&mut self, points: &[PixelPoint], stroke: Stroke) {
        if points.len() < 2 {
            return;
        }
        let coords: Vec<String> = points
            .iter()
            .map(|p| format!("{:.2},{:.2}", p.x, p.y))
            .collect();
        let _ = writeln!(
            self.body,
            "<polyline points=\"{}\" fill=\"none\" {}/>",
            coords.join(" "),
            Self::stroke_attrs(stroke)
        );
    }

    fn circle(&mut self, center: PixelPoint, radius: f64, fill: Color) {
        let _ = writeln!(
            self.body,
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{radius}\" fill=\"{}\"/>",
            center.x,
            center.y,
            fill.to_css()
        );
    }

    fn text(&mut self, at: PixelPoint, text: &str, color: Color) {
        let _ = writeln!(
            self.body,
            "<text x=\"{:.2}\" y=\"{:.2}\" fill=\"{}\" font-family=\"monospace\" font-size=\"12\">{}</text>",
            at.x,
            at.y,
            color.to_css(),
            escape_xml(text)
        );
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
