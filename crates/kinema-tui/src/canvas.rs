//! A braille-dot terminal canvas.
//!
//! Each terminal cell holds a 2×4 grid of braille dots. Renderers draw in a
//! virtual pixel space [`PIXELS_PER_DOT`] times finer than the dot grid, so
//! marker radii and dash lengths tuned for an 800×600 canvas still read
//! sensibly in a terminal. Text is laid over the dots cell by cell.

use crossterm::style::{self, Stylize};
use kinema::{Color, PixelPoint, Stroke, Surface, Viewport};
use unicode_width::UnicodeWidthChar;

/// Virtual pixels per braille dot, on both axes.
pub const PIXELS_PER_DOT: f64 = 4.0;

const DOTS_X: usize = 2;
const DOTS_Y: usize = 4;
const BRAILLE_BASE: u32 = 0x2800;

/// Segments longer than this many dots are not drawn.
const MAX_LINE_DOTS: i64 = 1 << 15;

/// Bit for the dot at column `dx`, row `dy` of a cell.
const fn dot_bit(dx: usize, dy: usize) -> u8 {
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (0, 3) => 0x40,
        _ => 0x80,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Glyph {
    Char(char, Color),
    /// Right half of a double-width character.
    Tail,
}

/// Braille canvas covering `cols × rows` terminal cells.
#[derive(Debug, Clone)]
pub struct BrailleCanvas {
    cols: usize,
    rows: usize,
    background: Color,
    dots: Vec<u8>,
    colors: Vec<Option<Color>>,
    glyphs: Vec<Option<Glyph>>,
}

impl BrailleCanvas {
    /// Creates an empty canvas.
    pub fn new(cols: u16, rows: u16) -> Self {
        let cols = usize::from(cols.max(1));
        let rows = usize::from(rows.max(1));
        let cells = cols * rows;
        Self {
            cols,
            rows,
            background: Color::hex(0),
            dots: vec![0; cells],
            colors: vec![None; cells],
            glyphs: vec![None; cells],
        }
    }

    /// Columns.
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Rows.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// A viewport covering the whole canvas with `padding` virtual pixels.
    pub fn viewport(&self, padding: f64) -> Viewport {
        let (w, h) = self.size();
        Viewport::new(w, h, padding)
    }

    /// Whether the cell at (`col`, `row`) has any dot set.
    pub fn has_dots(&self, col: usize, row: usize) -> bool {
        col < self.cols && row < self.rows && self.dots[row * self.cols + col] != 0
    }

    /// Number of dots set across the canvas.
    pub fn dot_count(&self) -> u32 {
        self.dots.iter().map(|d| d.count_ones()).sum()
    }

    fn plot(&mut self, dx: i64, dy: i64, color: Color) {
        let (Ok(dx), Ok(dy)) = (usize::try_from(dx), usize::try_from(dy)) else {
            return;
        };
        let (col, row) = (dx / DOTS_X, dy / DOTS_Y);
        if col >= self.cols || row >= self.rows {
            return;
        }
        let cell = row * self.cols + col;
        let color = self.blend(color);
        self.dots[cell] |= dot_bit(dx % DOTS_X, dy % DOTS_Y);
        self.colors[cell] = Some(color);
    }

    /// Flattens translucent colors onto the background.
    fn blend(&self, color: Color) -> Color {
        if color.a == 0xFF {
            return color;
        }
        let a = u16::from(color.a);
        let mix = |fg: u8, bg: u8| -> u8 {
            let v = (u16::from(fg) * a + u16::from(bg) * (255 - a)) / 255;
            u8::try_from(v).unwrap_or(u8::MAX)
        };
        let bg = self.background;
        Color {
            r: mix(color.r, bg.r),
            g: mix(color.g, bg.g),
            b: mix(color.b, bg.b),
            a: 0xFF,
        }
    }

    /// Canvas lines, optionally colored with ANSI escapes.
    pub fn lines(&self, color: bool) -> Vec<String> {
        (0..self.rows).map(|row| self.line_at(row, color)).collect()
    }

    /// Canvas as one string, rows joined by newlines.
    pub fn render(&self, color: bool) -> String {
        self.lines(color).join("\n")
    }

    fn line_at(&self, row: usize, color: bool) -> String {
        let mut out = String::new();
        let mut run = String::new();
        let mut run_color: Option<Color> = None;

        for col in 0..self.cols {
            let cell = row * self.cols + col;
            let (ch, fg) = match self.glyphs[cell] {
                Some(Glyph::Tail) => continue,
                Some(Glyph::Char(c, fg)) => (c, Some(fg)),
                None if self.dots[cell] == 0 => (' ', None),
                None => (
                    char::from_u32(BRAILLE_BASE + u32::from(self.dots[cell])).unwrap_or(' '),
                    self.colors[cell],
                ),
            };

            if color && fg != run_color && ch != ' ' {
                flush_run(&mut out, &mut run, run_color);
                run_color = fg;
            }
            run.push(ch);
        }
        flush_run(&mut out, &mut run, if color { run_color } else { None });
        out
    }
}

fn flush_run(out: &mut String, run: &mut String, color: Option<Color>) {
    if run.is_empty() {
        return;
    }
    match color {
        Some(c) => {
            let styled = style::style(run.as_str()).with(style::Color::Rgb {
                r: c.r,
                g: c.g,
                b: c.b,
            });
            out.push_str(&styled.to_string());
        }
        None => out.push_str(run),
    }
    run.clear();
}

fn to_dot(v: f64) -> i64 {
    // Saturating float-to-int cast; off-canvas values are clipped in `plot`.
    (v / PIXELS_PER_DOT).floor() as i64
}

impl Surface for BrailleCanvas {
    fn size(&self) -> (f64, f64) {
        (
            (self.cols * DOTS_X) as f64 * PIXELS_PER_DOT,
            (self.rows * DOTS_Y) as f64 * PIXELS_PER_DOT,
        )
    }

    fn clear(&mut self, color: Color) {
        self.background = color;
        self.dots.fill(0);
        self.colors.fill(None);
        self.glyphs.fill(None);
    }

    fn line(&mut self, from: PixelPoint, to: PixelPoint, stroke: Stroke) {
        let (mut x, mut y) = (to_dot(from.x), to_dot(from.y));
        let (x1, y1) = (to_dot(to.x), to_dot(to.y));
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        if dx > MAX_LINE_DOTS || -dy > MAX_LINE_DOTS {
            return;
        }
        let mut err = dx + dy;
        let mut travelled = 0.0;

        loop {
            let on = stroke.dash.is_none_or(|(on, off)| {
                let period = on + off;
                period <= 0.0 || travelled % period < on
            });
            if on {
                self.plot(x, y, stroke.color);
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            travelled += PIXELS_PER_DOT;
        }
    }

    fn circle(&mut self, center: PixelPoint, radius: f64, fill: Color) {
        let r = (radius / PIXELS_PER_DOT).max(0.5);
        let cx = center.x / PIXELS_PER_DOT;
        let cy = center.y / PIXELS_PER_DOT;
        let reach = r.ceil() as i64;
        let (x0, y0) = (cx.floor() as i64, cy.floor() as i64);

        for y in (y0 - reach)..=(y0 + reach) {
            for x in (x0 - reach)..=(x0 + reach) {
                let ddx = x as f64 + 0.5 - cx;
                let ddy = y as f64 + 0.5 - cy;
                if ddx * ddx + ddy * ddy <= r * r {
                    self.plot(x, y, fill);
                }
            }
        }
        // always visible, however small
        self.plot(x0, y0, fill);
    }

    fn text(&mut self, at: PixelPoint, text: &str, color: Color) {
        let cell_w = DOTS_X as f64 * PIXELS_PER_DOT;
        let cell_h = DOTS_Y as f64 * PIXELS_PER_DOT;
        let row = ((at.y - 1.0) / cell_h).floor();
        if row < 0.0 || row >= self.rows as f64 {
            return;
        }
        let row = row as usize;
        let mut col = (at.x / cell_w).floor() as i64;
        let color = self.blend(color);

        for ch in text.chars() {
            let width = ch.width().unwrap_or(0);
            if width == 0 {
                continue;
            }
            let fits = col >= 0 && (col as usize) + width <= self.cols;
            if fits {
                let cell = row * self.cols + col as usize;
                self.glyphs[cell] = Some(Glyph::Char(ch, color));
                if width == 2 {
                    self.glyphs[cell + 1] = Some(Glyph::Tail);
                }
            }
            col += width as i64;
        }
    }
}
