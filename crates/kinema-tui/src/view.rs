//! Text layout helpers for the screen.

use crossterm::style::{self, Stylize};
use kinema::Color;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Colors `text` when `enabled`.
pub fn paint(text: &str, color: Color, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    style::style(text)
        .with(style::Color::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        })
        .to_string()
}

/// Bold, colored `text` when `enabled`.
pub fn strong(text: &str, color: Color, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    style::style(text)
        .with(style::Color::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        })
        .bold()
        .to_string()
}

/// Cuts `text` to at most `width` display columns, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// The last `width` display columns of `text`, for a scrolling input line.
pub fn tail(text: &str, width: usize) -> &str {
    let mut used = 0;
    let mut start = text.len();
    for (i, ch) in text.char_indices().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = i;
    }
    &text[start..]
}

/// Wraps `text` to `width` columns with a hanging `indent`.
pub fn wrap(text: &str, width: usize, indent: &str) -> Vec<String> {
    let options = textwrap::Options::new(width.max(8))
        .initial_indent(indent)
        .subsequent_indent(indent);
    textwrap::wrap(text, options)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

/// Places two equally tall blocks next to each other.
///
/// `left_width` is the display width every left line already has.
pub fn side_by_side(left: &[String], right: &[String], left_width: usize, gap: usize) -> Vec<String> {
    let rows = left.len().max(right.len());
    let blank = " ".repeat(left_width);
    (0..rows)
        .map(|i| {
            let l = left.get(i).map_or(blank.as_str(), String::as_str);
            let r = right.get(i).map_or("", String::as_str);
            format!("{l}{}{r}", " ".repeat(gap))
        })
        .collect()
}

/// A horizontal rule.
pub fn rule(width: usize) -> String {
    "─".repeat(width)
}
