//! Label measurement for static marker overlays
//!
//! Static renderers need a label's pixel box before drawing it, e.g. to
//! place it beside a marker without clipping. Sizes are estimated from the
//! display width of the text, so wide CJK glyphs take two cells.

use crate::core::constants::DEFAULT_LABEL_FONT_SIZE;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelStyle {
    /// Font size in pixels
    pub font_size: f64,
    /// Padding on every side of the text, in pixels
    pub padding: f64,
    /// Advance of one narrow cell relative to the font size
    pub char_width_ratio: f64,
    /// Line height relative to the font size
    pub line_height_ratio: f64,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_LABEL_FONT_SIZE,
            padding: 4.0,
            char_width_ratio: 0.6,
            line_height_ratio: 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelSize {
    pub width: f64,
    pub height: f64,
}

/// Pixel box of `text` rendered with `style`, padding included.
///
/// Multi-line text takes the widest line. An empty label is just the padding.
pub fn measure_label(text: &str, style: &LabelStyle) -> LabelSize {
    let cell = style.font_size * style.char_width_ratio;
    let line_height = style.font_size * style.line_height_ratio;

    let (cells, lines) = if text.is_empty() {
        (0, 0)
    } else {
        text.lines().fold((0usize, 0usize), |(widest, count), line| {
            (widest.max(line.width()), count + 1)
        })
    };

    LabelSize {
        width: cells as f64 * cell + 2.0 * style.padding,
        height: lines as f64 * line_height + 2.0 * style.padding,
    }
}
