//! Line-number gutter projection.
//!
//! Turns the visible row range into the list of numbers to draw and where to
//! draw them. Pure: painting goes through [`crate::RenderSurface::draw_text`]
//! in the window consumer.

use std::ops::Range;

/// Layout inputs that do not change while scrolling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GutterStyle {
    /// Show distance from the cursor row instead of absolute numbers.
    pub relative: bool,
    /// Horizontal padding on each side of the numbers.
    pub padding: i32,
    pub char_width: f64,
    pub line_height: f64,
}

/// One number in the gutter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GutterLine {
    pub row: u32,
    pub number: u32,
    pub x: i32,
    pub y: i32,
    pub is_cursor_line: bool,
}

/// Number of decimal digits in `n`.
pub fn digits(n: u32) -> u32 {
    n.checked_ilog10().unwrap_or(0) + 1
}

/// Gutter width for a buffer of `line_count` lines.
pub fn gutter_width(line_count: u32, style: &GutterStyle) -> i32 {
    (f64::from(digits(line_count)) * style.char_width).round() as i32 + style.padding * 2
}

/// Numbers for every visible row that exists in the buffer.
///
/// The cursor row always shows its absolute number. `shift` is the viewport's
/// gutter shift and moves every number by the sub-line scroll offset.
pub fn project(
    visible: Range<u32>,
    cursor_row: u32,
    line_count: u32,
    shift: i32,
    style: &GutterStyle,
) -> Vec<GutterLine> {
    let widest = digits(line_count);
    let start = visible.start;
    visible
        .take_while(|row| *row < line_count)
        .map(|row| {
            let is_cursor_line = row == cursor_row;
            let number = if style.relative && !is_cursor_line {
                row.abs_diff(cursor_row)
            } else {
                row + 1
            };
            let align = f64::from(widest - digits(number)) * style.char_width;
            GutterLine {
                row,
                number,
                x: style.padding + align.round() as i32,
                y: (row - start) as i32 * style.line_height as i32 + shift,
                is_cursor_line,
            }
        })
        .collect()
}
