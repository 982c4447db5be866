//! Viewport state owned by the window consumer.
//!
//! [`ViewportState`] is plain data plus clamping arithmetic. It never calls a
//! collaborator; the methods return what changed and the consumer turns that
//! into remote notifications and redraws.

use crate::{
    position::{pixel_of, PixelPoint, ScrollDelta, ScrollValueBounds},
    surface::{BufferMetrics, FrameSize},
};
use std::ops::Range;

/// Scroll offsets, cursor and visible rows of one window.
///
/// `visible.contains(&row)` is not an invariant. A cursor outside the visible
/// rows is exactly what triggers a scroll.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewportState {
    pub scroll_x: i32,
    pub scroll_y: i32,
    pub bounds: ScrollValueBounds,
    pub row: u32,
    pub col: u32,
    /// Column restored by vertical-only moves.
    pub sticky_col: u32,
    /// Cursor position in viewport space.
    pub cursor: PixelPoint,
    /// Rows currently rendered, end exclusive.
    pub visible: Range<u32>,
    pub frame: FrameSize,
    /// Vertical offset of the first gutter number, compensating for a scroll
    /// offset that is not a whole number of lines.
    pub gutter_shift: i32,
    pub selection: bool,
}

/// Result of [`ViewportState::apply_absolute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionChange {
    pub old: PixelPoint,
    pub new: PixelPoint,
}

impl PositionChange {
    pub fn moved(&self) -> bool {
        self.old != self.new
    }
}

/// Result of [`ViewportState::apply_scroll_delta`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollChange {
    /// Delta actually applied after clamping.
    pub applied: ScrollDelta,
    /// Set when the visible rows moved.
    pub visible: Option<Range<u32>>,
}

impl ViewportState {
    /// Clamp `(row, col)` into the buffer.
    ///
    /// Rows clamp to `[0, line_count - 1]`, columns to the last character of
    /// the line. A line that is not loaded yet is treated as empty.
    pub fn valid_pos(metrics: &dyn BufferMetrics, row: i64, col: i64) -> (u32, u32) {
        let max_row = i64::from(metrics.line_count().saturating_sub(1));
        let row = row.clamp(0, max_row) as u32;
        let max_col = metrics
            .line_len(row)
            .map(|len| i64::from(len) - 1)
            .unwrap_or(0)
            .max(0);
        let col = col.clamp(0, max_col) as u32;
        (row, col)
    }

    /// Move the cursor to `(row, col)`, clamped, and rederive everything that
    /// depends on it.
    pub fn apply_absolute(
        &mut self,
        metrics: &dyn BufferMetrics,
        row: u32,
        col: u32,
    ) -> PositionChange {
        let (row, col) = Self::valid_pos(metrics, i64::from(row), i64::from(col));
        let old = self.cursor;
        let at = pixel_of(metrics, row, col);
        self.cursor = PixelPoint::new(at.x - self.scroll_x, at.y - self.scroll_y);
        self.row = row;
        self.col = col;
        self.refresh_region(metrics);
        PositionChange {
            old,
            new: self.cursor,
        }
    }

    /// Add `delta` to the scroll offsets, clamping each axis on its own.
    ///
    /// The cursor pixel position is left alone; callers that want the cursor
    /// to follow the view reapply the same row and column afterwards.
    pub fn apply_scroll_delta(
        &mut self,
        metrics: &dyn BufferMetrics,
        delta: ScrollDelta,
    ) -> ScrollChange {
        let x = self.bounds.clamp_x(self.scroll_x.saturating_add(delta.dx));
        let y = self.bounds.clamp_y(self.scroll_y.saturating_add(delta.dy));
        let applied = ScrollDelta::new(
            x.saturating_sub(self.scroll_x),
            y.saturating_sub(self.scroll_y),
        );
        let visible = self.set_scroll(metrics, x, y);
        ScrollChange { applied, visible }
    }

    /// Jump to absolute offsets, clamped. Returns the new visible rows when
    /// they changed.
    pub fn set_scroll(&mut self, metrics: &dyn BufferMetrics, x: i32, y: i32) -> Option<Range<u32>> {
        self.scroll_x = self.bounds.clamp_x(x);
        self.scroll_y = self.bounds.clamp_y(y);
        let before = self.visible.clone();
        self.refresh_region(metrics);
        (before != self.visible).then(|| self.visible.clone())
    }

    /// Install new bounds and pull the offsets back inside them.
    ///
    /// Returns `true` when an offset had to move.
    pub fn set_bounds(&mut self, metrics: &dyn BufferMetrics, bounds: ScrollValueBounds) -> bool {
        self.bounds = bounds;
        let (x, y) = (bounds.clamp_x(self.scroll_x), bounds.clamp_y(self.scroll_y));
        if (x, y) == (self.scroll_x, self.scroll_y) {
            return false;
        }
        self.set_scroll(metrics, x, y);
        true
    }

    /// Rows covered by the current vertical offset and frame height.
    ///
    /// One extra row is included for the partially visible line at the bottom.
    pub fn scroll_region(&self, line_height: f64) -> Range<u32> {
        if line_height <= 0.0 {
            return 0..0;
        }
        let start = (f64::from(self.scroll_y) / line_height).floor().max(0.0) as u32;
        let rows = (f64::from(self.frame.height) / line_height + 1.0).floor().max(0.0) as u32;
        start..start + rows
    }

    fn refresh_region(&mut self, metrics: &dyn BufferMetrics) {
        let line_height = metrics.line_height();
        self.visible = self.scroll_region(line_height);
        let line_top = self.visible.start as i32 * line_height as i32;
        self.gutter_shift = metrics.baseline_shift().round() as i32 - (self.scroll_y - line_top);
    }
}
