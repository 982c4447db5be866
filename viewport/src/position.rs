//! Pixel geometry for the viewport.
//!
//! Everything here is pure: functions take the current geometry by value and
//! return a delta, they never touch scrollbars or the render surface. The
//! consumer loop in [`crate::Window`] decides what to do with the results.
//!
//! Coordinates come in two spaces:
//!
//! - **Content space**: what [`BufferMetrics::pos`] returns, measured from the
//!   top-left corner of the first line.
//! - **Viewport space**: content space minus the current scroll offsets. The
//!   cursor overlay lives here.

use crate::surface::BufferMetrics;

/// Tolerance, in pixels, past a padded edge that still counts as visible.
///
/// Without it a target sitting right on the padding boundary can flip between
/// "visible" and "needs a one pixel scroll" as rounding changes.
pub const EDGE_SLACK: i32 = 5;

/// A pixel position, either in content space or viewport space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A signed scroll movement in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ScrollDelta {
    pub dx: i32,
    pub dy: i32,
}

impl ScrollDelta {
    pub const ZERO: Self = Self { dx: 0, dy: 0 };

    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

impl std::ops::Add for ScrollDelta {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl std::ops::Sub for ScrollDelta {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.dx - rhs.dx, self.dy - rhs.dy)
    }
}

impl std::ops::AddAssign for ScrollDelta {
    fn add_assign(&mut self, rhs: Self) {
        self.dx += rhs.dx;
        self.dy += rhs.dy;
    }
}

/// Inclusive range each scroll offset may take.
///
/// Read from the scrollbars' maxima. Bounds can shrink between a request and
/// its application (a resize landing mid-animation), so every absolute target
/// is clamped against the bounds current at application time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollValueBounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl ScrollValueBounds {
    /// Bounds starting at zero. Negative maxima collapse to zero.
    pub fn new(max_x: i32, max_y: i32) -> Self {
        Self {
            min_x: 0,
            max_x: max_x.max(0),
            min_y: 0,
            max_y: max_y.max(0),
        }
    }

    pub fn clamp_x(&self, x: i32) -> i32 {
        x.clamp(self.min_x, self.max_x.max(self.min_x))
    }

    pub fn clamp_y(&self, y: i32) -> i32 {
        y.clamp(self.min_y, self.max_y.max(self.min_y))
    }

    /// Shrink `delta` so that `(x, y) + delta` stays inside the bounds.
    pub fn reachable(&self, x: i32, y: i32, delta: ScrollDelta) -> ScrollDelta {
        ScrollDelta::new(
            self.clamp_x(x.saturating_add(delta.dx)).saturating_sub(x),
            self.clamp_y(y.saturating_add(delta.dy)).saturating_sub(y),
        )
    }
}

/// Margin kept between a target position and the viewport edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    pub x: i32,
    pub y: i32,
}

impl Padding {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Two characters horizontally, one line vertically.
    pub fn for_metrics(metrics: &dyn BufferMetrics) -> Self {
        Self {
            x: (metrics.char_width() * 2.0).round() as i32,
            y: metrics.line_height() as i32,
        }
    }
}

/// Snapshot of everything needed to decide what is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewGeometry {
    pub scroll_x: i32,
    pub scroll_y: i32,
    /// Visible text area width in pixels (gutter excluded).
    pub width: i32,
    pub height: i32,
    pub bounds: ScrollValueBounds,
    pub char_width: i32,
    pub line_height: i32,
    /// Width taken by the vertical scrollbar, zero when hidden.
    pub vertical_bar: i32,
    /// Height taken by the horizontal scrollbar, zero when hidden.
    pub horizontal_bar: i32,
}

/// Content-space pixel position of `(row, col)`.
///
/// Callers clamp the row first; metrics are free to return garbage for rows
/// past the end of the buffer.
pub fn pixel_of(metrics: &dyn BufferMetrics, row: u32, col: u32) -> PixelPoint {
    metrics.pos(row, col)
}

/// Minimal delta that brings `target` (content space) inside the padded view.
///
/// Returns [`ScrollDelta::ZERO`] when the target is already visible. The
/// result is clamped to what the current bounds can reach, so a view already
/// sitting at offset 0 never asks to scroll further back.
pub fn required_scroll(target: PixelPoint, view: &ViewGeometry, padding: Padding) -> ScrollDelta {
    let left = view.scroll_x + padding.x;
    let right =
        view.scroll_x + view.width - padding.x - view.char_width - view.vertical_bar;
    let dx = axis_delta(target.x, left, right);

    let top = view.scroll_y + padding.y;
    let bottom =
        view.scroll_y + view.height - padding.y - view.line_height - view.horizontal_bar;
    let dy = axis_delta(target.y, top, bottom);

    view.bounds
        .reachable(view.scroll_x, view.scroll_y, ScrollDelta::new(dx, dy))
}

fn axis_delta(target: i32, low: i32, high: i32) -> i32 {
    if target < low - EDGE_SLACK {
        target - low
    } else if target > high + EDGE_SLACK {
        // A view narrower than its padding has `high < low`; scroll so the
        // target lands on the leading edge rather than oscillating.
        target - high.max(low)
    } else {
        0
    }
}

/// Pixel delta for moving the view by whole rows and columns.
///
/// Rounds half away from zero, then clamps to the reachable range.
pub fn scroll_value(
    rows: i32,
    cols: i32,
    char_width: f64,
    line_height: f64,
    view: &ViewGeometry,
) -> ScrollDelta {
    let dx = (f64::from(cols) * char_width).round() as i32;
    let dy = (f64::from(rows) * line_height).round() as i32;
    view.bounds
        .reachable(view.scroll_x, view.scroll_y, ScrollDelta::new(dx, dy))
}

/// Whether a viewport-space `cursor` would leave the padded view once the
/// content moves by `delta`.
///
/// Only axes with motion are checked.
pub fn out_after_scroll(
    cursor: PixelPoint,
    delta: ScrollDelta,
    view: &ViewGeometry,
    padding: Padding,
) -> bool {
    if delta.dy != 0 {
        let end = cursor.y - delta.dy;
        if end < padding.y - EDGE_SLACK
            || end > view.height - padding.y - view.horizontal_bar - EDGE_SLACK
        {
            return true;
        }
    }
    if delta.dx != 0 {
        let end = cursor.x - delta.dx;
        if end < padding.x || end > view.width - padding.x - view.vertical_bar {
            return true;
        }
    }
    false
}
