//! Interfaces to everything the engine does not own.
//!
//! The window consumer is generic over a toolkit: it only ever talks to these
//! traits. Implementations live with the GUI layer; [`crate::headless`] has
//! in-memory versions for tests and the replay binary.
//!
//! All collaborators move into the consumer task, hence the `Send` bounds.

use crate::position::PixelPoint;
use std::ops::Range;

/// Size of the text area in pixels, gutter excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSize {
    pub width: i32,
    pub height: i32,
}

impl FrameSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Where the window draws.
pub trait RenderSurface: Send {
    /// Current visible size of the text area.
    fn size(&self) -> FrameSize;

    /// Draw `text` in the gutter at `(x, y)`.
    fn draw_text(&mut self, x: i32, y: i32, text: &str);

    /// Move the cursor overlay to a viewport-space position.
    fn move_cursor(&mut self, at: PixelPoint);

    /// Move the current-line highlight to viewport row offset `y`.
    fn move_cursor_line(&mut self, y: i32);

    fn resize_cursor_line(&mut self, width: i32, height: i32);

    /// Schedule a repaint of the gutter. The toolkit answers with a paint
    /// notification, which becomes [`crate::WindowHandle::paint_gutter`].
    fn request_redraw(&mut self);
}

/// One axis of scrolling chrome.
pub trait ScrollBar: Send {
    fn value(&self) -> i32;

    fn maximum(&self) -> i32;

    fn is_visible(&self) -> bool;

    /// Width of a vertical bar, height of a horizontal one.
    fn thickness(&self) -> i32;

    fn set_value(&mut self, value: i32);
}

/// The remote text-buffer service.
pub trait RemoteBuffer: Send {
    /// Place the cursor.
    fn click(&mut self, row: u32, col: u32);

    /// Extend the active selection to `(row, col)`.
    fn drag(&mut self, row: u32, col: u32);

    /// Tell the service which rows are on screen so it can send their content.
    fn scroll(&mut self, visible: Range<u32>);
}

/// Layout facts about the buffer being displayed.
pub trait BufferMetrics: Send {
    fn line_height(&self) -> f64;

    fn char_width(&self) -> f64;

    fn line_count(&self) -> u32;

    /// Length of `row` in characters, `None` while the line is not loaded.
    fn line_len(&self, row: u32) -> Option<u32>;

    /// Content-space pixel position of `(row, col)`.
    fn pos(&self, row: u32, col: u32) -> PixelPoint;

    /// Vertical offset applied when drawing text inside a line box.
    fn baseline_shift(&self) -> f64 {
        0.0
    }
}
