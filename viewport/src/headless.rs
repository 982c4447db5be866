//! In-memory collaborators.
//!
//! Used by the replay binary and by tests. Each type is a cheap clone around
//! shared state: one clone moves into the window consumer, the other stays
//! with the caller to inspect what the window did.

use crate::{
    position::PixelPoint,
    surface::{BufferMetrics, FrameSize, RemoteBuffer, RenderSurface, ScrollBar},
};
use parking_lot::{Mutex, RwLock};
use std::{ops::Range, sync::Arc};

/// Fixed-pitch layout over a line list shared with the caller.
///
/// Lines can be unloaded to mimic a remote buffer that has not sent their
/// content yet.
#[derive(Debug, Clone)]
pub struct MonospaceMetrics {
    lines: Arc<RwLock<Vec<Option<String>>>>,
    char_width: f64,
    line_height: f64,
    baseline_shift: f64,
}

impl MonospaceMetrics {
    pub fn new(lines: Vec<Option<String>>, char_width: f64, line_height: f64) -> Self {
        Self {
            lines: Arc::new(RwLock::new(lines)),
            char_width,
            line_height,
            baseline_shift: 0.0,
        }
    }

    pub fn from_text(text: &str, char_width: f64, line_height: f64) -> Self {
        let lines = text.split('\n').map(|line| Some(line.to_string())).collect();
        Self::new(lines, char_width, line_height)
    }

    pub fn with_baseline_shift(mut self, shift: f64) -> Self {
        self.baseline_shift = shift;
        self
    }

    /// Forget the content of `row`, keeping the line count.
    pub fn unload(&self, row: u32) {
        if let Some(line) = self.lines.write().get_mut(row as usize) {
            *line = None;
        }
    }

    /// Replace every line.
    pub fn set_lines(&self, lines: Vec<Option<String>>) {
        *self.lines.write() = lines;
    }

    /// Widest loaded line in pixels.
    pub fn content_width(&self) -> i32 {
        let widest = self
            .lines
            .read()
            .iter()
            .flatten()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        (widest as f64 * self.char_width).round() as i32
    }

    pub fn content_height(&self) -> i32 {
        (f64::from(self.line_count()) * self.line_height).round() as i32
    }
}

impl BufferMetrics for MonospaceMetrics {
    fn line_height(&self) -> f64 {
        self.line_height
    }

    fn char_width(&self) -> f64 {
        self.char_width
    }

    fn line_count(&self) -> u32 {
        self.lines.read().len() as u32
    }

    fn line_len(&self, row: u32) -> Option<u32> {
        self.lines
            .read()
            .get(row as usize)?
            .as_ref()
            .map(|line| line.chars().count() as u32)
    }

    fn pos(&self, row: u32, col: u32) -> PixelPoint {
        PixelPoint::new(
            (f64::from(col) * self.char_width).round() as i32,
            (f64::from(row) * self.line_height).round() as i32,
        )
    }

    fn baseline_shift(&self) -> f64 {
        self.baseline_shift
    }
}

/// Everything a [`HeadlessSurface`] was asked to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceLog {
    pub size: FrameSize,
    pub cursor: PixelPoint,
    pub cursor_line_y: i32,
    pub cursor_line_size: (i32, i32),
    pub redraws: usize,
    /// Text drawn since the last [`HeadlessSurface::take_drawn`].
    pub drawn: Vec<(i32, i32, String)>,
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    log: Arc<Mutex<SurfaceLog>>,
}

impl HeadlessSurface {
    pub fn new(size: FrameSize) -> Self {
        let surface = Self::default();
        surface.log.lock().size = size;
        surface
    }

    pub fn log(&self) -> SurfaceLog {
        self.log.lock().clone()
    }

    pub fn redraws(&self) -> usize {
        self.log.lock().redraws
    }

    /// Change the reported size. Follow with [`crate::WindowHandle::resize`].
    pub fn set_size(&self, size: FrameSize) {
        self.log.lock().size = size;
    }

    pub fn take_drawn(&self) -> Vec<(i32, i32, String)> {
        std::mem::take(&mut self.log.lock().drawn)
    }
}

impl RenderSurface for HeadlessSurface {
    fn size(&self) -> FrameSize {
        self.log.lock().size
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        self.log.lock().drawn.push((x, y, text.to_string()));
    }

    fn move_cursor(&mut self, at: PixelPoint) {
        self.log.lock().cursor = at;
    }

    fn move_cursor_line(&mut self, y: i32) {
        self.log.lock().cursor_line_y = y;
    }

    fn resize_cursor_line(&mut self, width: i32, height: i32) {
        self.log.lock().cursor_line_size = (width, height);
    }

    fn request_redraw(&mut self) {
        self.log.lock().redraws += 1;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct BarState {
    value: i32,
    maximum: i32,
    visible: bool,
    thickness: i32,
}

/// A scrollbar that clamps its value like a toolkit widget would.
#[derive(Debug, Clone, Default)]
pub struct HeadlessScrollBar {
    state: Arc<Mutex<BarState>>,
}

impl HeadlessScrollBar {
    pub fn new(maximum: i32, thickness: i32) -> Self {
        let bar = Self::default();
        {
            let mut state = bar.state.lock();
            state.maximum = maximum.max(0);
            state.visible = maximum > 0;
            state.thickness = thickness;
        }
        bar
    }

    /// Bar for `content` pixels shown through a `viewport` pixel window.
    pub fn for_content(content: i32, viewport: i32, thickness: i32) -> Self {
        Self::new(content - viewport, thickness)
    }

    /// Change the range, as a toolkit does when content or viewport resizes.
    pub fn set_maximum(&self, maximum: i32) {
        let mut state = self.state.lock();
        state.maximum = maximum.max(0);
        state.visible = maximum > 0;
        state.value = state.value.min(state.maximum);
    }
}

impl ScrollBar for HeadlessScrollBar {
    fn value(&self) -> i32 {
        self.state.lock().value
    }

    fn maximum(&self) -> i32 {
        self.state.lock().maximum
    }

    fn is_visible(&self) -> bool {
        self.state.lock().visible
    }

    fn thickness(&self) -> i32 {
        self.state.lock().thickness
    }

    fn set_value(&mut self, value: i32) {
        let mut state = self.state.lock();
        state.value = value.clamp(0, state.maximum);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Click { row: u32, col: u32 },
    Drag { row: u32, col: u32 },
    Scroll { visible: Range<u32> },
}

/// Remote buffer that only records calls.
#[derive(Debug, Clone, Default)]
pub struct RecordingRemote {
    calls: Arc<Mutex<Vec<RemoteCall>>>,
}

impl RecordingRemote {
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().clone()
    }

    /// Click and drag calls only, visible range notifications filtered out.
    pub fn cursor_calls(&self) -> Vec<RemoteCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| !matches!(call, RemoteCall::Scroll { .. }))
            .cloned()
            .collect()
    }
}

impl RemoteBuffer for RecordingRemote {
    fn click(&mut self, row: u32, col: u32) {
        self.calls.lock().push(RemoteCall::Click { row, col });
    }

    fn drag(&mut self, row: u32, col: u32) {
        self.calls.lock().push(RemoteCall::Drag { row, col });
    }

    fn scroll(&mut self, visible: Range<u32>) {
        self.calls.lock().push(RemoteCall::Scroll { visible });
    }
}
