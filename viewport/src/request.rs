//! Messages flowing into a window's consumer.

use crate::{
    animation::{JobId, JobState},
    position::ScrollDelta,
    state::ViewportState,
};
use tokio::sync::oneshot;

/// Put the cursor at `(row, col)`, clamped to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsoluteMove {
    pub row: u32,
    pub col: u32,
    /// Forward the new position to the remote buffer as a click or drag.
    pub notify_remote: bool,
}

/// Move by whole rows and columns, animated.
///
/// - `move_cursor` only: the cursor moves and the view follows if needed.
/// - `keep_viewport_locked` only: the view moves, the cursor stays put unless
///   it would leave the view.
/// - both: view and cursor move together so the cursor keeps its screen row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeScroll {
    pub rows: i32,
    pub cols: i32,
    pub move_cursor: bool,
    pub keep_viewport_locked: bool,
}

/// Shift the view by a pixel delta, immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickScroll {
    pub dx: i32,
    pub dy: i32,
    /// The caller moves the cursor itself; otherwise the cursor follows the
    /// view.
    pub move_cursor: bool,
}

impl TickScroll {
    pub fn delta(&self) -> ScrollDelta {
        ScrollDelta::new(self.dx, self.dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollIntent {
    AbsoluteMove(AbsoluteMove),
    RelativeScroll(RelativeScroll),
    TickScroll(TickScroll),
}

/// What an animation job publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobEvent {
    Step(TickScroll),
    Finished(AbsoluteMove),
}

/// Read-only copy of a window's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportSnapshot {
    pub state: ViewportState,
    /// State of the most recent animation job.
    pub job: JobState,
    pub gutter_width: i32,
    pub smooth_scroll: bool,
}

impl ViewportSnapshot {
    pub fn animating(&self) -> bool {
        self.job == JobState::Running
    }
}

/// Released when the request it was attached to has been fully applied,
/// including any animation it started.
pub(crate) type Waiter = Option<oneshot::Sender<()>>;

pub(crate) fn release(waiter: Waiter) {
    if let Some(waiter) = waiter {
        // The requester may have stopped waiting.
        let _ = waiter.send(());
    }
}

#[derive(Debug)]
pub(crate) enum Request {
    Intent {
        intent: ScrollIntent,
        done: Waiter,
    },
    ScrollTo {
        row: u32,
        col: u32,
        move_cursor: bool,
        done: Waiter,
    },
    RemotePosition {
        row: u32,
        col: u32,
    },
    Job {
        id: JobId,
        event: JobEvent,
    },
    Resize,
    ScrollbarMoved {
        x: i32,
        y: i32,
    },
    Selection(bool),
    SmoothScroll(bool),
    BufferLoaded,
    PaintGutter,
    Snapshot(oneshot::Sender<ViewportSnapshot>),
}
