//! Splits a scroll delta into per-tick steps.
//!
//! A [`Trajectory`] hands out steps whose sum is exactly the requested delta.
//! Short hops (under [`SHORT_HOP`] pixels on both axes) take [`SHORT_TICKS`]
//! ticks, anything longer takes [`LONG_TICKS`], so a page jump gets finer
//! steps without a one-line move feeling sluggish.
//!
//! The remaining distance is always derived from what has been consumed so
//! far rather than from a precomputed schedule. Stopping a trajectory halfway
//! therefore leaves a well-defined [`Trajectory::remaining`] for a final
//! catch-up step.

use crate::position::ScrollDelta;

pub const SHORT_HOP: i32 = 100;
pub const SHORT_TICKS: i32 = 3;
pub const LONG_TICKS: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Axis {
    total: i32,
    /// Step magnitude for the next tick.
    step: i32,
    /// Magnitude consumed so far.
    consumed: i32,
}

impl Axis {
    fn new(total: i32, ticks: i32) -> Self {
        let step = if total.abs() < ticks {
            i32::from(total != 0)
        } else {
            (total / ticks).abs()
        };
        Self {
            total,
            step,
            consumed: 0,
        }
    }

    fn remaining(&self) -> i32 {
        self.total.abs() - self.consumed
    }

    fn next(&mut self) -> i32 {
        let remaining = self.remaining();
        if remaining <= 0 {
            self.step = 0;
            return 0;
        }
        // Decelerate into the target instead of stepping past it.
        self.step = self.step.min(remaining);
        self.consumed += self.step;
        self.step * self.total.signum()
    }

    fn signed(&self, magnitude: i32) -> i32 {
        magnitude * self.total.signum()
    }
}

/// Step plan for one animated scroll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trajectory {
    x: Axis,
    y: Axis,
    ticks: i32,
}

impl Trajectory {
    pub fn new(total: ScrollDelta) -> Self {
        let ticks = Self::ticks_for(total);
        Self {
            x: Axis::new(total.dx, ticks),
            y: Axis::new(total.dy, ticks),
            ticks,
        }
    }

    /// Tick budget for a delta.
    pub fn ticks_for(total: ScrollDelta) -> i32 {
        if total.dx.abs() < SHORT_HOP && total.dy.abs() < SHORT_HOP {
            SHORT_TICKS
        } else {
            LONG_TICKS
        }
    }

    pub fn ticks(&self) -> i32 {
        self.ticks
    }

    pub fn total(&self) -> ScrollDelta {
        ScrollDelta::new(self.x.total, self.y.total)
    }

    /// Size of the most recent step, unsigned per axis.
    pub fn step(&self) -> ScrollDelta {
        ScrollDelta::new(self.x.step, self.y.step)
    }

    /// Signed distance handed out so far.
    pub fn elapsed(&self) -> ScrollDelta {
        ScrollDelta::new(self.x.signed(self.x.consumed), self.y.signed(self.y.consumed))
    }

    /// Signed distance still to go.
    pub fn remaining(&self) -> ScrollDelta {
        ScrollDelta::new(
            self.x.signed(self.x.remaining().max(0)),
            self.y.signed(self.y.remaining().max(0)),
        )
    }

    pub fn is_finished(&self) -> bool {
        self.x.remaining() <= 0 && self.y.remaining() <= 0
    }

    /// Distance handed out beyond the total, if any.
    ///
    /// Always `None` for a correct planner. Kept as an explicit check so the
    /// animation driver can report a defect instead of silently drifting.
    pub fn overshoot(&self) -> Option<ScrollDelta> {
        let over = ScrollDelta::new(
            self.x.signed((-self.x.remaining()).max(0)),
            self.y.signed((-self.y.remaining()).max(0)),
        );
        (!over.is_zero()).then_some(over)
    }

    /// Next step, or `None` once both axes have arrived.
    pub fn next_step(&mut self) -> Option<ScrollDelta> {
        if self.is_finished() {
            return None;
        }
        Some(ScrollDelta::new(self.x.next(), self.y.next()))
    }
}

impl Iterator for Trajectory {
    type Item = ScrollDelta;

    fn next(&mut self) -> Option<ScrollDelta> {
        self.next_step()
    }
}
