//! Background scroll animation.
//!
//! A job is a spawned task that walks a [`Trajectory`], publishing one
//! [`JobEvent::Step`] per tick into the window queue and a
//! [`JobEvent::Finished`] carrying the final cursor position once both axes
//! have arrived. It never touches viewport state directly.
//!
//! The consumer keeps the matching [`AnimationJob`] record in an [`Animator`]
//! and counts what it has actually applied. Retiring a job is a barrier: the
//! job's [`CancellationToken`] fires, the consumer awaits the job's
//! [`JoinHandle`], and only then computes the catch-up delta from its own
//! bookkeeping. Steps the old job left in the queue carry a stale [`JobId`]
//! and are discarded, so nothing from a retired job lands after its catch-up.
//! The retired job's final position is handed back with the catch-up so the
//! consumer can land it before the superseding request reads the cursor.

use crate::{
    position::ScrollDelta,
    request::{release, AbsoluteMove, JobEvent, Request, TickScroll, Waiter},
    trajectory::Trajectory,
};
use std::time::Duration;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// How a job task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    /// Stopped early. `unpublished` is the distance the task never sent.
    Cancelled { unpublished: ScrollDelta },
}

/// Consumer-side record of the live job.
#[derive(Debug)]
struct AnimationJob {
    id: JobId,
    total: ScrollDelta,
    applied: ScrollDelta,
    final_position: AbsoluteMove,
    move_cursor: bool,
    cancel: CancellationToken,
    handle: JoinHandle<JobOutcome>,
    done: Waiter,
}

/// A job stopped before its final position was applied.
#[derive(Debug)]
pub(crate) struct Retired {
    pub id: JobId,
    /// Distance still owed to the view, as one step.
    pub leftover: ScrollDelta,
    pub final_position: AbsoluteMove,
    pub move_cursor: bool,
    pub outcome: JobOutcome,
    done: Waiter,
}

impl Retired {
    pub fn release(self) {
        release(self.done);
    }
}

/// A job whose final position has arrived.
#[derive(Debug)]
pub(crate) struct Finished {
    done: Waiter,
}

impl Finished {
    pub fn release(self) {
        release(self.done);
    }
}

/// Owns at most one [`AnimationJob`] at a time.
#[derive(Debug)]
pub(crate) struct Animator {
    next_id: JobId,
    tick: Duration,
    active: Option<AnimationJob>,
    state: JobState,
}

impl Animator {
    pub fn new(tick: Duration) -> Self {
        Self {
            next_id: 1,
            tick,
            active: None,
            state: JobState::Idle,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Spawn a job scrolling by `total`, ending at `final_position`.
    ///
    /// The previous job must have been retired; see [`Animator::retire`].
    pub fn start(
        &mut self,
        tx: mpsc::Sender<Request>,
        total: ScrollDelta,
        final_position: AbsoluteMove,
        move_cursor: bool,
        done: Waiter,
    ) -> JobId {
        debug_assert!(self.active.is_none(), "previous animation was not retired");

        let id = self.next_id;
        self.next_id += 1;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            id,
            Trajectory::new(total),
            final_position,
            move_cursor,
            tx,
            cancel.clone(),
            self.tick,
        ));
        debug!(job = id, dx = total.dx, dy = total.dy, "animation started");

        self.active = Some(AnimationJob {
            id,
            total,
            applied: ScrollDelta::ZERO,
            final_position,
            move_cursor,
            cancel,
            handle,
            done,
        });
        self.state = JobState::Running;
        id
    }

    /// Cancel the live job and wait until its task has exited.
    ///
    /// Returns `None` when nothing was running.
    pub async fn retire(&mut self) -> Option<Retired> {
        let job = self.active.take()?;
        job.cancel.cancel();
        let outcome = match job.handle.await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(job = job.id, %err, "animation task did not exit cleanly");
                JobOutcome::Cancelled {
                    unpublished: ScrollDelta::ZERO,
                }
            },
        };
        self.state = JobState::Cancelled;

        let leftover = catch_up(job.id, job.total, job.applied);
        if let JobOutcome::Cancelled { unpublished } = outcome {
            if !unsent_within_owed(unpublished, leftover) {
                error!(
                    job = job.id,
                    ?unpublished,
                    ?leftover,
                    "animation reports more unsent distance than it owes"
                );
            }
        }
        debug!(
            job = job.id,
            ?outcome,
            dx = leftover.dx,
            dy = leftover.dy,
            superseded_row = job.final_position.row,
            "animation retired"
        );
        Some(Retired {
            id: job.id,
            leftover,
            final_position: job.final_position,
            move_cursor: job.move_cursor,
            outcome,
            done: job.done,
        })
    }

    /// Account for a step about to be applied.
    ///
    /// Returns `false` for steps from a job that is no longer live.
    pub fn record_step(&mut self, id: JobId, step: ScrollDelta) -> bool {
        let Some(job) = self.active.as_mut().filter(|job| job.id == id) else {
            trace!(job = id, "dropping step from retired job");
            return false;
        };
        job.applied += step;
        if overshot(job.total.dx, job.applied.dx) || overshot(job.total.dy, job.applied.dy) {
            error!(
                job = id,
                total = ?job.total,
                applied = ?job.applied,
                "animation applied more distance than requested"
            );
        }
        true
    }

    /// Take the live job if its final position just arrived.
    pub fn finish(&mut self, id: JobId) -> Option<Finished> {
        if self.active.as_ref().map(|job| job.id) != Some(id) {
            trace!(job = id, "dropping final position from retired job");
            return None;
        }
        let job = self.active.take()?;
        let owed = job.total - job.applied;
        if !owed.is_zero() {
            error!(job = id, ?owed, "animation finished with distance unapplied");
        }
        self.state = JobState::Completed;
        debug!(job = id, "animation completed");
        Some(Finished { done: job.done })
    }
}

fn overshot(total: i32, applied: i32) -> bool {
    let wrong_way = applied != 0 && applied.signum() != total.signum();
    let past = applied.abs() > total.abs();
    wrong_way || past
}

/// Whatever the task never sent is part of what the consumer never applied.
fn unsent_within_owed(unpublished: ScrollDelta, owed: ScrollDelta) -> bool {
    !overshot(owed.dx, unpublished.dx) && !overshot(owed.dy, unpublished.dy)
}

/// Remaining distance of a retired job, direction preserved.
///
/// An axis that already went past its total contributes nothing.
fn catch_up(id: JobId, total: ScrollDelta, applied: ScrollDelta) -> ScrollDelta {
    let axis = |total: i32, applied: i32| {
        if overshot(total, applied) {
            error!(job = id, total, applied, "retired animation overshot its target");
            0
        } else {
            total - applied
        }
    };
    ScrollDelta::new(axis(total.dx, applied.dx), axis(total.dy, applied.dy))
}

async fn run(
    id: JobId,
    mut trajectory: Trajectory,
    final_position: AbsoluteMove,
    move_cursor: bool,
    tx: mpsc::Sender<Request>,
    cancel: CancellationToken,
    tick: Duration,
) -> JobOutcome {
    while let Some(step) = trajectory.next_step() {
        let event = JobEvent::Step(TickScroll {
            dx: step.dx,
            dy: step.dy,
            move_cursor,
        });
        if !publish(&tx, &cancel, id, event).await {
            return JobOutcome::Cancelled {
                unpublished: trajectory.remaining() + step,
            };
        }
        trace!(job = id, dx = step.dx, dy = step.dy, "tick");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return JobOutcome::Cancelled {
                    unpublished: trajectory.remaining(),
                };
            },
            _ = tokio::time::sleep(tick) => {},
        }
    }

    if let Some(over) = trajectory.overshoot() {
        error!(job = id, ?over, "trajectory stepped past its total");
    }

    if publish(&tx, &cancel, id, JobEvent::Finished(final_position)).await {
        JobOutcome::Completed
    } else {
        JobOutcome::Cancelled {
            unpublished: ScrollDelta::ZERO,
        }
    }
}

/// Send `event` unless cancelled first. `false` means the job must stop.
async fn publish(
    tx: &mpsc::Sender<Request>,
    cancel: &CancellationToken,
    id: JobId,
    event: JobEvent,
) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = tx.send(Request::Job { id, event }) => sent.is_ok(),
    }
}
