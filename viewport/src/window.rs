//! The window consumer and its handle.
//!
//! # Ownership
//!
//! A [`Window`] owns its [`ViewportState`] and every collaborator. It runs as
//! one task draining one bounded queue, applying requests strictly in arrival
//! order. Nothing else mutates the viewport: input callbacks, scrollbar and
//! resize notifications, pushes from the remote buffer and the animation job
//! all go through a [`WindowHandle`] or the queue sender.
//!
//! ```text
//! input / remote / toolkit ──► WindowHandle ──► queue ──► Window (consumer)
//!                                   │             ▲            │
//!                        smooth gate (1 slot)     │            ▼
//!                                   └──► forwarder┘      animation job
//!                                                 ▲            │
//!                                                 └── steps ───┘
//! ```
//!
//! # Relative scrolls are best-effort
//!
//! [`WindowHandle::scroll`] is the only request that may be dropped. It goes
//! through a one-slot gate; a forwarder admits one relative scroll at a time
//! into the queue and waits for its animation to finish before admitting the
//! next. A caller that cannot get into the gate within the configured timeout
//! gives up silently, so held-down keys coalesce instead of piling up behind
//! a slow animation. Every other request waits for queue capacity.
//!
//! # Preemption
//!
//! Any request that starts motion first retires the live animation (see
//! [`crate::animation`]), applies its catch-up step, lands its final cursor
//! position, and only then reads the state it needs. Only one job publishes
//! steps at any time.

use crate::{
    animation::{Animator, JobId},
    config::Config,
    error::{Error, Result},
    gutter::{self, GutterStyle},
    position::{
        out_after_scroll, pixel_of, required_scroll, scroll_value, Padding, ScrollDelta,
        ScrollValueBounds, ViewGeometry,
    },
    request::{
        release, AbsoluteMove, JobEvent, RelativeScroll, Request, ScrollIntent, TickScroll,
        ViewportSnapshot, Waiter,
    },
    state::ViewportState,
    surface::{BufferMetrics, RemoteBuffer, RenderSurface, ScrollBar},
};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, info_span, trace, Instrument};

static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

/// Collaborators moved into a window's consumer task.
pub struct WindowParts {
    pub surface: Box<dyn RenderSurface>,
    pub vertical: Box<dyn ScrollBar>,
    pub horizontal: Box<dyn ScrollBar>,
    pub remote: Box<dyn RemoteBuffer>,
    pub metrics: Box<dyn BufferMetrics>,
}

/// Single consumer of a window's request queue.
pub struct Window {
    id: u64,
    config: Config,
    parts: WindowParts,
    state: ViewportState,
    animator: Animator,
    gutter_width: i32,
    /// Weak so the consumer stops once every producer is gone. Upgraded for
    /// the lifetime of each animation job.
    tx: mpsc::WeakSender<Request>,
}

impl Window {
    /// Start the consumer and the smooth scroll forwarder on the current
    /// tokio runtime.
    ///
    /// The consumer exits once every [`WindowHandle`] clone has been dropped
    /// and any running animation has finished.
    pub fn spawn(parts: WindowParts, config: Config) -> (WindowHandle, JoinHandle<()>) {
        let id = NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let (smooth_tx, smooth_rx) = mpsc::channel(1);
        let enqueue_timeout = config.enqueue_timeout();

        let mut window = Self {
            id,
            animator: Animator::new(config.tick_interval()),
            config,
            parts,
            state: ViewportState::default(),
            gutter_width: 0,
            tx: tx.downgrade(),
        };
        window.initialize();

        let span = info_span!("window", id);
        tokio::spawn(forward_smooth_scrolls(smooth_rx, tx.clone()).instrument(span.clone()));
        let consumer = tokio::spawn(window.run(rx).instrument(span));

        let handle = WindowHandle {
            id,
            tx,
            smooth_tx,
            enqueue_timeout,
        };
        (handle, consumer)
    }

    fn initialize(&mut self) {
        self.load_buffer();
        self.sync_frame();
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Request>) {
        debug!("window consumer started");
        while let Some(request) = rx.recv().await {
            self.handle(request).await;
        }
        if self.animator.is_running() {
            debug!("queue closed with an animation in flight");
        }
        if let Some(retired) = self.animator.retire().await {
            retired.release();
        }
        debug!("window consumer stopped");
    }

    async fn handle(&mut self, request: Request) {
        match request {
            Request::Intent { intent, done } => self.apply_intent(intent, done).await,
            Request::ScrollTo {
                row,
                col,
                move_cursor,
                done,
            } => self.scroll_to_cursor(row, col, move_cursor, done).await,
            Request::RemotePosition { row, col } => {
                if (row, col) == (self.state.row, self.state.col) {
                    trace!(row, col, "remote position matches cursor");
                } else {
                    self.scroll_to_cursor(row, col, true, None).await;
                }
            },
            Request::Job { id, event } => self.apply_job_event(id, event),
            Request::Resize => self.sync_frame(),
            Request::ScrollbarMoved { x, y } => self.scrollbar_moved(x, y),
            Request::Selection(active) => self.state.selection = active,
            Request::SmoothScroll(enabled) => {
                debug!(enabled, "smooth scrolling toggled");
                self.config.smooth_scroll = enabled;
            },
            Request::BufferLoaded => self.load_buffer(),
            Request::PaintGutter => self.paint_gutter(),
            Request::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            },
        }
    }

    async fn apply_intent(&mut self, intent: ScrollIntent, done: Waiter) {
        match intent {
            ScrollIntent::AbsoluteMove(target) => {
                self.set_pos(target.row, target.col, target.notify_remote);
                self.state.sticky_col = self.state.col;
                release(done);
            },
            ScrollIntent::TickScroll(tick) => {
                self.scroll_view(tick);
                release(done);
            },
            ScrollIntent::RelativeScroll(scroll) => self.smooth_scroll_start(scroll, done).await,
        }
    }

    fn apply_job_event(&mut self, id: JobId, event: JobEvent) {
        match event {
            JobEvent::Step(tick) => {
                if self.animator.record_step(id, tick.delta()) {
                    self.scroll_view(tick);
                }
            },
            JobEvent::Finished(target) => {
                if let Some(finished) = self.animator.finish(id) {
                    self.set_pos(target.row, target.col, target.notify_remote);
                    finished.release();
                }
            },
        }
    }

    /// Stop the live animation, apply what it still owed and land its final
    /// position.
    async fn retire_active(&mut self) {
        let Some(retired) = self.animator.retire().await else {
            return;
        };
        if !retired.leftover.is_zero() {
            self.scroll_view(TickScroll {
                dx: retired.leftover.dx,
                dy: retired.leftover.dy,
                move_cursor: retired.move_cursor,
            });
        }
        let target = retired.final_position;
        self.set_pos(target.row, target.col, target.notify_remote);
        debug!(job = retired.id, outcome = ?retired.outcome, "superseded animation caught up");
        retired.release();
    }

    /// Scroll so `(row, col)` is visible, optionally moving the cursor there.
    async fn scroll_to_cursor(&mut self, row: u32, col: u32, move_cursor: bool, done: Waiter) {
        self.retire_active().await;
        self.refresh_bounds();

        let metrics = &*self.parts.metrics;
        let (row, col) = ViewportState::valid_pos(metrics, row.into(), col.into());
        let target = pixel_of(metrics, row, col);
        let final_position = if move_cursor {
            AbsoluteMove {
                row,
                col,
                notify_remote: false,
            }
        } else {
            AbsoluteMove {
                row: self.state.row,
                col: self.state.col,
                notify_remote: false,
            }
        };

        if !self.config.smooth_scroll {
            let margin = self.config.ensure_visible_margin;
            let delta = required_scroll(target, &self.geometry(), Padding::new(margin, margin));
            if !delta.is_zero() {
                self.scroll_view(TickScroll {
                    dx: delta.dx,
                    dy: delta.dy,
                    move_cursor: true,
                });
            }
            self.set_pos(final_position.row, final_position.col, false);
            release(done);
            return;
        }

        let delta = required_scroll(target, &self.geometry(), Padding::for_metrics(metrics));
        self.start_job(delta, final_position, move_cursor, done);
    }

    async fn smooth_scroll_start(&mut self, scroll: RelativeScroll, done: Waiter) {
        if !scroll.move_cursor && !scroll.keep_viewport_locked {
            release(done);
            return;
        }
        self.retire_active().await;
        self.refresh_bounds();

        let metrics = &*self.parts.metrics;
        let row = i64::from(self.state.row) + i64::from(scroll.rows);
        let col = if scroll.cols == 0 {
            i64::from(self.state.sticky_col)
        } else {
            i64::from(self.state.col) + i64::from(scroll.cols)
        };
        let (row, col) = ViewportState::valid_pos(metrics, row, col);
        if (row, col) == (self.state.row, self.state.col) {
            trace!(row, col, "relative scroll has nowhere to go");
            release(done);
            return;
        }
        if scroll.cols != 0 {
            self.state.sticky_col = col;
        }

        let geometry = self.geometry();
        let padding = Padding::for_metrics(metrics);
        let delta = if scroll.keep_viewport_locked {
            let cols = if scroll.cols != 0 {
                col as i32 - self.state.col as i32
            } else {
                0
            };
            scroll_value(
                row as i32 - self.state.row as i32,
                cols,
                metrics.char_width(),
                metrics.line_height(),
                &geometry,
            )
        } else {
            required_scroll(pixel_of(metrics, row, col), &geometry, padding)
        };

        let mut move_cursor = scroll.move_cursor;
        let mut final_position = AbsoluteMove {
            row,
            col,
            notify_remote: true,
        };
        if !move_cursor {
            if out_after_scroll(self.state.cursor, delta, &geometry, padding) {
                move_cursor = true;
            } else {
                final_position = AbsoluteMove {
                    row: self.state.row,
                    col: self.state.col,
                    notify_remote: false,
                };
            }
        }
        self.start_job(delta, final_position, move_cursor, done);
    }

    /// Animate by `delta` then land on `final_position`.
    ///
    /// Zero deltas and disabled smooth scrolling apply everything at once.
    fn start_job(
        &mut self,
        delta: ScrollDelta,
        final_position: AbsoluteMove,
        move_cursor: bool,
        done: Waiter,
    ) {
        let tx = if delta.is_zero() || !self.config.smooth_scroll {
            None
        } else {
            self.tx.upgrade()
        };
        match tx {
            Some(tx) => {
                self.animator
                    .start(tx, delta, final_position, move_cursor, done);
            },
            None => {
                if !delta.is_zero() {
                    self.scroll_view(TickScroll {
                        dx: delta.dx,
                        dy: delta.dy,
                        move_cursor,
                    });
                }
                self.set_pos(
                    final_position.row,
                    final_position.col,
                    final_position.notify_remote,
                );
                release(done);
            },
        }
    }

    /// Apply one scroll step. Bounds are reread first so a resize that landed
    /// mid-animation is honoured by the very next step.
    fn scroll_view(&mut self, tick: TickScroll) {
        self.refresh_bounds();
        let change = self
            .state
            .apply_scroll_delta(&*self.parts.metrics, tick.delta());
        if !change.applied.is_zero() {
            self.push_scrollbars();
        }
        if let Some(visible) = change.visible {
            self.parts.remote.scroll(visible);
        }
        if !tick.move_cursor {
            self.follow_cursor();
        }
    }

    /// Move the cursor, tell the remote if asked, redraw if it moved on screen.
    fn set_pos(&mut self, row: u32, col: u32, to_remote: bool) {
        let change = self.state.apply_absolute(&*self.parts.metrics, row, col);
        if to_remote {
            let (row, col) = (self.state.row, self.state.col);
            if self.state.selection {
                self.parts.remote.drag(row, col);
            } else {
                self.parts.remote.click(row, col);
            }
        }
        self.parts.surface.move_cursor(self.state.cursor);
        if change.moved() {
            self.parts.surface.request_redraw();
            self.parts.surface.move_cursor_line(self.state.cursor.y);
        }
    }

    fn follow_cursor(&mut self) {
        self.set_pos(self.state.row, self.state.col, false);
    }

    fn scrollbar_moved(&mut self, x: i32, y: i32) {
        self.refresh_bounds();
        if let Some(visible) = self.state.set_scroll(&*self.parts.metrics, x, y) {
            self.parts.remote.scroll(visible);
        }
        self.push_scrollbars();
        self.follow_cursor();
    }

    fn refresh_bounds(&mut self) {
        let bounds = ScrollValueBounds::new(
            self.parts.horizontal.maximum(),
            self.parts.vertical.maximum(),
        );
        if self.state.set_bounds(&*self.parts.metrics, bounds) {
            debug!(?bounds, "scroll offsets re-clamped");
            self.push_scrollbars();
            self.parts.remote.scroll(self.state.visible.clone());
        }
    }

    fn push_scrollbars(&mut self) {
        self.parts.horizontal.set_value(self.state.scroll_x);
        self.parts.vertical.set_value(self.state.scroll_y);
    }

    /// Reread size and scroll ranges after a resize.
    fn sync_frame(&mut self) {
        self.state.frame = self.parts.surface.size();
        self.refresh_bounds();
        let (x, y) = (self.state.scroll_x, self.state.scroll_y);
        if let Some(visible) = self.state.set_scroll(&*self.parts.metrics, x, y) {
            self.parts.remote.scroll(visible);
        }
        let line_height = self.parts.metrics.line_height() as i32;
        self.parts
            .surface
            .resize_cursor_line(self.state.frame.width, line_height);
        self.follow_cursor();
    }

    fn load_buffer(&mut self) {
        let style = self.gutter_style();
        self.gutter_width = gutter::gutter_width(self.parts.metrics.line_count(), &style);
        self.refresh_bounds();
        self.follow_cursor();
    }

    fn paint_gutter(&mut self) {
        let lines = gutter::project(
            self.state.visible.clone(),
            self.state.row,
            self.parts.metrics.line_count(),
            self.state.gutter_shift,
            &self.gutter_style(),
        );
        for line in lines {
            self.parts
                .surface
                .draw_text(line.x, line.y, &line.number.to_string());
        }
    }

    fn gutter_style(&self) -> GutterStyle {
        GutterStyle {
            relative: self.config.relative_line_numbers,
            padding: self.config.gutter_padding,
            char_width: self.parts.metrics.char_width(),
            line_height: self.parts.metrics.line_height(),
        }
    }

    fn geometry(&self) -> ViewGeometry {
        let bar = |bar: &dyn ScrollBar| if bar.is_visible() { bar.thickness() } else { 0 };
        ViewGeometry {
            scroll_x: self.state.scroll_x,
            scroll_y: self.state.scroll_y,
            width: self.state.frame.width,
            height: self.state.frame.height,
            bounds: self.state.bounds,
            char_width: self.parts.metrics.char_width().round() as i32,
            line_height: self.parts.metrics.line_height() as i32,
            vertical_bar: bar(&*self.parts.vertical),
            horizontal_bar: bar(&*self.parts.horizontal),
        }
    }

    fn snapshot(&self) -> ViewportSnapshot {
        ViewportSnapshot {
            state: self.state.clone(),
            job: self.animator.state(),
            gutter_width: self.gutter_width,
            smooth_scroll: self.config.smooth_scroll,
        }
    }
}

async fn forward_smooth_scrolls(
    mut rx: mpsc::Receiver<RelativeScroll>,
    tx: mpsc::Sender<Request>,
) {
    while let Some(scroll) = rx.recv().await {
        let (done, finished) = oneshot::channel();
        let request = Request::Intent {
            intent: ScrollIntent::RelativeScroll(scroll),
            done: Some(done),
        };
        if tx.send(request).await.is_err() {
            break;
        }
        let _ = finished.await;
    }
}

/// Resolves once a request and any animation it started are over.
///
/// An animation superseded by a later request also counts as over.
#[derive(Debug)]
pub struct Completion {
    window: u64,
    rx: oneshot::Receiver<()>,
}

impl Completion {
    pub async fn wait(self) -> Result<()> {
        self.rx
            .await
            .map_err(|_| Error::ReplyDropped { window: self.window })
    }
}

/// Cloneable producer side of a [`Window`].
#[derive(Debug, Clone)]
pub struct WindowHandle {
    id: u64,
    tx: mpsc::Sender<Request>,
    smooth_tx: mpsc::Sender<RelativeScroll>,
    enqueue_timeout: Duration,
}

impl WindowHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    async fn send(&self, request: Request) -> Result<()> {
        self.tx
            .send(request)
            .await
            .map_err(|_| Error::WindowClosed { window: self.id })
    }

    async fn send_tracked(&self, request: impl FnOnce(Waiter) -> Request) -> Result<Completion> {
        let (done, rx) = oneshot::channel();
        self.send(request(Some(done))).await?;
        Ok(Completion {
            window: self.id,
            rx,
        })
    }

    /// Queue any intent. Unlike [`WindowHandle::scroll`], a relative scroll
    /// sent this way is never dropped.
    pub async fn apply(&self, intent: ScrollIntent) -> Result<Completion> {
        self.send_tracked(|done| Request::Intent { intent, done })
            .await
    }

    /// Put the cursor at `(row, col)` without scrolling.
    pub async fn set_position(&self, row: u32, col: u32, notify_remote: bool) -> Result<()> {
        self.send(Request::Intent {
            intent: ScrollIntent::AbsoluteMove(AbsoluteMove {
                row,
                col,
                notify_remote,
            }),
            done: None,
        })
        .await
    }

    /// Shift the view by pixels right away.
    pub async fn tick_scroll(&self, dx: i32, dy: i32, move_cursor: bool) -> Result<()> {
        self.send(Request::Intent {
            intent: ScrollIntent::TickScroll(TickScroll {
                dx,
                dy,
                move_cursor,
            }),
            done: None,
        })
        .await
    }

    /// Mouse wheel: the view moves, the cursor stays on its line.
    pub async fn wheel(&self, dx: i32, dy: i32) -> Result<()> {
        self.tick_scroll(dx, dy, false).await
    }

    /// Begin an animated relative scroll. Best-effort, may coalesce.
    ///
    /// Returns `false` when the request was dropped: either it asks for
    /// nothing, or the gate stayed full past the enqueue timeout, or the
    /// window is gone.
    pub async fn scroll(
        &self,
        rows: i32,
        cols: i32,
        move_cursor: bool,
        keep_viewport_locked: bool,
    ) -> bool {
        if !move_cursor && !keep_viewport_locked {
            return false;
        }
        let scroll = RelativeScroll {
            rows,
            cols,
            move_cursor,
            keep_viewport_locked,
        };
        match self
            .smooth_tx
            .send_timeout(scroll, self.enqueue_timeout)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                debug!(window = self.id, ?scroll, %err, "smooth scroll dropped");
                false
            },
        }
    }

    /// Bring `(row, col)` into view, animated when smooth scrolling is on.
    pub async fn scroll_to_cursor(&self, row: u32, col: u32, move_cursor: bool) -> Result<Completion> {
        self.send_tracked(|done| Request::ScrollTo {
            row,
            col,
            move_cursor,
            done,
        })
        .await
    }

    /// Cursor position pushed by the remote buffer. Ignored when it matches
    /// the current cursor.
    pub async fn scroll_from_remote(&self, row: u32, col: u32) -> Result<()> {
        self.send(Request::RemotePosition { row, col }).await
    }

    /// The surface changed size or the scrollbars changed range.
    pub async fn resize(&self) -> Result<()> {
        self.send(Request::Resize).await
    }

    /// The user dragged a scrollbar to absolute offsets.
    pub async fn scrollbars_moved(&self, x: i32, y: i32) -> Result<()> {
        self.send(Request::ScrollbarMoved { x, y }).await
    }

    pub async fn set_selection(&self, active: bool) -> Result<()> {
        self.send(Request::Selection(active)).await
    }

    pub async fn set_smooth_scroll(&self, enabled: bool) -> Result<()> {
        self.send(Request::SmoothScroll(enabled)).await
    }

    /// The buffer was replaced or its line count changed.
    pub async fn buffer_loaded(&self) -> Result<()> {
        self.send(Request::BufferLoaded).await
    }

    /// The toolkit wants the gutter painted.
    pub async fn paint_gutter(&self) -> Result<()> {
        self.send(Request::PaintGutter).await
    }

    pub async fn snapshot(&self) -> Result<ViewportSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Snapshot(reply)).await?;
        rx.await.map_err(|_| Error::ReplyDropped { window: self.id })
    }
}
