//! `glide replay`: drive a headless window from a script and report what the
//! collaborators saw.

use crate::{
    cli::ReplayArgs,
    paths,
    script::{self, Step},
};
use anyhow::{Context, Result};
use glide_viewport::{
    headless::{HeadlessScrollBar, HeadlessSurface, MonospaceMetrics, RecordingRemote, RemoteCall},
    Config, FrameSize, ScrollBar, ViewportSnapshot, Window, WindowHandle, WindowParts,
};
use std::{fmt, path::Path, time::Duration};
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub const CHAR_WIDTH: f64 = 8.0;
pub const LINE_HEIGHT: f64 = 16.0;
const BAR_THICKNESS: i32 = 12;

pub async fn handle(args: ReplayArgs, config_override: Option<&Path>) -> Result<()> {
    let discovered = std::env::current_dir()
        .ok()
        .and_then(|dir| paths::discover_config(&dir));
    let mut config = Config::load_with_overrides(config_override, discovered.as_deref())?;
    if args.no_smooth {
        config.smooth_scroll = false;
    }

    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let source = match &args.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?,
        None => std::io::read_to_string(std::io::stdin()).context("Failed to read script from stdin")?,
    };
    let steps = script::parse(&source)?;

    info!(file = %args.file.display(), steps = steps.len(), "replaying");
    let mut replay = Replay::start(&text, FrameSize::new(args.width, args.height), config);
    for step in steps {
        replay.step(step).await?;
    }
    let report = replay.finish().await?;
    print!("{report}");
    Ok(())
}

/// A window on headless collaborators, with the caller's side of each one.
pub struct Replay {
    window: WindowHandle,
    consumer: JoinHandle<()>,
    tick: Duration,
    surface: HeadlessSurface,
    vertical: HeadlessScrollBar,
    horizontal: HeadlessScrollBar,
    remote: RecordingRemote,
    metrics: MonospaceMetrics,
    dropped: usize,
}

impl Replay {
    /// Spawn the window. Must be called inside a tokio runtime.
    pub fn start(text: &str, size: FrameSize, config: Config) -> Self {
        let metrics = MonospaceMetrics::from_text(text, CHAR_WIDTH, LINE_HEIGHT);
        let surface = HeadlessSurface::new(size);
        let vertical =
            HeadlessScrollBar::for_content(metrics.content_height(), size.height, BAR_THICKNESS);
        let horizontal =
            HeadlessScrollBar::for_content(metrics.content_width(), size.width, BAR_THICKNESS);
        let remote = RecordingRemote::default();
        let tick = config.tick_interval();

        let parts = WindowParts {
            surface: Box::new(surface.clone()),
            vertical: Box::new(vertical.clone()),
            horizontal: Box::new(horizontal.clone()),
            remote: Box::new(remote.clone()),
            metrics: Box::new(metrics.clone()),
        };
        let (window, consumer) = Window::spawn(parts, config);
        Self {
            window,
            consumer,
            tick,
            surface,
            vertical,
            horizontal,
            remote,
            metrics,
            dropped: 0,
        }
    }

    pub async fn step(&mut self, step: Step) -> Result<()> {
        debug!(?step, "replay step");
        match step {
            Step::Down(n) => self.relative(lines(n), 0, false).await,
            Step::Up(n) => self.relative(-lines(n), 0, false).await,
            Step::Left(n) => self.relative(0, -lines(n), false).await,
            Step::Right(n) => self.relative(0, lines(n), false).await,
            Step::Page(pages) => {
                let rows = (f64::from(self.surface.log().size.height) / LINE_HEIGHT) as i32;
                self.relative(pages.saturating_mul(rows), 0, true).await;
            },
            Step::Goto { row, col } => {
                self.window
                    .scroll_to_cursor(row, col, true)
                    .await?
                    .wait()
                    .await?;
            },
            Step::Remote { row, col } => self.window.scroll_from_remote(row, col).await?,
            Step::Wheel { dx, dy } => self.window.wheel(dx, dy).await?,
            Step::Resize { width, height } => {
                self.surface.set_size(FrameSize::new(width, height));
                self.vertical
                    .set_maximum(self.metrics.content_height() - height);
                self.horizontal
                    .set_maximum(self.metrics.content_width() - width);
                self.window.resize().await?;
            },
            Step::Select(active) => self.window.set_selection(active).await?,
            Step::Wait(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
            Step::Paint => self.window.paint_gutter().await?,
        }
        Ok(())
    }

    async fn relative(&mut self, rows: i32, cols: i32, keep_viewport_locked: bool) {
        if !self.window.scroll(rows, cols, true, keep_viewport_locked).await {
            self.dropped += 1;
        }
    }

    /// Wait until no animation runs and the state stops changing.
    pub async fn settle(&self) -> Result<ViewportSnapshot> {
        let mut previous = None;
        loop {
            tokio::time::sleep(self.tick).await;
            let snapshot = self.window.snapshot().await?;
            if !snapshot.animating() && previous.as_ref() == Some(&snapshot) {
                return Ok(snapshot);
            }
            previous = Some(snapshot);
        }
    }

    /// Settle, paint the gutter once more and shut the window down.
    pub async fn finish(self) -> Result<Report> {
        self.settle().await?;
        self.surface.take_drawn();
        self.window.paint_gutter().await?;
        let snapshot = self.window.snapshot().await?;

        let Self {
            window,
            consumer,
            surface,
            vertical,
            remote,
            dropped,
            ..
        } = self;
        drop(window);
        consumer.await.context("window consumer panicked")?;

        Ok(Report {
            snapshot,
            max_scroll_y: vertical.maximum(),
            redraws: surface.redraws(),
            gutter: surface.take_drawn(),
            remote_calls: remote.calls(),
            dropped,
        })
    }
}

fn lines(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// What a replay left behind.
#[derive(Debug, Clone)]
pub struct Report {
    pub snapshot: ViewportSnapshot,
    pub max_scroll_y: i32,
    pub redraws: usize,
    pub gutter: Vec<(i32, i32, String)>,
    pub remote_calls: Vec<RemoteCall>,
    /// Relative scrolls turned away because an animation was still running.
    pub dropped: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = &self.snapshot.state;
        writeln!(
            f,
            "cursor   row {}, col {} at ({}, {})",
            state.row, state.col, state.cursor.x, state.cursor.y
        )?;
        writeln!(
            f,
            "scroll   x {}, y {} of {}",
            state.scroll_x, state.scroll_y, self.max_scroll_y
        )?;
        writeln!(f, "visible  {}..{}", state.visible.start, state.visible.end)?;
        writeln!(f, "redraws  {}", self.redraws)?;
        writeln!(f, "dropped  {}", self.dropped)?;

        writeln!(f, "remote")?;
        for call in &self.remote_calls {
            match call {
                RemoteCall::Click { row, col } => writeln!(f, "  click {row} {col}")?,
                RemoteCall::Drag { row, col } => writeln!(f, "  drag {row} {col}")?,
                RemoteCall::Scroll { visible } => {
                    writeln!(f, "  scroll {}..{}", visible.start, visible.end)?
                },
            }
        }

        writeln!(f, "gutter   width {}", self.snapshot.gutter_width)?;
        for (x, y, number) in &self.gutter {
            writeln!(f, "  {x:>4} {y:>5}  {number}")?;
        }
        Ok(())
    }
}
