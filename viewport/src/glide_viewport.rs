//! Smooth-scrolling viewport for an editor window mirroring a remote buffer.
//!
//! The buffer itself lives in a remote service. A window only knows its
//! layout ([`BufferMetrics`]), where it draws ([`RenderSurface`]), its
//! scrollbars ([`ScrollBar`]) and how to tell the service about cursor moves
//! and visible rows ([`RemoteBuffer`]).
//!
//! # Architecture
//!
//! ```text
//! WindowHandle ──► request queue ──► Window ──► ViewportState
//!                        ▲             │
//!                        │             ├──► surface / scrollbars / remote
//!                        │             ▼
//!                        └──────── animation job (Trajectory)
//! ```
//!
//! - [`position`]: pixel math, padding, how far to scroll to reveal a point.
//! - [`ViewportState`]: scroll offsets, cursor, visible rows.
//! - [`Trajectory`]: splits a scroll distance into per-tick steps.
//! - [`Window`]: the single consumer that applies every request in order and
//!   runs at most one animation job.
//! - [`gutter`]: line number layout for the visible rows.
//!
//! # Usage
//!
//! ```ignore
//! let (window, consumer) = Window::spawn(parts, Config::default());
//! window.scroll(3, 0, true, true).await;
//! window.scroll_to_cursor(120, 4, true).await?.wait().await?;
//! let snapshot = window.snapshot().await?;
//! ```
mod animation;
mod config;
mod error;
pub mod gutter;
pub mod headless;
pub mod position;
mod request;
mod state;
mod surface;
mod trajectory;
mod window;

pub use animation::{JobId, JobOutcome, JobState};
pub use config::Config;
pub use error::{Error, Result};
pub use gutter::{GutterLine, GutterStyle};
pub use position::{Padding, PixelPoint, ScrollDelta, ScrollValueBounds, ViewGeometry};
pub use request::{AbsoluteMove, RelativeScroll, ScrollIntent, TickScroll, ViewportSnapshot};
pub use state::{PositionChange, ScrollChange, ViewportState};
pub use surface::{BufferMetrics, FrameSize, RemoteBuffer, RenderSurface, ScrollBar};
pub use trajectory::Trajectory;
pub use window::{Completion, Window, WindowHandle, WindowParts};
