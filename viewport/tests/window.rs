use glide_viewport::{
    headless::{HeadlessScrollBar, HeadlessSurface, MonospaceMetrics, RecordingRemote, RemoteCall},
    Config, Error, FrameSize, JobState, PixelPoint, RelativeScroll, ScrollBar, ScrollIntent, Window,
    WindowHandle, WindowParts,
};
use std::time::Duration;
use tokio::task::JoinHandle;

const CHAR_WIDTH: f64 = 10.0;
const LINE_HEIGHT: f64 = 20.0;
const BAR: i32 = 10;

struct Fixture {
    window: WindowHandle,
    consumer: JoinHandle<()>,
    surface: HeadlessSurface,
    vertical: HeadlessScrollBar,
    remote: RecordingRemote,
    metrics: MonospaceMetrics,
}

fn fixture(text: &str, size: FrameSize, config: Config) -> Fixture {
    glide_log::test();
    let metrics = MonospaceMetrics::from_text(text, CHAR_WIDTH, LINE_HEIGHT);
    let surface = HeadlessSurface::new(size);
    let vertical = HeadlessScrollBar::for_content(metrics.content_height(), size.height, BAR);
    let horizontal = HeadlessScrollBar::for_content(metrics.content_width(), size.width, BAR);
    let remote = RecordingRemote::default();
    let (window, consumer) = Window::spawn(
        WindowParts {
            surface: Box::new(surface.clone()),
            vertical: Box::new(vertical.clone()),
            horizontal: Box::new(horizontal),
            remote: Box::new(remote.clone()),
            metrics: Box::new(metrics.clone()),
        },
        config,
    );
    Fixture {
        window,
        consumer,
        surface,
        vertical,
        remote,
        metrics,
    }
}

/// 100 lines of 40 columns: 2000 by 400 pixels of content.
fn hundred_lines() -> String {
    vec!["x".repeat(40); 100].join("\n")
}

fn tall(config: Config) -> Fixture {
    fixture(&hundred_lines(), FrameSize::new(400, 200), config)
}

fn no_smooth() -> Config {
    Config {
        smooth_scroll: false,
        ..Config::default()
    }
}

/// Long enough for any animation to run out.
async fn settle() {
    tokio::time::sleep(Duration::from_secs(1)).await;
}

#[tokio::test(start_paused = true)]
async fn locked_scroll_on_short_buffer_moves_cursor_into_view() {
    // Rows 0 and 1 visible, row 2 below the fold.
    let fx = fixture("one\ntwo\nthree", FrameSize::new(400, 30), Config::default());
    let before = fx.window.snapshot().await.unwrap();
    assert_eq!(before.state.visible, 0..2);

    assert!(fx.window.scroll(2, 0, true, true).await);
    settle().await;

    let after = fx.window.snapshot().await.unwrap();
    assert_eq!((after.state.row, after.state.col), (2, 0));
    assert!(after.state.visible.contains(&2));
    assert_eq!(after.state.scroll_y, 30);
    assert_eq!(after.state.cursor, PixelPoint::new(0, 10));
    assert_eq!(after.job, JobState::Completed);
    assert_eq!(
        fx.remote.cursor_calls(),
        vec![RemoteCall::Click { row: 2, col: 0 }]
    );
}

#[tokio::test(start_paused = true)]
async fn jump_without_smooth_scrolling_redraws_once() {
    let fx = fixture(&hundred_lines(), FrameSize::new(400, 60), no_smooth());
    fx.window.snapshot().await.unwrap();
    let redraws = fx.surface.redraws();

    fx.window
        .scroll_to_cursor(5, 3, true)
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!((snapshot.state.row, snapshot.state.col), (5, 3));
    assert_eq!(snapshot.state.scroll_y, 80);
    assert_eq!(snapshot.state.cursor, PixelPoint::new(30, 20));
    assert_eq!(snapshot.job, JobState::Idle);
    assert_eq!(fx.vertical.value(), 80);
    assert_eq!(fx.surface.redraws(), redraws + 1);
    assert_eq!(fx.surface.log().cursor_line_y, 20);
}

#[tokio::test(start_paused = true)]
async fn remote_push_at_cursor_is_ignored() {
    let fx = tall(Config::default());
    fx.window.snapshot().await.unwrap();
    let calls = fx.remote.calls();
    let redraws = fx.surface.redraws();

    fx.window.scroll_from_remote(0, 0).await.unwrap();
    settle().await;

    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!(snapshot.job, JobState::Idle);
    assert_eq!(snapshot.state.scroll_y, 0);
    assert_eq!(fx.remote.calls(), calls);
    assert_eq!(fx.surface.redraws(), redraws);
}

#[tokio::test(start_paused = true)]
async fn remote_push_scrolls_without_echoing_back() {
    let fx = tall(Config::default());

    fx.window.scroll_from_remote(10, 2).await.unwrap();
    settle().await;

    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!((snapshot.state.row, snapshot.state.col), (10, 2));
    assert_eq!(snapshot.state.scroll_y, 40);
    assert_eq!(snapshot.state.cursor, PixelPoint::new(20, 160));
    assert_eq!(snapshot.job, JobState::Completed);
    assert!(fx.remote.cursor_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn superseding_scroll_lands_exactly_once() {
    let fx = tall(Config::default());

    let first = fx.window.scroll_to_cursor(60, 0, true).await.unwrap();
    let second = fx.window.scroll_to_cursor(90, 0, true).await.unwrap();
    first.wait().await.unwrap();
    second.wait().await.unwrap();
    settle().await;

    // 1040 to reveal row 60, then 600 more for row 90. A stale step from the
    // first job would show up as extra distance.
    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!(snapshot.state.row, 90);
    assert_eq!(snapshot.state.scroll_y, 1640);
    assert_eq!(snapshot.state.cursor, PixelPoint::new(0, 160));
    assert_eq!(snapshot.job, JobState::Completed);
    assert_eq!(fx.vertical.value(), 1640);
}

#[tokio::test(start_paused = true)]
async fn locked_scroll_preempted_mid_flight_keeps_both_cursor_moves() {
    let fx = tall(Config::default());

    let first = fx
        .window
        .apply(ScrollIntent::RelativeScroll(RelativeScroll {
            rows: 30,
            cols: 0,
            move_cursor: true,
            keep_viewport_locked: true,
        }))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;

    // A few ticks of the 600 pixel jump are on screen.
    let midway = fx.window.snapshot().await.unwrap();
    assert_eq!(midway.job, JobState::Running);
    assert!(
        midway.state.scroll_y > 0 && midway.state.scroll_y < 600,
        "scroll_y {}",
        midway.state.scroll_y
    );
    assert_eq!(midway.state.row, 0);

    let second = fx
        .window
        .apply(ScrollIntent::RelativeScroll(RelativeScroll {
            rows: 30,
            cols: 0,
            move_cursor: true,
            keep_viewport_locked: true,
        }))
        .await
        .unwrap();
    first.wait().await.unwrap();
    second.wait().await.unwrap();
    settle().await;

    // Cursor and view moved together twice; a stale step from the first job
    // would push the view past 1200.
    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!(snapshot.state.row, 60);
    assert_eq!(snapshot.state.scroll_y, 1200);
    assert_eq!(snapshot.state.cursor, PixelPoint::new(0, 0));
    assert_eq!(snapshot.state.visible, 60..71);
    assert_eq!(snapshot.job, JobState::Completed);
    assert_eq!(fx.vertical.value(), 1200);
    assert_eq!(
        fx.remote.cursor_calls(),
        vec![
            RemoteCall::Click { row: 30, col: 0 },
            RemoteCall::Click { row: 60, col: 0 },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn scroll_to_cursor_preempting_relative_scroll_lands_its_cursor_move() {
    let fx = tall(Config::default());

    // Row 30 needs 440 pixels to clear the bottom padding.
    assert!(fx.window.scroll(30, 0, true, false).await);
    tokio::time::sleep(Duration::from_millis(20)).await;
    let midway = fx.window.snapshot().await.unwrap();
    assert_eq!(midway.job, JobState::Running);
    assert!(
        midway.state.scroll_y > 0 && midway.state.scroll_y < 440,
        "scroll_y {}",
        midway.state.scroll_y
    );

    fx.window
        .scroll_to_cursor(2, 0, false)
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();
    settle().await;

    // The relative scroll caught up to 440 and landed on row 30, then the
    // view went back to reveal row 2 with the cursor left where it was.
    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!((snapshot.state.row, snapshot.state.col), (30, 0));
    assert_eq!(snapshot.state.scroll_y, 20);
    assert_eq!(snapshot.state.cursor, PixelPoint::new(0, 580));
    assert_eq!(snapshot.job, JobState::Completed);
    assert_eq!(
        fx.remote.cursor_calls(),
        vec![RemoteCall::Click { row: 30, col: 0 }]
    );
}

#[tokio::test(start_paused = true)]
async fn targets_clamp_to_buffer_and_scroll_range() {
    let fx = tall(Config::default());

    fx.window
        .scroll_to_cursor(500, 999, true)
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!((snapshot.state.row, snapshot.state.col), (99, 39));
    assert_eq!(snapshot.state.scroll_y, 1800);
    assert_eq!(snapshot.state.scroll_x, 0);
    assert_eq!(snapshot.state.cursor, PixelPoint::new(390, 180));
    assert_eq!(snapshot.state.visible, 90..101);
}

#[tokio::test(start_paused = true)]
async fn scrolling_up_at_the_top_does_nothing() {
    let fx = tall(Config::default());

    assert!(fx.window.scroll(-5, 0, true, false).await);
    settle().await;

    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!(snapshot.state.row, 0);
    assert_eq!(snapshot.job, JobState::Idle);
    assert!(fx.remote.cursor_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn scroll_asking_for_nothing_is_refused() {
    let fx = tall(Config::default());
    assert!(!fx.window.scroll(3, 0, false, false).await);
}

#[tokio::test(start_paused = true)]
async fn busy_gate_drops_relative_scrolls() {
    let fx = tall(Config::default());

    // The first is admitted straight away, the second waits in the gate, the
    // third times out while the first is still animating.
    assert!(fx.window.scroll(30, 0, true, true).await);
    assert!(fx.window.scroll(30, 0, true, true).await);
    assert!(!fx.window.scroll(30, 0, true, true).await);
    settle().await;

    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!(snapshot.state.row, 60);
    assert_eq!(snapshot.state.scroll_y, 1200);
    assert_eq!(
        fx.remote.cursor_calls(),
        vec![
            RemoteCall::Click { row: 30, col: 0 },
            RemoteCall::Click { row: 60, col: 0 },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn locked_scroll_drags_cursor_that_would_leave_view() {
    let fx = tall(Config::default());

    assert!(fx.window.scroll(5, 0, false, true).await);
    settle().await;

    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!(snapshot.state.row, 5);
    assert_eq!(snapshot.state.scroll_y, 100);
    assert_eq!(
        fx.remote.cursor_calls(),
        vec![RemoteCall::Click { row: 5, col: 0 }]
    );
}

#[tokio::test(start_paused = true)]
async fn locked_scroll_leaves_cursor_that_stays_visible() {
    let fx = tall(Config::default());
    fx.window.set_position(8, 0, false).await.unwrap();

    assert!(fx.window.scroll(2, 0, false, true).await);
    settle().await;

    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!(snapshot.state.row, 8);
    assert_eq!(snapshot.state.scroll_y, 40);
    assert_eq!(snapshot.state.cursor, PixelPoint::new(0, 120));
    assert!(fx.remote.cursor_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn horizontal_moves_set_sticky_column() {
    let fx = tall(Config::default());
    fx.window.set_position(0, 12, false).await.unwrap();
    fx.window.snapshot().await.unwrap();
    fx.metrics.unload(1);

    // Row 1 is not loaded yet, so the column clamps to 0 there, but the
    // sticky column brings it back on row 2.
    assert!(fx.window.scroll(1, 0, true, false).await);
    settle().await;
    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!((snapshot.state.row, snapshot.state.col), (1, 0));
    assert_eq!(snapshot.state.sticky_col, 12);

    assert!(fx.window.scroll(1, 0, true, false).await);
    settle().await;
    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!((snapshot.state.row, snapshot.state.col), (2, 12));

    assert!(fx.window.scroll(0, -2, true, false).await);
    settle().await;
    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!((snapshot.state.col, snapshot.state.sticky_col), (10, 10));
}

#[tokio::test(start_paused = true)]
async fn wheel_moves_view_and_keeps_cursor_row() {
    let fx = tall(Config::default());

    fx.window.wheel(0, 45).await.unwrap();

    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!(snapshot.state.row, 0);
    assert_eq!(snapshot.state.scroll_y, 45);
    assert_eq!(snapshot.state.cursor, PixelPoint::new(0, -45));
    assert_eq!(snapshot.state.visible, 2..13);
    assert_eq!(snapshot.state.gutter_shift, -5);
    assert_eq!(
        fx.remote.calls().last(),
        Some(&RemoteCall::Scroll { visible: 2..13 })
    );
}

#[tokio::test(start_paused = true)]
async fn extreme_wheel_deltas_clamp_and_keep_the_window_alive() {
    let fx = tall(Config::default());

    fx.window.wheel(0, 50).await.unwrap();
    fx.window.wheel(i32::MAX, i32::MAX).await.unwrap();
    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!((snapshot.state.scroll_x, snapshot.state.scroll_y), (0, 1800));
    assert_eq!(snapshot.state.visible, 90..101);

    fx.window.tick_scroll(i32::MIN, i32::MIN, false).await.unwrap();
    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!((snapshot.state.scroll_x, snapshot.state.scroll_y), (0, 0));
    assert_eq!(fx.vertical.value(), 0);
}

#[tokio::test(start_paused = true)]
async fn scrollbar_drag_sets_offsets() {
    let fx = tall(Config::default());

    fx.window.scrollbars_moved(0, 300).await.unwrap();

    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!(snapshot.state.scroll_y, 300);
    assert_eq!(snapshot.state.visible, 15..26);
    assert_eq!(snapshot.state.cursor, PixelPoint::new(0, -300));
    assert_eq!(fx.vertical.value(), 300);
}

#[tokio::test(start_paused = true)]
async fn resize_pulls_offsets_back_into_range() {
    let fx = tall(no_smooth());
    fx.window
        .scroll_to_cursor(99, 0, true)
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert_eq!(fx.window.snapshot().await.unwrap().state.scroll_y, 1800);

    fx.surface.set_size(FrameSize::new(400, 400));
    fx.vertical
        .set_maximum(fx.metrics.content_height() - 400);
    fx.window.resize().await.unwrap();

    let snapshot = fx.window.snapshot().await.unwrap();
    assert_eq!(snapshot.state.frame, FrameSize::new(400, 400));
    assert_eq!(snapshot.state.scroll_y, 1600);
    assert_eq!(snapshot.state.visible, 80..101);
    assert_eq!(snapshot.state.cursor, PixelPoint::new(0, 380));
    assert_eq!(fx.surface.log().cursor_line_size, (400, 20));
}

#[tokio::test(start_paused = true)]
async fn selection_turns_clicks_into_drags() {
    let fx = tall(Config::default());

    fx.window.set_position(3, 1, true).await.unwrap();
    fx.window.set_selection(true).await.unwrap();
    fx.window.set_position(5, 2, true).await.unwrap();
    fx.window.snapshot().await.unwrap();

    assert_eq!(
        fx.remote.cursor_calls(),
        vec![
            RemoteCall::Click { row: 3, col: 1 },
            RemoteCall::Drag { row: 5, col: 2 },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn gutter_shows_relative_numbers() {
    let fx = tall(Config::default());
    fx.window.set_position(3, 0, false).await.unwrap();
    fx.window.paint_gutter().await.unwrap();
    let snapshot = fx.window.snapshot().await.unwrap();

    let drawn = fx.surface.take_drawn();
    assert_eq!(snapshot.gutter_width, 50);
    assert_eq!(drawn.len(), 11);
    assert_eq!(drawn[0], (30, 0, "3".to_string()));
    assert_eq!(drawn[3], (30, 60, "4".to_string()));
    assert_eq!(drawn[10], (30, 200, "7".to_string()));
}

#[tokio::test(start_paused = true)]
async fn gutter_shows_absolute_numbers() {
    let fx = tall(Config {
        relative_line_numbers: false,
        ..Config::default()
    });
    fx.window.wheel(0, 45).await.unwrap();
    fx.window.paint_gutter().await.unwrap();
    fx.window.snapshot().await.unwrap();

    let drawn = fx.surface.take_drawn();
    assert_eq!(drawn.first(), Some(&(30, -5, "3".to_string())));
    assert_eq!(drawn.last(), Some(&(20, 195, "13".to_string())));
}

#[tokio::test(start_paused = true)]
async fn smooth_scrolling_can_be_turned_off() {
    let fx = tall(Config::default());
    fx.window.set_smooth_scroll(false).await.unwrap();

    let done = fx.window.scroll_to_cursor(50, 0, true).await.unwrap();
    let snapshot = fx.window.snapshot().await.unwrap();
    assert!(!snapshot.smooth_scroll);
    assert!(!snapshot.animating());
    assert_eq!(snapshot.state.row, 50);
    done.wait().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn buffer_reload_recomputes_gutter_width() {
    let fx = fixture("a\nb\nc", FrameSize::new(400, 200), Config::default());
    assert_eq!(fx.window.snapshot().await.unwrap().gutter_width, 30);

    fx.metrics.set_lines(vec![Some("a".to_string()); 1200]);
    fx.window.buffer_loaded().await.unwrap();
    assert_eq!(fx.window.snapshot().await.unwrap().gutter_width, 60);
}

#[tokio::test(start_paused = true)]
async fn consumer_stops_when_handles_drop() {
    let fx = tall(Config::default());
    let Fixture {
        window, consumer, ..
    } = fx;
    drop(window);
    consumer.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn closed_window_reports_error() {
    let fx = tall(Config::default());
    fx.consumer.abort();
    let _ = fx.consumer.await;

    let err = fx.window.snapshot().await.unwrap_err();
    assert!(matches!(err, Error::WindowClosed { .. }));
}
