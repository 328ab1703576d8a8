//! Integration tests for the row windowing math.
//!
//! These exercise the invariants the grid relies on: the rendered slice
//! is bounded, indices never leave `[0, row_count]`, and the scroll
//! track always reflects the true content length.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use test_case::test_case;

use syncview::layout::{GridConfig, GridLayout, Viewport};
use syncview::types::ColumnSpec;

fn columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec {
            name: "asset_tag".to_string(),
            title: "Asset tag".to_string(),
            width: 140.0,
            format: None,
        },
        ColumnSpec {
            name: "cost".to_string(),
            title: "Cost".to_string(),
            width: 100.0,
            format: Some(syncview::numfmt::ValueFormat::Currency),
        },
    ]
}

fn layout(rows: usize, row_height: f32, overscan: usize) -> GridLayout {
    let config = GridConfig {
        row_height,
        overscan,
        ..GridConfig::default()
    };
    GridLayout::new(&columns(), rows, &config)
}

fn viewport(scroll_y: f32, height: f32) -> Viewport {
    Viewport {
        scroll_x: 0.0,
        scroll_y,
        width: 800.0,
        height,
    }
}

/// For all in-content scroll offsets with rows present, the window is
/// non-empty and within bounds.
#[test_case(1, 20.0 ; "single row")]
#[test_case(10, 20.0 ; "one screen")]
#[test_case(1_000, 20.0 ; "many rows")]
#[test_case(100_000, 28.0 ; "huge row count")]
fn test_window_never_empty_inside_content(rows: usize, row_height: f32) {
    let l = layout(rows, row_height, 3);
    let total = l.total_height();
    let step = total / 23.0 + 1.0;
    let mut scroll = 0.0;
    while scroll < total {
        let w = viewport(scroll, 240.0).visible_window(&l);
        assert!(!w.is_empty(), "empty window at scroll {scroll}");
        assert!(w.start <= w.end);
        assert!(w.end <= rows);
        scroll += step;
    }
}

/// Scrolling to the exact bottom renders through the last row.
#[test]
fn test_bottom_scroll_includes_last_row() {
    let l = layout(500, 20.0, 2);
    let height = 300.0;
    let w = viewport(l.total_height() - height, height).visible_window(&l);
    assert_eq!(w.end, 500);
}

/// The window cost is bounded by the viewport, not the row count.
#[test]
fn test_window_size_independent_of_row_count() {
    let small = layout(100, 20.0, 3);
    let large = layout(1_000_000, 20.0, 3);
    let w_small = viewport(500.0, 200.0).visible_window(&small);
    let w_large = viewport(500.0, 200.0).visible_window(&large);
    assert_eq!(w_small.len(), w_large.len());
    // 10 rows visible + 1 boundary + 3 overscan each side.
    assert!(w_large.len() <= 17);
}

/// Shrinking the row set (a filter) while scrolled far down clamps the
/// window instead of producing out-of-range indices.
#[test]
fn test_filter_shrink_clamps() {
    let mut l = layout(10_000, 20.0, 3);
    let deep = viewport(9_500.0 * 20.0, 200.0);

    l.set_row_count(37);
    let w = deep.visible_window(&l);
    assert!(w.start <= w.end);
    assert!(w.end <= 37);

    l.set_row_count(0);
    let w = deep.visible_window(&l);
    assert!(w.is_empty());
}

/// Scroll-track height always equals rows * row_height.
#[test_case(0 ; "empty")]
#[test_case(1 ; "one")]
#[test_case(12_345 ; "many")]
fn test_scroll_track_height(rows: usize) {
    let l = layout(rows, 28.0, 3);
    assert_eq!(l.total_height(), rows as f32 * 28.0);
}

/// An unmeasured (zero-height) container must not crash or collapse the
/// window.
#[test]
fn test_zero_height_container() {
    let l = layout(200, 20.0, 3);
    let w = viewport(0.0, 0.0).visible_window(&l);
    assert!(!w.is_empty());
    assert!(w.end <= 200);
}

/// Negative scroll (elastic overscroll) clamps to the top.
#[test]
fn test_negative_scroll_clamps() {
    let l = layout(200, 20.0, 3);
    let mut vp = viewport(0.0, 240.0);
    vp.scroll_by(0.0, -500.0, &l);
    assert_eq!(vp.scroll_y, 0.0);
    let w = vp.visible_window(&l);
    assert_eq!(w.start, 0);
}

/// Overscan extends the window symmetrically where content allows.
#[test]
fn test_overscan_padding() {
    let no_overscan = layout(1_000, 20.0, 0);
    let with_overscan = layout(1_000, 20.0, 5);
    let vp = viewport(400.0, 200.0);

    let bare = vp.visible_window(&no_overscan);
    let padded = vp.visible_window(&with_overscan);
    assert_eq!(bare.start - padded.start, 5);
    assert_eq!(padded.end - bare.end, 5);
}
