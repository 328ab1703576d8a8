//! Viewport state management for scrolling.

use super::grid_layout::{floor_to_index, GridLayout};

/// Height used for the window math while the scroll container has not
/// been measured yet (offsetHeight of 0 during first layout).
const UNMEASURED_HEIGHT: f32 = 400.0;

/// Viewport state - represents the visible area of the grid.
#[derive(Debug, Clone)]
pub struct Viewport {
    /// Horizontal scroll position in content coordinates.
    pub scroll_x: f32,
    /// Vertical scroll position in content coordinates.
    pub scroll_y: f32,
    /// Viewport width in logical pixels.
    pub width: f32,
    /// Viewport height in logical pixels.
    pub height: f32,
}

/// The derived window of rows to render. Never stored; recomputed from
/// viewport state on every scroll/render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleWindow {
    /// First row to render (inclusive).
    pub start: usize,
    /// One past the last row to render.
    pub end: usize,
}

impl VisibleWindow {
    /// Number of rows in the window.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// Create a new viewport with default values.
    pub fn new() -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width: 800.0,
            height: 600.0,
        }
    }

    /// Compute the window of rows to render for the current scroll
    /// position, padded by the layout's overscan on both sides.
    ///
    /// Invariants (hold for any scroll position and row count, including
    /// a row set that shrank under the current scroll offset):
    /// - `start <= end <= row_count`
    /// - the window is non-empty whenever `row_count > 0` and the scroll
    ///   offset is inside the content
    /// - touched work is O(window length), never O(row_count)
    pub fn visible_window(&self, layout: &GridLayout) -> VisibleWindow {
        let rows = layout.row_count;
        if rows == 0 {
            return VisibleWindow { start: 0, end: 0 };
        }

        // A zero/unmeasured container height must not collapse the
        // window to nothing mid-load.
        let height = if self.height > 0.0 {
            self.height
        } else {
            UNMEASURED_HEIGHT
        };

        let first = floor_to_index(self.scroll_y / layout.row_height, rows);
        let last = floor_to_index((self.scroll_y + height) / layout.row_height, rows);

        let start = first.saturating_sub(layout.overscan);
        // `last` is the index of the row touching the viewport bottom;
        // +1 makes the bound exclusive before overscan padding.
        let end = last.saturating_add(1).saturating_add(layout.overscan).min(rows);

        VisibleWindow {
            start: start.min(end),
            end,
        }
    }

    /// Clamp scroll position to the valid content range.
    pub fn clamp_scroll(&mut self, layout: &GridLayout) {
        let max_x = (layout.total_width() - self.width).max(0.0);
        let max_y = (layout.total_height() - self.height).max(0.0);
        self.scroll_x = self.scroll_x.clamp(0.0, max_x);
        self.scroll_y = self.scroll_y.clamp(0.0, max_y);
    }

    /// Scroll by delta amounts.
    pub fn scroll_by(&mut self, delta_x: f32, delta_y: f32, layout: &GridLayout) {
        self.scroll_x += delta_x;
        self.scroll_y += delta_y;
        self.clamp_scroll(layout);
    }

    /// Set absolute scroll position.
    pub fn set_scroll(&mut self, x: f32, y: f32, layout: &GridLayout) {
        self.scroll_x = x;
        self.scroll_y = y;
        self.clamp_scroll(layout);
    }

    /// Resize the viewport.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Convert content coordinates to screen coordinates.
    pub fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.scroll_x, y - self.scroll_y)
    }

    /// Convert screen coordinates to content coordinates.
    pub fn to_content(&self, screen_x: f32, screen_y: f32) -> (f32, f32) {
        (screen_x + self.scroll_x, screen_y + self.scroll_y)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;
    use crate::layout::GridConfig;
    use crate::types::ColumnSpec;

    fn layout(rows: usize, row_height: f32, overscan: usize) -> GridLayout {
        let columns = vec![ColumnSpec {
            name: "a".to_string(),
            title: "A".to_string(),
            width: 100.0,
            format: None,
        }];
        let config = GridConfig {
            row_height,
            overscan,
            ..GridConfig::default()
        };
        GridLayout::new(&columns, rows, &config)
    }

    fn viewport(scroll_y: f32, height: f32) -> Viewport {
        Viewport {
            scroll_x: 0.0,
            scroll_y,
            width: 800.0,
            height,
        }
    }

    #[test]
    fn test_window_at_top() {
        let l = layout(1000, 20.0, 3);
        let w = viewport(0.0, 200.0).visible_window(&l);
        assert_eq!(w.start, 0);
        // 10 rows fill the viewport; +1 exclusive bound +3 overscan.
        assert_eq!(w.end, 14);
    }

    #[test]
    fn test_window_mid_scroll() {
        let l = layout(1000, 20.0, 3);
        let w = viewport(400.0, 200.0).visible_window(&l);
        assert_eq!(w.start, 17); // row 20 minus overscan
        assert_eq!(w.end, 34); // row 30 + 1 + overscan
        assert!(w.len() <= 10 + 1 + 2 * 3 + 1);
    }

    #[test]
    fn test_window_at_bottom_reaches_last_row() {
        let l = layout(100, 20.0, 2);
        // scroll_y = total_height - viewport_height
        let w = viewport(100.0 * 20.0 - 200.0, 200.0).visible_window(&l);
        assert_eq!(w.end, 100);
        assert!(w.start < w.end);
    }

    #[test]
    fn test_empty_rows_empty_window() {
        let l = layout(0, 20.0, 3);
        let w = viewport(0.0, 200.0).visible_window(&l);
        assert!(w.is_empty());
        assert_eq!(w.start, 0);
        assert_eq!(w.end, 0);
    }

    #[test]
    fn test_zero_height_container_does_not_collapse() {
        let l = layout(1000, 20.0, 3);
        let w = viewport(0.0, 0.0).visible_window(&l);
        assert!(!w.is_empty());
        assert!(w.end <= 1000);
    }

    #[test]
    fn test_shrunk_row_set_clamps() {
        // Scrolled deep into a 10k-row set, then a filter cut it to 50.
        let l = layout(50, 20.0, 3);
        let w = viewport(9000.0 * 20.0, 200.0).visible_window(&l);
        assert!(w.start <= w.end);
        assert!(w.end <= 50);
    }

    #[test]
    fn test_window_invariants_across_offsets() {
        let l = layout(317, 28.0, 4);
        let total = l.total_height();
        let mut s = 0.0;
        while s < total {
            let w = viewport(s, 240.0).visible_window(&l);
            assert!(w.start <= w.end, "start <= end at {s}");
            assert!(w.end <= 317, "end <= rows at {s}");
            assert!(!w.is_empty(), "non-empty window at {s}");
            s += 97.0;
        }
    }

    #[test]
    fn test_offset_y_tracks_start_row() {
        let l = layout(1000, 20.0, 3);
        let w = viewport(400.0, 200.0).visible_window(&l);
        // Rendered rows are translated by the start row's top edge.
        assert_eq!(l.row_top(w.start), 17.0 * 20.0);
    }

    #[test]
    fn test_clamp_scroll() {
        let l = layout(10, 20.0, 0);
        let mut vp = viewport(0.0, 100.0);
        vp.scroll_by(0.0, 10_000.0, &l);
        assert_eq!(vp.scroll_y, 10.0 * 20.0 - 100.0);
        vp.scroll_by(0.0, -10_000.0, &l);
        assert_eq!(vp.scroll_y, 0.0);
        // Content shorter than the viewport pins scroll to 0.
        let short = layout(2, 20.0, 0);
        vp.set_scroll(0.0, 50.0, &short);
        assert_eq!(vp.scroll_y, 0.0);
    }
}
