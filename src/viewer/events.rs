//! Mouse and keyboard event handlers for `SyncGrid`.
//!
//! All methods here are `pub(crate)` helpers called from the
//! wasm-exported public API that lives in `mod.rs`.

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use js_sys::Function;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use super::{SharedState, SyncGrid};

#[cfg(target_arch = "wasm32")]
impl SyncGrid {
    pub(crate) fn invoke_render_callback(callback: Option<Function>) {
        if let Some(callback) = callback {
            let _ = callback.call0(&JsValue::NULL);
        }
    }

    /// Row index (into the filtered view) under a point in container
    /// coordinates, or `None` for the header band / past the last row.
    pub(crate) fn hit_test_row(s: &SharedState, _x: f32, y: f32) -> Option<usize> {
        let content_y = y - s.layout.header_height + s.viewport.scroll_y;
        if content_y < 0.0 {
            return None;
        }
        let row = s.layout.row_at_y(content_y);
        if row >= s.view_rows.len() {
            return None;
        }
        Some(row)
    }

    pub(crate) fn internal_click(state: &Rc<RefCell<SharedState>>, x: f32, y: f32) {
        let callback = {
            let mut s = state.borrow_mut();
            let Some(row) = Self::hit_test_row(&s, x, y) else {
                return;
            };
            let key = s
                .view_rows
                .get(row)
                .and_then(|&idx| s.records.records.get(idx))
                .map(|r| r.key.clone());
            // Clicking the selected row again clears the selection.
            s.selected = if s.selected == key { None } else { key };
            s.needs_render = true;
            s.render_callback.clone()
        };
        Self::invoke_render_callback(callback);
    }

    /// Keyboard navigation. Returns true when the key was handled (the
    /// caller prevents the default browser action).
    pub(crate) fn internal_key_down(state: &Rc<RefCell<SharedState>>, key: &str) -> bool {
        let (handled, callback) = {
            let mut s = state.borrow_mut();
            let handled = match key {
                "ArrowDown" => Self::move_selection(&mut s, 1),
                "ArrowUp" => Self::move_selection(&mut s, -1),
                "Escape" => s.selected.take().is_some(),
                _ => false,
            };
            if handled {
                s.needs_render = true;
            }
            (handled, s.render_callback.clone())
        };
        if handled {
            Self::invoke_render_callback(callback);
        }
        handled
    }

    /// Move the selection by `delta` rows within the filtered view,
    /// scrolling it into view. Returns true if anything changed.
    fn move_selection(s: &mut SharedState, delta: i32) -> bool {
        if s.view_rows.is_empty() {
            return false;
        }
        let current = s
            .selected
            .as_ref()
            .and_then(|key| Self::view_index_of_key(s, key));

        let next = match current {
            None => {
                if delta > 0 {
                    0
                } else {
                    s.view_rows.len() - 1
                }
            }
            Some(row) => {
                let candidate = if delta > 0 {
                    row.saturating_add(1)
                } else {
                    row.checked_sub(1).unwrap_or(0)
                };
                candidate.min(s.view_rows.len() - 1)
            }
        };

        let key = s
            .view_rows
            .get(next)
            .and_then(|&idx| s.records.records.get(idx))
            .map(|r| r.key.clone());
        let changed = key != s.selected;
        s.selected = key;

        // Keep the selection inside the viewport.
        let top = s.layout.row_top(next);
        let bottom = top + s.layout.row_height;
        if top < s.viewport.scroll_y {
            s.viewport.scroll_y = top;
        } else if bottom > s.viewport.scroll_y + s.viewport.height {
            s.viewport.scroll_y = bottom - s.viewport.height;
        }

        changed
    }

    /// Position of a record key within the filtered view.
    pub(crate) fn view_index_of_key(s: &SharedState, key: &str) -> Option<usize> {
        s.view_rows
            .iter()
            .position(|&idx| s.records.records.get(idx).is_some_and(|r| r.key == key))
    }
}
