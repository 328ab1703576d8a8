//! Scroll-related logic for `SyncGrid`.
//!
//! Includes viewport scroll state management and scroll settle timeout
//! scheduling.

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use super::{now_ms, SharedState, SyncGrid};

/// Delay (ms) after scroll stops before triggering a settle render.
#[cfg(target_arch = "wasm32")]
const SCROLL_SETTLE_DELAY_MS: u32 = 100;

#[cfg(target_arch = "wasm32")]
impl SyncGrid {
    /// Apply a scroll delta to the shared state, clamped to content
    /// bounds. Returns the applied delta, or `None` if the position did
    /// not change.
    pub(crate) fn scroll_state(
        s: &mut SharedState,
        delta_x: f32,
        delta_y: f32,
    ) -> Option<(f32, f32)> {
        let max_x = (s.layout.total_width() - s.viewport.width).max(0.0);
        let max_y = (s.layout.total_height() - s.viewport.height).max(0.0);

        let new_x = (s.viewport.scroll_x + delta_x).clamp(0.0, max_x);
        let new_y = (s.viewport.scroll_y + delta_y).clamp(0.0, max_y);
        let dx = new_x - s.viewport.scroll_x;
        let dy = new_y - s.viewport.scroll_y;
        if dx.abs() > f32::EPSILON || dy.abs() > f32::EPSILON {
            s.viewport.scroll_x = new_x;
            s.viewport.scroll_y = new_y;
            return Some((dx, dy));
        }
        None
    }

    pub(crate) fn schedule_scroll_settle_timeout(state: &Rc<RefCell<SharedState>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut s = state.borrow_mut();
        // Cancel any existing timer
        if let Some(timer_id) = s.scroll_settle_timer.take() {
            window.clear_timeout_with_handle(timer_id);
        }
        if s.scroll_settle_closure.is_none() {
            let weak_state = Rc::downgrade(state);
            let closure = Closure::wrap(Box::new(move || {
                if let Some(state) = weak_state.upgrade() {
                    SyncGrid::handle_scroll_settle(&state);
                }
            }) as Box<dyn FnMut()>);
            s.scroll_settle_closure = Some(closure);
        }
        let Some(callback) = s.scroll_settle_closure.as_ref() else {
            return;
        };
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            i32::try_from(SCROLL_SETTLE_DELAY_MS).unwrap_or(i32::MAX),
        ) {
            Ok(id) => s.scroll_settle_timer = Some(id),
            Err(_) => s.scroll_settle_timer = None,
        }
    }

    pub(crate) fn handle_scroll_settle(state: &Rc<RefCell<SharedState>>) {
        let callback = {
            let mut s = state.borrow_mut();
            s.scroll_settle_timer = None;
            // Check if scroll is still ongoing
            let elapsed = now_ms() - s.last_scroll_ms;
            if elapsed < f64::from(SCROLL_SETTLE_DELAY_MS) {
                // Still scrolling, reschedule
                drop(s);
                Self::schedule_scroll_settle_timeout(state);
                return;
            }
            s.needs_render = true;
            s.render_callback.clone()
        };
        Self::invoke_render_callback(callback);
    }
}
