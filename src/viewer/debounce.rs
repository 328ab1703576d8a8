//! Cancellable delayed-commit value holder.
//!
//! The formula builder revalidates on every settled edit, not on every
//! keystroke. `Debouncer` holds the latest submitted value and commits it
//! to the observer only after the delay has elapsed with no further
//! submissions; each submission cancels and re-arms the timer. Dropping
//! the debouncer clears any pending timer, so a torn-down builder never
//! receives a stale commit.

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
pub(crate) struct Debouncer {
    state: Rc<RefCell<DebounceState>>,
}

#[cfg(target_arch = "wasm32")]
struct DebounceState {
    delay_ms: u32,
    pending: Option<String>,
    timer: Option<i32>,
    fire_closure: Option<Closure<dyn FnMut()>>,
    on_settle: Option<Rc<dyn Fn(String)>>,
}

#[cfg(target_arch = "wasm32")]
impl Debouncer {
    pub(crate) fn new(delay_ms: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new(DebounceState {
                delay_ms,
                pending: None,
                timer: None,
                fire_closure: None,
                on_settle: None,
            })),
        }
    }

    /// Register the observer invoked once a value settles.
    pub(crate) fn set_on_settle(&self, observer: Rc<dyn Fn(String)>) {
        self.state.borrow_mut().on_settle = Some(observer);
    }

    /// Submit a new value, superseding any pending one and re-arming the
    /// timer.
    pub(crate) fn submit(&self, value: String) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut s = self.state.borrow_mut();
        s.pending = Some(value);
        if let Some(timer_id) = s.timer.take() {
            window.clear_timeout_with_handle(timer_id);
        }
        if s.fire_closure.is_none() {
            let weak_state = Rc::downgrade(&self.state);
            let closure = Closure::wrap(Box::new(move || {
                if let Some(state) = weak_state.upgrade() {
                    Self::fire(&state);
                }
            }) as Box<dyn FnMut()>);
            s.fire_closure = Some(closure);
        }
        let Some(callback) = s.fire_closure.as_ref() else {
            return;
        };
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            i32::try_from(s.delay_ms).unwrap_or(i32::MAX),
        ) {
            Ok(id) => s.timer = Some(id),
            Err(_) => s.timer = None,
        }
    }

    /// Cancel any pending commit without firing it.
    pub(crate) fn cancel(&self) {
        let mut s = self.state.borrow_mut();
        s.pending = None;
        if let Some(timer_id) = s.timer.take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(timer_id);
            }
        }
    }

    fn fire(state: &Rc<RefCell<DebounceState>>) {
        // Take the value and observer out before calling, so the observer
        // may itself submit without re-entrant borrows.
        let (value, observer) = {
            let mut s = state.borrow_mut();
            s.timer = None;
            (s.pending.take(), s.on_settle.clone())
        };
        if let (Some(value), Some(observer)) = (value, observer) {
            observer(value);
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
