//! Sync job status polling with adaptive backoff.
//!
//! A poller watches one job: fetch status, report it to JS, re-arm a
//! timer with the next backoff delay, stop at a terminal status.
//! `stop()` (or dropping the poller) clears the timer AND aborts the
//! in-flight request, so a dismissed monitor can't deliver a late
//! update.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::{ApiClient, PollBackoff, Session};
use crate::error::Result as SvResult;
use crate::types::SyncJob;

/// Error payload delivered to the JS callback. Polling continues after a
/// transient failure; a running job's monitor should survive a flaky
/// network.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PollError {
    error: String,
}

struct PollState {
    /// Dropped on stop so the abort fires exactly once.
    client: Option<Rc<ApiClient>>,
    job_id: String,
    backoff: PollBackoff,
    timer: Option<i32>,
    tick_closure: Option<Closure<dyn FnMut()>>,
    callback: Option<Function>,
    stopped: bool,
}

/// Watches one sync job, exported to JavaScript.
#[wasm_bindgen]
pub struct JobPoller {
    state: Rc<RefCell<PollState>>,
}

#[wasm_bindgen]
impl JobPoller {
    /// Start polling immediately. `callback` receives either a job
    /// snapshot or `{ error }` on each poll.
    #[wasm_bindgen(constructor)]
    pub fn new(
        base_url: &str,
        token: &str,
        job_id: &str,
        callback: Function,
    ) -> Result<JobPoller, JsValue> {
        console_error_panic_hook::set_once();

        let session = Session::with_token(base_url, token);
        let client = ApiClient::new(session).map_err(JsValue::from)?;

        let state = Rc::new(RefCell::new(PollState {
            client: Some(Rc::new(client)),
            job_id: job_id.to_string(),
            backoff: PollBackoff::default(),
            timer: None,
            tick_closure: None,
            callback: Some(callback),
            stopped: false,
        }));

        // First poll fires right away; later ones re-arm with backoff.
        Self::tick(&state);

        Ok(JobPoller { state })
    }

    /// Stop polling: clear the timer and abort any in-flight request.
    #[wasm_bindgen]
    pub fn stop(&self) {
        Self::halt(&self.state);
    }

    /// True once the poller has stopped (terminal status or `stop()`).
    #[wasm_bindgen(js_name = "isStopped")]
    pub fn is_stopped(&self) -> bool {
        self.state.borrow().stopped
    }

    fn halt(state: &Rc<RefCell<PollState>>) {
        let mut s = state.borrow_mut();
        s.stopped = true;
        if let Some(timer_id) = s.timer.take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(timer_id);
            }
        }
        if let Some(client) = s.client.take() {
            client.cancel();
        }
    }

    fn tick(state: &Rc<RefCell<PollState>>) {
        let (client, job_id) = {
            let s = state.borrow();
            if s.stopped {
                return;
            }
            let Some(client) = s.client.clone() else {
                return;
            };
            (client, s.job_id.clone())
        };

        let state = state.clone();
        spawn_local(async move {
            let result = client.fetch_job(&job_id).await;
            Self::handle_response(&state, result);
        });
    }

    fn handle_response(state: &Rc<RefCell<PollState>>, result: SvResult<SyncJob>) {
        let (callback, payload, keep_polling) = {
            let s = state.borrow();
            if s.stopped {
                // Torn down while the request was in flight.
                return;
            }
            match result {
                Ok(job) => {
                    let keep_polling = !job.status.is_terminal();
                    (
                        s.callback.clone(),
                        serde_wasm_bindgen::to_value(&job).ok(),
                        keep_polling,
                    )
                }
                Err(e) => {
                    let payload = serde_wasm_bindgen::to_value(&PollError {
                        error: e.to_string(),
                    })
                    .ok();
                    (s.callback.clone(), payload, true)
                }
            }
        };

        if let (Some(callback), Some(payload)) = (&callback, payload) {
            let _ = callback.call1(&JsValue::NULL, &payload);
        }

        if keep_polling {
            Self::schedule_next(state);
        } else {
            Self::halt(state);
        }
    }

    fn schedule_next(state: &Rc<RefCell<PollState>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut s = state.borrow_mut();
        if s.stopped {
            return;
        }
        if s.tick_closure.is_none() {
            let weak_state = Rc::downgrade(state);
            let closure = Closure::wrap(Box::new(move || {
                if let Some(state) = weak_state.upgrade() {
                    JobPoller::tick(&state);
                }
            }) as Box<dyn FnMut()>);
            s.tick_closure = Some(closure);
        }
        let delay = s.backoff.next_delay_ms();
        let Some(callback) = s.tick_closure.as_ref() else {
            return;
        };
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            i32::try_from(delay).unwrap_or(i32::MAX),
        ) {
            Ok(id) => s.timer = Some(id),
            Err(_) => s.timer = None,
        }
    }
}

impl Drop for JobPoller {
    fn drop(&mut self) {
        Self::halt(&self.state);
    }
}
