//! Main `SyncGrid` struct - the virtualized record table.
//!
//! This module provides the WASM-exported `SyncGrid` that handles:
//! - Loading record sets (from JS or fetched via the API client)
//! - Managing viewport state (scroll, selection, client-side filter)
//! - Coordinating between the windowing math and Canvas 2D rendering
//! - Handling user interactions (scroll, click, keyboard)
//!
//! Scroll/click/keyboard handlers are registered when the grid is
//! created - no manual JavaScript wiring required. Only the rows inside
//! the visible window (plus overscan) are ever prepared or drawn, so the
//! per-frame cost is bounded by the viewport size, not the record count.

mod debounce;
mod events;
#[cfg(target_arch = "wasm32")]
mod kpi_builder;
#[cfg(target_arch = "wasm32")]
mod poller;
mod scroll;

#[cfg(target_arch = "wasm32")]
pub use kpi_builder::KpiBuilder;
#[cfg(target_arch = "wasm32")]
pub use poller::JobPoller;

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use js_sys::{Function, Reflect};
#[cfg(target_arch = "wasm32")]
use serde::Serialize;
#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::spawn_local;
#[cfg(target_arch = "wasm32")]
use web_sys::{HtmlCanvasElement, HtmlDivElement, HtmlElement, KeyboardEvent, MouseEvent};

#[cfg(target_arch = "wasm32")]
use crate::api::{ApiClient, Session};
use crate::layout::{GridConfig, GridLayout, Viewport, VisibleWindow};
#[cfg(target_arch = "wasm32")]
use crate::numfmt::format_value;
#[cfg(target_arch = "wasm32")]
use crate::render::{GridRenderer, RenderParams, RowRenderData};
use crate::types::RecordSet;

/// Placeholder shown when the loaded record set is empty.
#[cfg(target_arch = "wasm32")]
const EMPTY_MESSAGE: &str = "No records to display";
/// Placeholder shown when a filter matches nothing.
#[cfg(target_arch = "wasm32")]
const FILTERED_EMPTY_MESSAGE: &str = "No records match the current filter";

#[cfg(target_arch = "wasm32")]
fn scroll_left_f64(element: &HtmlDivElement) -> f64 {
    Reflect::get(element.as_ref(), &JsValue::from_str("scrollLeft"))
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(f64::from(element.scroll_left()))
}

#[cfg(target_arch = "wasm32")]
fn scroll_top_f64(element: &HtmlDivElement) -> f64 {
    Reflect::get(element.as_ref(), &JsValue::from_str("scrollTop"))
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(f64::from(element.scroll_top()))
}

/// Shared state that can be accessed by event handlers (wasm32 only)
#[cfg(target_arch = "wasm32")]
pub(crate) struct SharedState {
    pub(crate) records: RecordSet,
    /// Indices into `records.records` for the current filtered view.
    pub(crate) view_rows: Vec<usize>,
    pub(crate) layout: GridLayout,
    pub(crate) viewport: Viewport,
    pub(crate) config: GridConfig,
    pub(crate) filter: String,
    /// Selected record key. Keys survive refiltering; row positions
    /// don't.
    pub(crate) selected: Option<String>,
    pub(crate) dpr: f32,
    pub(crate) needs_render: bool,
    pub(crate) render_callback: Option<Function>,
    /// Receives scoped failure messages (e.g. a fetch error); the grid
    /// keeps its previous state when something fails.
    pub(crate) error_callback: Option<Function>,
    /// Scroll spacer element; resized whenever the content height
    /// changes so the scrollbar tracks the true row count.
    pub(crate) spacer: Option<HtmlDivElement>,
    pub(crate) scroll_settle_timer: Option<i32>,
    pub(crate) scroll_settle_closure: Option<Closure<dyn FnMut()>>,
    pub(crate) last_scroll_ms: f64,
}

// Timing helper for WASM metrics.
#[cfg(target_arch = "wasm32")]
pub(crate) fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    js_sys::Date::now()
}

#[cfg(target_arch = "wasm32")]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoadMetrics {
    rows: usize,
    columns: usize,
    layout_ms: f64,
}

#[cfg(target_arch = "wasm32")]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderMetrics {
    prep_ms: f64,
    draw_ms: f64,
    total_ms: f64,
    visible_rows: usize,
    skipped: bool,
}

/// Window bounds reported to JS (debug/metrics surface).
#[cfg(target_arch = "wasm32")]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WindowMetrics {
    start: usize,
    end: usize,
    offset_y: f32,
    total_height: f32,
}

/// The main grid struct exported to JavaScript
#[wasm_bindgen]
pub struct SyncGrid {
    #[cfg(target_arch = "wasm32")]
    state: Rc<RefCell<SharedState>>,
    #[cfg(target_arch = "wasm32")]
    renderer: GridRenderer,
    #[cfg(target_arch = "wasm32")]
    #[allow(dead_code)]
    closures: Vec<Closure<dyn FnMut(MouseEvent)>>,
    #[cfg(target_arch = "wasm32")]
    #[allow(dead_code)]
    key_closure: Option<Closure<dyn FnMut(KeyboardEvent)>>,
    #[cfg(target_arch = "wasm32")]
    #[allow(dead_code)]
    scroll_closure: Option<Closure<dyn FnMut(web_sys::Event)>>,
    #[cfg(target_arch = "wasm32")]
    #[allow(dead_code)] // Kept to maintain DOM reference
    flex_wrapper: Option<HtmlDivElement>,
    #[cfg(target_arch = "wasm32")]
    scroll_container: Option<HtmlDivElement>,
    #[cfg(target_arch = "wasm32")]
    #[allow(dead_code)] // Kept to maintain DOM reference
    scroll_spacer: Option<HtmlDivElement>,
    /// Client for `loadFromApi`; dropping the grid aborts any fetch
    /// still in flight.
    #[cfg(target_arch = "wasm32")]
    api_client: Option<Rc<ApiClient>>,

    // Non-wasm32 fields (native tests drive the same state machine
    // without a DOM)
    #[cfg(not(target_arch = "wasm32"))]
    records: RecordSet,
    #[cfg(not(target_arch = "wasm32"))]
    view_rows: Vec<usize>,
    #[cfg(not(target_arch = "wasm32"))]
    layout: GridLayout,
    #[cfg(not(target_arch = "wasm32"))]
    viewport: Viewport,
    #[cfg(not(target_arch = "wasm32"))]
    config: GridConfig,
    #[cfg(not(target_arch = "wasm32"))]
    filter: String,
    #[cfg(not(target_arch = "wasm32"))]
    selected: Option<String>,
}

/// Filtered view indices for a record set and filter query.
fn filtered_rows(records: &RecordSet, filter: &str) -> Vec<usize> {
    let query = filter.trim().to_lowercase();
    records
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.matches_filter(&query))
        .map(|(i, _)| i)
        .collect()
}

// ============================================================================
// WASM32 Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl SyncGrid {
    /// Create a new grid bound to a canvas.
    ///
    /// Builds the scroll container + spacer DOM around the canvas and
    /// registers scroll/click/keyboard handlers.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, dpr: f32) -> Result<SyncGrid, JsValue> {
        console_error_panic_hook::set_once();

        let physical_width = canvas.width().max(1);
        let physical_height = canvas.height().max(1);

        let mut renderer =
            GridRenderer::new(canvas.clone()).map_err(|e| JsValue::from_str(&e.to_string()))?;
        renderer.resize(physical_width, physical_height, dpr);

        let dpr_safe = if dpr > 0.0 { dpr } else { 1.0 };
        let logical_width = physical_width as f32 / dpr_safe;
        let logical_height = physical_height as f32 / dpr_safe;

        let config = GridConfig::default();
        let layout = GridLayout::new(&[], 0, &config);
        let viewport = Viewport {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width: logical_width,
            // Grid area excludes the header band. A zero measurement is
            // clamped so the window math stays sane before first layout.
            height: (logical_height - config.header_height).max(100.0),
        };

        let state = Rc::new(RefCell::new(SharedState {
            records: RecordSet::default(),
            view_rows: Vec::new(),
            layout,
            viewport,
            config,
            filter: String::new(),
            selected: None,
            dpr: dpr_safe,
            needs_render: true,
            render_callback: None,
            error_callback: None,
            spacer: None,
            scroll_settle_timer: None,
            scroll_settle_closure: None,
            last_scroll_ms: 0.0,
        }));

        // Native scrollbars with flexbox layout BEFORE wiring mouse
        // events, so the scroll_container is available as the event
        // target.
        let (flex_wrapper, scroll_container, scroll_spacer, scroll_closure) =
            Self::setup_native_scroll(&canvas, &state, logical_width, logical_height);
        state.borrow_mut().spacer = scroll_spacer.clone();

        let event_target: &HtmlElement = scroll_container
            .as_ref()
            .map(|c| c.as_ref() as &HtmlElement)
            .unwrap_or(&canvas);
        let mut closures: Vec<Closure<dyn FnMut(MouseEvent)>> = Vec::new();

        // Click (row selection)
        {
            let state = state.clone();
            let container_ref = event_target.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                let rect = container_ref.get_bounding_client_rect();
                let x = event.client_x() as f32 - rect.left() as f32;
                let y = event.client_y() as f32 - rect.top() as f32;
                Self::internal_click(&state, x, y);
            }) as Box<dyn FnMut(MouseEvent)>);
            event_target
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
                .ok();
            closures.push(closure);
        }

        // Keyboard handler on document for arrow navigation
        let key_closure = {
            let state = state.clone();
            let container = scroll_container.clone();
            let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
                if Self::internal_key_down(&state, &event.key()) {
                    // Selection may have moved the viewport; keep the
                    // native scroll container in step.
                    if let Some(container) = container.as_ref() {
                        let target = f64::from(state.borrow().viewport.scroll_y);
                        container.set_scroll_top(js_sys::Math::round(target) as i32);
                    }
                    event.prevent_default();
                }
            }) as Box<dyn FnMut(KeyboardEvent)>);

            if let Some(window) = web_sys::window() {
                if let Some(document) = window.document() {
                    document
                        .add_event_listener_with_callback(
                            "keydown",
                            closure.as_ref().unchecked_ref(),
                        )
                        .ok();
                }
            }
            Some(closure)
        };

        Ok(SyncGrid {
            state,
            renderer,
            closures,
            key_closure,
            scroll_closure,
            flex_wrapper,
            scroll_container,
            scroll_spacer,
            api_client: None,
        })
    }

    /// Set up native browser scrollbars with flexbox layout
    ///
    /// Creates this DOM structure:
    /// ```text
    /// flex_wrapper (display: flex, flex-direction: column, 100% height)
    /// ├── canvas (position: absolute, pointer-events: none, z-index: 0)
    /// └── scroll_container (flex: 1, overflow: auto, z-index: 1, background: transparent)
    ///     └── spacer (sized to total content height, so the scrollbar
    ///         reflects the true row count regardless of what's drawn)
    /// ```
    fn setup_native_scroll(
        canvas: &HtmlCanvasElement,
        state: &Rc<RefCell<SharedState>>,
        width: f32,
        height: f32,
    ) -> (
        Option<HtmlDivElement>,
        Option<HtmlDivElement>,
        Option<HtmlDivElement>,
        Option<Closure<dyn FnMut(web_sys::Event)>>,
    ) {
        let Some(window) = web_sys::window() else {
            return (None, None, None, None);
        };
        let Some(document) = window.document() else {
            return (None, None, None, None);
        };
        let Some(parent) = canvas.parent_element() else {
            return (None, None, None, None);
        };

        let create_div = || -> Option<HtmlDivElement> {
            document
                .create_element("div")
                .ok()
                .and_then(|el| el.dyn_into::<HtmlDivElement>().ok())
        };

        let Some(flex_wrapper) = create_div() else {
            return (None, None, None, None);
        };
        let Some(scroll_container) = create_div() else {
            return (None, None, None, None);
        };
        let Some(spacer) = create_div() else {
            return (None, None, None, None);
        };

        // Ensure parent has position for absolute children
        if let Some(parent_el) = parent.dyn_ref::<HtmlElement>() {
            let parent_style = parent_el.style();
            if parent_style
                .get_property_value("position")
                .unwrap_or_default()
                .is_empty()
            {
                let _ = parent_style.set_property("position", "relative");
            }
        }

        let wrapper_style = flex_wrapper.style();
        let _ = wrapper_style.set_property("display", "flex");
        let _ = wrapper_style.set_property("flex-direction", "column");
        let _ = wrapper_style.set_property("width", "100%");
        let _ = wrapper_style.set_property("height", "100%");
        let _ = wrapper_style.set_property("position", "absolute");
        let _ = wrapper_style.set_property("top", "0");
        let _ = wrapper_style.set_property("left", "0");

        // Scroll container sits on top of the canvas (z-index 1) so
        // scrollbars are visible and mouse events hit the container;
        // transparent background lets the canvas show through.
        let container_style = scroll_container.style();
        let _ = container_style.set_property("flex", "1");
        let _ = container_style.set_property("overflow", "auto");
        let _ = container_style.set_property("position", "relative");
        let _ = container_style.set_property("z-index", "1");
        let _ = container_style.set_property("background", "transparent");
        let _ = container_style.set_property("min-height", "0"); // Important for flex children
        let _ = scroll_container.set_attribute("data-syncgrid-scroll", "");

        // Spacer: sized to content to create the scroll area.
        let spacer_style = spacer.style();
        let _ = spacer_style.set_property("position", "absolute");
        let _ = spacer_style.set_property("top", "0");
        let _ = spacer_style.set_property("left", "0");
        let _ = spacer_style.set_property("width", &format!("{width}px"));
        let _ = spacer_style.set_property("height", &format!("{height}px"));

        // Canvas: viewport-sized, behind the scroll container.
        let canvas_style = canvas.style();
        let _ = canvas_style.set_property("position", "absolute");
        let _ = canvas_style.set_property("top", "0");
        let _ = canvas_style.set_property("left", "0");
        let _ = canvas_style.set_property("pointer-events", "none");
        let _ = canvas_style.set_property("z-index", "0");

        let _ = parent.insert_before(&flex_wrapper, Some(canvas));
        let _ = flex_wrapper.append_child(canvas);
        let _ = scroll_container.append_child(&spacer);
        let _ = flex_wrapper.append_child(&scroll_container);

        // Scroll event: pull scrollLeft/scrollTop into viewport state and
        // request a render; the settle timer catches the final position.
        let state_clone = state.clone();
        let container_for_scroll = scroll_container.clone();
        let scroll_closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let callback = {
                let mut s = state_clone.borrow_mut();
                let s = &mut *s;
                s.last_scroll_ms = now_ms();
                s.viewport.scroll_x = scroll_left_f64(&container_for_scroll) as f32;
                s.viewport.scroll_y = scroll_top_f64(&container_for_scroll) as f32;
                s.viewport.clamp_scroll(&s.layout);
                s.needs_render = true;
                s.render_callback.clone()
            };
            Self::invoke_render_callback(callback);
            Self::schedule_scroll_settle_timeout(&state_clone);
        }) as Box<dyn FnMut(web_sys::Event)>);

        let _ = scroll_container
            .add_event_listener_with_callback("scroll", scroll_closure.as_ref().unchecked_ref());

        (
            Some(flex_wrapper),
            Some(scroll_container),
            Some(spacer),
            Some(scroll_closure),
        )
    }

    /// Register the render callback (typically wraps
    /// `requestAnimationFrame(() => grid.render())`).
    #[wasm_bindgen(js_name = "setRenderCallback")]
    pub fn set_render_callback(&mut self, callback: Function) {
        self.state.borrow_mut().render_callback = Some(callback);
    }

    /// Load a record set (`{ columns: [...], records: [...] }`) and
    /// return load metrics.
    #[wasm_bindgen]
    pub fn load(&mut self, data: JsValue) -> Result<JsValue, JsValue> {
        let records: RecordSet = serde_wasm_bindgen::from_value(data)
            .map_err(|e| JsValue::from_str(&format!("decoding record set: {e}")))?;

        let started = now_ms();
        let metrics = {
            let mut s = self.state.borrow_mut();
            let s = &mut *s;
            let view_rows = filtered_rows(&records, &s.filter);
            s.layout = GridLayout::new(&records.columns, view_rows.len(), &s.config);
            s.records = records;
            s.view_rows = view_rows;
            s.selected = None;
            s.viewport.clamp_scroll(&s.layout);
            s.needs_render = true;
            LoadMetrics {
                rows: s.records.len(),
                columns: s.records.columns.len(),
                layout_ms: now_ms() - started,
            }
        };
        Self::sync_spacer(&self.state);
        self.request_render();

        serde_wasm_bindgen::to_value(&metrics)
            .map_err(|e| JsValue::from_str(&format!("serializing metrics: {e}")))
    }

    /// Fetch a record set from the backend and load it on arrival. The
    /// request is tied to this grid's lifetime; dropping the grid (or a
    /// later `loadFromApi` call) aborts it. Failures go to the error
    /// callback and leave the current rows intact.
    #[wasm_bindgen(js_name = "loadFromApi")]
    pub fn load_from_api(
        &mut self,
        base_url: &str,
        token: &str,
        path: &str,
    ) -> Result<(), JsValue> {
        let client =
            Rc::new(ApiClient::new(Session::with_token(base_url, token)).map_err(JsValue::from)?);
        // Superseded fetch (if any) gets aborted by the drop.
        self.api_client = Some(client.clone());

        let state = self.state.clone();
        let path = path.to_string();
        spawn_local(async move {
            match client.fetch_records(&path).await {
                Ok(records) => Self::apply_records(&state, records),
                Err(e) => Self::report_error(&state, &e.to_string()),
            }
        });
        Ok(())
    }

    /// Register the callback receiving scoped failure messages.
    #[wasm_bindgen(js_name = "setErrorCallback")]
    pub fn set_error_callback(&mut self, callback: Function) {
        self.state.borrow_mut().error_callback = Some(callback);
    }

    /// Replace the grid tuning config (`{ rowHeight, overscan,
    /// headerHeight }`; omitted fields keep their defaults).
    #[wasm_bindgen(js_name = "setConfig")]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: GridConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("decoding config: {e}")))?;
        {
            let mut s = self.state.borrow_mut();
            let s = &mut *s;
            s.config = config;
            s.layout = GridLayout::new(&s.records.columns, s.view_rows.len(), &s.config);
            s.viewport.clamp_scroll(&s.layout);
            s.needs_render = true;
        }
        Self::sync_spacer(&self.state);
        self.request_render();
        Ok(())
    }

    /// Apply a client-side filter. Matching is a case-insensitive
    /// substring test across text fields and the record key. The window
    /// clamps when the filtered set is smaller than the scroll offset
    /// implies.
    #[wasm_bindgen(js_name = "setFilter")]
    pub fn set_filter(&mut self, query: &str) {
        {
            let mut s = self.state.borrow_mut();
            let s = &mut *s;
            s.filter = query.to_string();
            s.view_rows = filtered_rows(&s.records, &s.filter);
            s.layout.set_row_count(s.view_rows.len());
            s.viewport.clamp_scroll(&s.layout);
            s.needs_render = true;
        }
        Self::sync_spacer(&self.state);
        self.request_render();
    }

    /// Key of the selected record, if any.
    #[wasm_bindgen(js_name = "selectedKey")]
    pub fn selected_key(&self) -> Option<String> {
        self.state.borrow().selected.clone()
    }

    /// Number of rows in the current filtered view.
    #[wasm_bindgen(js_name = "rowCount")]
    pub fn row_count(&self) -> u32 {
        u32::try_from(self.state.borrow().view_rows.len()).unwrap_or(u32::MAX)
    }

    /// Current visible window bounds (debug/metrics surface).
    #[wasm_bindgen(js_name = "visibleWindow")]
    pub fn visible_window(&self) -> Result<JsValue, JsValue> {
        let s = self.state.borrow();
        let window = s.viewport.visible_window(&s.layout);
        let metrics = WindowMetrics {
            start: window.start,
            end: window.end,
            offset_y: s.layout.row_top(window.start),
            total_height: s.layout.total_height(),
        };
        serde_wasm_bindgen::to_value(&metrics)
            .map_err(|e| JsValue::from_str(&format!("serializing window: {e}")))
    }

    /// Resize to new physical dimensions.
    #[wasm_bindgen]
    pub fn resize(&mut self, physical_width: u32, physical_height: u32, dpr: f32) {
        let dpr_safe = if dpr > 0.0 { dpr } else { 1.0 };
        self.renderer.resize(physical_width, physical_height, dpr);
        {
            let mut s = self.state.borrow_mut();
            let s = &mut *s;
            s.dpr = dpr_safe;
            s.viewport.width = physical_width as f32 / dpr_safe;
            s.viewport.height =
                (physical_height as f32 / dpr_safe - s.config.header_height).max(100.0);
            s.viewport.clamp_scroll(&s.layout);
            s.needs_render = true;
        }
        self.request_render();
    }

    /// Programmatic scroll by a delta (content coordinates).
    #[wasm_bindgen(js_name = "scrollBy")]
    pub fn scroll_by(&mut self, delta_x: f32, delta_y: f32) {
        let applied = {
            let mut s = self.state.borrow_mut();
            let applied = Self::scroll_state(&mut s, delta_x, delta_y);
            if applied.is_some() {
                s.needs_render = true;
            }
            applied
        };
        if applied.is_some() {
            // Keep the native container in step so the next scroll event
            // doesn't snap back.
            if let Some(container) = self.scroll_container.as_ref() {
                let s = self.state.borrow();
                container.set_scroll_top(js_sys::Math::round(f64::from(s.viewport.scroll_y)) as i32);
                container
                    .set_scroll_left(js_sys::Math::round(f64::from(s.viewport.scroll_x)) as i32);
            }
            self.request_render();
        }
    }

    /// Render if anything is dirty. Returns render metrics.
    #[wasm_bindgen]
    pub fn render(&mut self) -> Result<JsValue, JsValue> {
        let total_start = now_ms();

        let (window, rows, prep_ms) = {
            let mut s = self.state.borrow_mut();
            if !s.needs_render {
                let metrics = RenderMetrics {
                    prep_ms: 0.0,
                    draw_ms: 0.0,
                    total_ms: 0.0,
                    visible_rows: 0,
                    skipped: true,
                };
                return serde_wasm_bindgen::to_value(&metrics)
                    .map_err(|e| JsValue::from_str(&format!("serializing metrics: {e}")));
            }
            s.needs_render = false;

            let prep_start = now_ms();
            let window = s.viewport.visible_window(&s.layout);
            let rows = Self::prepare_rows(&s, window);
            (window, rows, now_ms() - prep_start)
        };

        let draw_start = now_ms();
        {
            let s = self.state.borrow();
            let placeholder = if s.records.is_empty() {
                EMPTY_MESSAGE
            } else {
                FILTERED_EMPTY_MESSAGE
            };
            let params = RenderParams {
                layout: &s.layout,
                viewport: &s.viewport,
                window,
                columns: &s.records.columns,
                rows: &rows,
                placeholder,
            };
            self.renderer.render(&params);
        }
        let draw_ms = now_ms() - draw_start;

        let metrics = RenderMetrics {
            prep_ms,
            draw_ms,
            total_ms: now_ms() - total_start,
            visible_rows: rows.len(),
            skipped: false,
        };
        serde_wasm_bindgen::to_value(&metrics)
            .map_err(|e| JsValue::from_str(&format!("serializing metrics: {e}")))
    }

    /// Build draw data for the visible window only: O(window) work,
    /// never O(row_count).
    fn prepare_rows(s: &SharedState, window: VisibleWindow) -> Vec<RowRenderData> {
        let mut rows = Vec::with_capacity(window.len());
        for view_row in window.start..window.end {
            let Some(&record_idx) = s.view_rows.get(view_row) else {
                continue;
            };
            let Some(record) = s.records.records.get(record_idx) else {
                continue;
            };
            let cells = s
                .records
                .columns
                .iter()
                .map(|col| match (col.format, record.number(&col.name)) {
                    (Some(format), Some(value)) => format_value(value, format),
                    _ => record.display(&col.name),
                })
                .collect();
            rows.push(RowRenderData {
                row: view_row,
                cells,
                selected: s.selected.as_deref() == Some(record.key.as_str()),
            });
        }
        rows
    }

    fn request_render(&self) {
        let callback = self.state.borrow().render_callback.clone();
        Self::invoke_render_callback(callback);
    }

    /// Install a fetched record set and repaint.
    fn apply_records(state: &Rc<RefCell<SharedState>>, records: RecordSet) {
        let callback = {
            let mut s = state.borrow_mut();
            let s = &mut *s;
            let view_rows = filtered_rows(&records, &s.filter);
            s.layout = GridLayout::new(&records.columns, view_rows.len(), &s.config);
            s.records = records;
            s.view_rows = view_rows;
            s.selected = None;
            s.viewport.clamp_scroll(&s.layout);
            s.needs_render = true;
            s.render_callback.clone()
        };
        Self::sync_spacer(state);
        Self::invoke_render_callback(callback);
    }

    /// Deliver a scoped failure message; falls back to the console when
    /// no error callback is registered.
    fn report_error(state: &Rc<RefCell<SharedState>>, message: &str) {
        let callback = state.borrow().error_callback.clone();
        match callback {
            Some(callback) => {
                let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(message));
            }
            None => web_sys::console::error_1(&JsValue::from_str(message)),
        }
    }

    /// Size the spacer to the total content height so the native
    /// scrollbar always reflects `row_count * row_height`.
    fn sync_spacer(state: &Rc<RefCell<SharedState>>) {
        // Extract before touching the DOM: resizing the spacer can fire a
        // synchronous scroll event whose closure needs borrow_mut().
        let (spacer, height, width) = {
            let s = state.borrow();
            let Some(spacer) = s.spacer.clone() else {
                return;
            };
            (spacer, s.layout.total_height(), s.layout.total_width())
        };
        let style = spacer.style();
        let _ = style.set_property("height", &format!("{height}px"));
        let _ = style.set_property("width", &format!("{width}px"));
    }
}

// ============================================================================
// Non-WASM32 Implementation (native tests)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
impl SyncGrid {
    /// Create a grid without a DOM (native tests).
    pub fn new_headless(config: GridConfig) -> Self {
        let layout = GridLayout::new(&[], 0, &config);
        Self {
            records: RecordSet::default(),
            view_rows: Vec::new(),
            layout,
            viewport: Viewport::new(),
            config,
            filter: String::new(),
            selected: None,
        }
    }

    /// Load a record set.
    pub fn load(&mut self, records: RecordSet) {
        self.view_rows = filtered_rows(&records, &self.filter);
        self.layout = GridLayout::new(&records.columns, self.view_rows.len(), &self.config);
        self.records = records;
        self.selected = None;
        self.viewport.clamp_scroll(&self.layout);
    }

    /// Apply a client-side filter.
    pub fn set_filter(&mut self, query: &str) {
        self.filter = query.to_string();
        self.view_rows = filtered_rows(&self.records, &self.filter);
        self.layout.set_row_count(self.view_rows.len());
        self.viewport.clamp_scroll(&self.layout);
    }

    /// Scroll by a delta, clamped to content bounds.
    pub fn scroll_by(&mut self, delta_x: f32, delta_y: f32) {
        self.viewport.scroll_by(delta_x, delta_y, &self.layout);
    }

    /// Resize the logical viewport.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport
            .resize(width, (height - self.config.header_height).max(100.0));
        self.viewport.clamp_scroll(&self.layout);
    }

    /// Current visible window.
    pub fn visible_window(&self) -> VisibleWindow {
        self.viewport.visible_window(&self.layout)
    }

    /// Number of rows in the current filtered view.
    pub fn row_count(&self) -> usize {
        self.view_rows.len()
    }

    /// Borrow the layout (asserting scroll-track height in tests).
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Borrow the viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Record keys for the current visible window, in render order.
    pub fn visible_keys(&self) -> Vec<String> {
        let window = self.visible_window();
        (window.start..window.end)
            .filter_map(|row| self.view_rows.get(row))
            .filter_map(|&idx| self.records.records.get(idx))
            .map(|r| r.key.clone())
            .collect()
    }

    /// Select a record by key (`None` clears).
    pub fn select(&mut self, key: Option<&str>) {
        self.selected = key.map(str::to_string);
    }

    /// Key of the selected record, if any.
    pub fn selected_key(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}
