//! KPI formula builder: debounced validation + live preview.
//!
//! JS feeds keystrokes in via `setFormula`; validation and preview run
//! only after the input settles. Sample-record edits and format changes
//! re-run the preview immediately (the formula itself didn't change, so
//! there is nothing to debounce). Results are pushed to a single JS
//! callback as `{ validation, preview?, formatted? }`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use super::debounce::Debouncer;
use super::now_ms;
use crate::formula::{available_fields, example_formulas, test_formula, validate_formula};
use crate::numfmt::{format_value, ValueFormat};
use crate::types::{TestOutcome, Validation};

/// Delay before a formula edit is validated (ms).
const DEFAULT_DEBOUNCE_MS: u32 = 300;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BuilderReport<'a> {
    validation: &'a Validation,
    /// Present only when the formula is valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<&'a TestOutcome>,
    /// Present only when the preview produced a value.
    #[serde(skip_serializing_if = "Option::is_none")]
    formatted: Option<String>,
}

struct BuilderState {
    /// Last settled formula text.
    formula: String,
    /// User-editable sample record for the live preview. Never persisted.
    sample: HashMap<String, f64>,
    format: ValueFormat,
    callback: Option<Function>,
    valid: bool,
}

/// The formula builder exported to JavaScript.
#[wasm_bindgen]
pub struct KpiBuilder {
    state: Rc<RefCell<BuilderState>>,
    debouncer: Debouncer,
}

#[wasm_bindgen]
impl KpiBuilder {
    /// Create a builder. `debounce_ms` overrides the default edit-settle
    /// delay (pass `undefined` from JS to keep it).
    #[wasm_bindgen(constructor)]
    pub fn new(debounce_ms: Option<u32>) -> KpiBuilder {
        console_error_panic_hook::set_once();

        let state = Rc::new(RefCell::new(BuilderState {
            formula: String::new(),
            sample: HashMap::new(),
            format: ValueFormat::default(),
            callback: None,
            valid: false,
        }));

        let debouncer = Debouncer::new(debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS));
        let weak_state = Rc::downgrade(&state);
        debouncer.set_on_settle(Rc::new(move |formula: String| {
            if let Some(state) = weak_state.upgrade() {
                state.borrow_mut().formula = formula;
                KpiBuilder::revalidate(&state);
            }
        }));

        KpiBuilder { state, debouncer }
    }

    /// Register the callback receiving validation/preview reports.
    #[wasm_bindgen(js_name = "setCallback")]
    pub fn set_callback(&mut self, callback: Function) {
        self.state.borrow_mut().callback = Some(callback);
    }

    /// Submit an edited formula. Validation runs once typing settles;
    /// superseded edits never fire.
    #[wasm_bindgen(js_name = "setFormula")]
    pub fn set_formula(&mut self, formula: &str) {
        self.debouncer.submit(formula.to_string());
    }

    /// Set one sample-record field and re-run the preview immediately.
    #[wasm_bindgen(js_name = "setSampleValue")]
    pub fn set_sample_value(&mut self, field: &str, value: f64) {
        self.state
            .borrow_mut()
            .sample
            .insert(field.to_string(), value);
        Self::revalidate(&self.state);
    }

    /// Remove a sample-record field (it falls back to the default 0.0
    /// substitution) and re-run the preview.
    #[wasm_bindgen(js_name = "removeSampleValue")]
    pub fn remove_sample_value(&mut self, field: &str) {
        self.state.borrow_mut().sample.remove(field);
        Self::revalidate(&self.state);
    }

    /// Set the display format (`"number"`, `"currency"`, `"percent"`).
    #[wasm_bindgen(js_name = "setFormat")]
    pub fn set_format(&mut self, format: &str) -> Result<(), JsValue> {
        let parsed = ValueFormat::parse(format)
            .ok_or_else(|| JsValue::from_str(&format!("unknown format '{format}'")))?;
        self.state.borrow_mut().format = parsed;
        Self::revalidate(&self.state);
        Ok(())
    }

    /// Whether the last settled formula validated. Gates the Save action.
    #[wasm_bindgen(js_name = "isValid")]
    pub fn is_valid(&self) -> bool {
        self.state.borrow().valid
    }

    /// The last settled formula text.
    #[wasm_bindgen(getter)]
    pub fn formula(&self) -> String {
        self.state.borrow().formula.clone()
    }

    /// Fields available for autocomplete (static catalog).
    #[wasm_bindgen(js_name = "availableFields")]
    pub fn available_fields_js() -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(available_fields())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Example formulas for the help panel (static catalog).
    #[wasm_bindgen(js_name = "exampleFormulas")]
    pub fn example_formulas_js() -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(example_formulas())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Validate + preview the settled formula and push a report to the
    /// callback. Failures surface in the report, never as exceptions.
    fn revalidate(state: &Rc<RefCell<BuilderState>>) {
        let (report, callback) = {
            let mut s = state.borrow_mut();
            if s.formula.is_empty() {
                // Nothing settled yet; don't report "formula is empty"
                // before the user typed anything.
                s.valid = false;
                return;
            }

            let started = now_ms();
            let mut validation = validate_formula(&s.formula);
            validation.duration_ms = Some(now_ms() - started);
            s.valid = validation.valid;

            let preview = if validation.valid {
                Some(test_formula(&s.formula, &s.sample))
            } else {
                None
            };
            let formatted = preview
                .as_ref()
                .and_then(|p| p.value)
                .map(|v| format_value(v, s.format));

            let report = BuilderReport {
                validation: &validation,
                preview: preview.as_ref(),
                formatted,
            };
            (serde_wasm_bindgen::to_value(&report).ok(), s.callback.clone())
        };

        if let (Some(callback), Some(report)) = (callback, report) {
            let _ = callback.call1(&JsValue::NULL, &report);
        }
    }
}
