//! syncview - sync console grid for the web
//!
//! Renders the admin console's large record tables in the browser via
//! WebAssembly and Canvas 2D:
//! - Windowed (virtualized) rows: DOM/canvas work is bounded by the
//!   viewport, not the record count
//! - KPI formula validation and live preview over a constrained grammar
//! - Job status polling with adaptive backoff, cancelled on teardown
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { SyncGrid, KpiBuilder } from 'syncview';
//! await init();
//! const grid = new SyncGrid(canvas, devicePixelRatio);
//! grid.setRenderCallback(() => requestAnimationFrame(() => grid.render()));
//! grid.load(recordSet);
//! ```

// Core modules
pub mod api;
pub mod error;
pub mod formula;
pub mod layout;
pub mod numfmt;
pub mod types;

// Rendering modules (Canvas 2D)
pub mod render;
pub mod viewer;

use std::collections::HashMap;

use wasm_bindgen::prelude::*;

// Re-export the main viewer structs
pub use viewer::SyncGrid;
#[cfg(target_arch = "wasm32")]
pub use viewer::{JobPoller, KpiBuilder};

pub use types::*;

/// Validate a KPI formula
///
/// # Arguments
/// * `formula` - Template text, e.g. `"{cost} * 1.15"`
///
/// # Returns
/// `{ valid, error?, variables }`
///
/// # Errors
/// Returns an error only if the result cannot be serialized; invalid
/// formulas are reported inside the returned object.
#[wasm_bindgen]
pub fn validate_kpi_formula(formula: &str) -> Result<JsValue, JsValue> {
    let validation = formula::validate_formula(formula);

    serde_wasm_bindgen::to_value(&validation)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Evaluate a KPI formula against a sample record
///
/// # Arguments
/// * `formula` - Template text
/// * `sample` - `{ fieldName: number }` object; missing fields
///   substitute as 0
///
/// # Returns
/// `{ success, value?, error? }`
///
/// # Errors
/// Returns an error if `sample` is not a map of numbers or the result
/// cannot be serialized.
#[wasm_bindgen]
pub fn test_kpi_formula(formula: &str, sample: JsValue) -> Result<JsValue, JsValue> {
    let sample: HashMap<String, f64> = serde_wasm_bindgen::from_value(sample)
        .map_err(|e| JsValue::from_str(&format!("Sample record error: {e}")))?;
    let outcome = formula::test_formula(formula, &sample);

    serde_wasm_bindgen::to_value(&outcome)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Format a numeric value for display
///
/// # Arguments
/// * `format` - `"number"`, `"currency"` or `"percent"`
///
/// # Errors
/// Returns an error for an unknown format name.
#[wasm_bindgen]
pub fn format_kpi_value(value: f64, format: &str) -> Result<String, JsValue> {
    let format = numfmt::ValueFormat::parse(format)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown format '{format}'")))?;
    Ok(numfmt::format_value(value, format))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
