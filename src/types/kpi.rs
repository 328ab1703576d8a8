use serde::{Deserialize, Serialize};

use crate::numfmt::ValueFormat;

/// A saved KPI definition.
///
/// The `formula` is a string template over record fields, e.g.
/// `"{acquisition_cost} - {accumulated_depreciation}"`. It is validated
/// client-side before save and evaluated server-side against real data,
/// so the accepted grammar here is the security boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiDefinition {
    pub name: String,
    pub formula: String,
    #[serde(default)]
    pub format: ValueFormat,
}

/// Result of validating a formula (derived, recomputed on every
/// debounced edit; never persisted).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Distinct field names referenced, in first-appearance order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub variables: Vec<String>,
    /// Validation wall time in milliseconds, when measured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

impl Validation {
    /// A passing validation over the given variables.
    pub fn ok(variables: Vec<String>) -> Self {
        Self {
            valid: true,
            error: None,
            variables,
            duration_ms: None,
        }
    }

    /// A failing validation with a user-facing message.
    pub fn fail(error: String) -> Self {
        Self {
            valid: false,
            error: Some(error),
            variables: Vec::new(),
            duration_ms: None,
        }
    }
}

/// Result of evaluating a formula against a sample record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestOutcome {
    pub fn ok(value: f64) -> Self {
        Self {
            success: true,
            value: Some(value),
            error: None,
        }
    }

    pub fn fail(error: String) -> Self {
        Self {
            success: false,
            value: None,
            error: Some(error),
        }
    }
}
