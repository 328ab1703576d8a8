//! Formula validation and sample-record evaluation.

use std::collections::HashMap;

use super::parser::{parse, Expr};
use crate::types::{TestOutcome, Validation};

/// A field available to formulas, for the builder's autocomplete.
#[derive(Debug, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub name: &'static str,
    pub label: &'static str,
}

/// A canned example formula shown in the builder.
#[derive(Debug, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleFormula {
    pub name: &'static str,
    pub formula: &'static str,
    pub format: &'static str,
}

/// PFA record fields formulas may reference. Static catalog; the backend
/// owns the authoritative schema.
const AVAILABLE_FIELDS: &[FieldInfo] = &[
    FieldInfo { name: "cost", label: "Cost" },
    FieldInfo { name: "quantity", label: "Quantity" },
    FieldInfo { name: "acquisition_cost", label: "Acquisition cost" },
    FieldInfo { name: "salvage_value", label: "Salvage value" },
    FieldInfo { name: "useful_life", label: "Useful life (years)" },
    FieldInfo { name: "accumulated_depreciation", label: "Accumulated depreciation" },
    FieldInfo { name: "book_value", label: "Book value" },
    FieldInfo { name: "market_value", label: "Market value" },
    FieldInfo { name: "in_service_years", label: "Years in service" },
    FieldInfo { name: "maintenance_cost", label: "Maintenance cost (YTD)" },
];

const EXAMPLE_FORMULAS: &[ExampleFormula] = &[
    ExampleFormula {
        name: "Net book value",
        formula: "{acquisition_cost} - {accumulated_depreciation}",
        format: "currency",
    },
    ExampleFormula {
        name: "Annual straight-line depreciation",
        formula: "({acquisition_cost} - {salvage_value}) / {useful_life}",
        format: "currency",
    },
    ExampleFormula {
        name: "Cost with 15% uplift",
        formula: "{cost} * 1.15",
        format: "currency",
    },
    ExampleFormula {
        name: "Extended cost",
        formula: "{cost} * {quantity}",
        format: "currency",
    },
    ExampleFormula {
        name: "Depreciation ratio",
        formula: "{accumulated_depreciation} / {acquisition_cost}",
        format: "percent",
    },
];

/// Fields available for autocomplete in the builder.
pub fn available_fields() -> &'static [FieldInfo] {
    AVAILABLE_FIELDS
}

/// Example formulas shown in the builder's help panel.
pub fn example_formulas() -> &'static [ExampleFormula] {
    EXAMPLE_FORMULAS
}

/// Validate a formula: parse it and report the referenced fields.
///
/// An invalid formula disables Save in the builder; the error string is
/// shown inline as-is.
pub fn validate_formula(formula: &str) -> Validation {
    match parse(formula) {
        Ok(expr) => Validation::ok(expr.variables()),
        Err(error) => Validation::fail(error),
    }
}

/// Evaluate a formula against a sample record for live preview.
///
/// Fields absent from the sample record substitute as 0.0 — the same
/// default the backend evaluator applies to null fields — so previews are
/// deterministic rather than failing on partially filled sample data.
/// Arithmetic failures (division by zero, overflow to non-finite) are
/// reported as a test failure, never a crash.
pub fn test_formula(formula: &str, sample: &HashMap<String, f64>) -> TestOutcome {
    let expr = match parse(formula) {
        Ok(expr) => expr,
        Err(error) => return TestOutcome::fail(error),
    };
    match evaluate(&expr, sample) {
        Ok(value) => TestOutcome::ok(value),
        Err(error) => TestOutcome::fail(error),
    }
}

fn evaluate(expr: &Expr, sample: &HashMap<String, f64>) -> Result<f64, String> {
    let value = eval_inner(expr, sample)?;
    if !value.is_finite() {
        return Err("result is not a finite number".to_string());
    }
    Ok(value)
}

fn eval_inner(expr: &Expr, sample: &HashMap<String, f64>) -> Result<f64, String> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Field(name) => Ok(sample.get(name).copied().unwrap_or(0.0)),
        Expr::Neg(inner) => Ok(-eval_inner(inner, sample)?),
        Expr::Add(lhs, rhs) => Ok(eval_inner(lhs, sample)? + eval_inner(rhs, sample)?),
        Expr::Sub(lhs, rhs) => Ok(eval_inner(lhs, sample)? - eval_inner(rhs, sample)?),
        Expr::Mul(lhs, rhs) => Ok(eval_inner(lhs, sample)? * eval_inner(rhs, sample)?),
        Expr::Div(lhs, rhs) => {
            let divisor = eval_inner(rhs, sample)?;
            if divisor.abs() < f64::EPSILON {
                return Err("division by zero".to_string());
            }
            Ok(eval_inner(lhs, sample)? / divisor)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;

    fn sample(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn test_validate_simple() {
        let v = validate_formula("{cost} * 1.15");
        assert!(v.valid);
        assert!(v.error.is_none());
        assert_eq!(v.variables, vec!["cost"]);
    }

    #[test]
    fn test_validate_trailing_operator() {
        let v = validate_formula("{cost} +");
        assert!(!v.valid);
        assert_eq!(v.error.as_deref(), Some("unexpected end of formula"));
        assert!(v.variables.is_empty());
    }

    #[test]
    fn test_test_formula_product() {
        let outcome = test_formula(
            "{cost}*{quantity}",
            &sample(&[("cost", 1000.0), ("quantity", 2.0)]),
        );
        assert!(outcome.success);
        assert_eq!(outcome.value, Some(2000.0));
    }

    #[test]
    fn test_missing_field_defaults_to_zero() {
        let outcome = test_formula("{missingField}", &sample(&[]));
        assert!(outcome.success);
        assert_eq!(outcome.value, Some(0.0));

        let outcome = test_formula("{cost} + {unknown}", &sample(&[("cost", 10.0)]));
        assert_eq!(outcome.value, Some(10.0));
    }

    #[test]
    fn test_division_by_zero_is_reported() {
        let outcome = test_formula("{cost} / {quantity}", &sample(&[("cost", 10.0)]));
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("division by zero"));
        assert!(outcome.value.is_none());
    }

    #[test]
    fn test_depreciation_example() {
        let outcome = test_formula(
            "({acquisition_cost} - {salvage_value}) / {useful_life}",
            &sample(&[
                ("acquisition_cost", 120_000.0),
                ("salvage_value", 20_000.0),
                ("useful_life", 10.0),
            ]),
        );
        assert_eq!(outcome.value, Some(10_000.0));
    }

    #[test]
    fn test_invalid_formula_fails_preview_too() {
        let outcome = test_formula("{cost} +", &sample(&[("cost", 10.0)]));
        assert!(!outcome.success);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn test_catalogs_nonempty() {
        assert!(!available_fields().is_empty());
        assert!(!example_formulas().is_empty());
        // Every example must itself validate.
        for example in example_formulas() {
            let v = validate_formula(example.formula);
            assert!(v.valid, "example '{}' failed: {:?}", example.name, v.error);
        }
    }
}
