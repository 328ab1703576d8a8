//! Integration tests for formula validation, preview evaluation and
//! display formatting, end to end the way the builder uses them.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::collections::HashMap;

use test_case::test_case;

use syncview::formula::{example_formulas, test_formula, validate_formula};
use syncview::numfmt::{format_value, ValueFormat};

fn sample(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
    pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

#[test]
fn test_validate_reports_variables() {
    let v = validate_formula("{cost} * 1.15");
    assert!(v.valid);
    assert_eq!(v.variables, vec!["cost"]);

    let v = validate_formula("({acquisition_cost} - {salvage_value}) / {useful_life}");
    assert!(v.valid);
    assert_eq!(
        v.variables,
        vec!["acquisition_cost", "salvage_value", "useful_life"]
    );
}

#[test_case("{cost} +" ; "trailing operator")]
#[test_case("{cost" ; "unbalanced brace")]
#[test_case("{}" ; "empty reference")]
#[test_case("{cost} ^ 2" ; "disallowed operator")]
#[test_case("cost * 2" ; "bare identifier outside braces")]
#[test_case("" ; "empty formula")]
#[test_case("(((1)" ; "unclosed paren")]
fn test_invalid_formulas_have_errors(formula: &str) {
    let v = validate_formula(formula);
    assert!(!v.valid, "{formula:?} should be invalid");
    let error = v.error.unwrap();
    assert!(!error.is_empty());
}

#[test]
fn test_preview_multiplication() {
    let outcome = test_formula("{cost}*{quantity}", &sample(&[("cost", 1000.0), ("quantity", 2.0)]));
    assert!(outcome.success);
    assert_eq!(outcome.value, Some(2000.0));
}

#[test]
fn test_missing_field_substitutes_zero() {
    // Deterministic default: absent sample fields evaluate as 0.
    let outcome = test_formula("{missingField}", &sample(&[]));
    assert!(outcome.success);
    assert_eq!(outcome.value, Some(0.0));
}

#[test]
fn test_division_by_zero_is_a_test_failure() {
    let outcome = test_formula("{cost} / {units}", &sample(&[("cost", 500.0), ("units", 0.0)]));
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("division by zero"));
}

#[test]
fn test_invalid_syntax_fails_preview_without_panicking() {
    let outcome = test_formula("{a} {b}", &sample(&[("a", 1.0), ("b", 2.0)]));
    assert!(!outcome.success);
    assert!(outcome.error.is_some());
}

/// The documented round trip: evaluate, then format as currency; the
/// string must be identical across runs for identical inputs.
#[test]
fn test_preview_format_round_trip_is_stable() {
    let record = sample(&[("cost", 1234.56), ("quantity", 2.0)]);
    let first = {
        let outcome = test_formula("{cost} * {quantity}", &record);
        format_value(outcome.value.unwrap(), ValueFormat::Currency)
    };
    for _ in 0..10 {
        let outcome = test_formula("{cost} * {quantity}", &record);
        let formatted = format_value(outcome.value.unwrap(), ValueFormat::Currency);
        assert_eq!(formatted, first);
    }
    assert_eq!(first, "$2,469.12");
}

#[test_case("{cost} * 1.15", &[("cost", 100.0)], 115.0 ; "uplift")]
#[test_case("-{delta}", &[("delta", 4.0)], -4.0 ; "unary minus")]
#[test_case("({a} + {b}) * {c}", &[("a", 1.0), ("b", 2.0), ("c", 3.0)], 9.0 ; "grouping")]
#[test_case("{a} + {b} * {c}", &[("a", 1.0), ("b", 2.0), ("c", 3.0)], 7.0 ; "precedence")]
fn test_evaluation_cases(formula: &str, fields: &[(&str, f64)], expected: f64) {
    let outcome = test_formula(formula, &sample(fields));
    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(outcome.value, Some(expected));
}

/// Every shipped example formula must validate and preview cleanly
/// against a fully populated sample record.
#[test]
fn test_shipped_examples_run() {
    let record = sample(&[
        ("cost", 1_000.0),
        ("quantity", 3.0),
        ("acquisition_cost", 120_000.0),
        ("salvage_value", 20_000.0),
        ("useful_life", 10.0),
        ("accumulated_depreciation", 30_000.0),
    ]);
    for example in example_formulas() {
        let v = validate_formula(example.formula);
        assert!(v.valid, "example '{}' invalid: {:?}", example.name, v.error);
        let outcome = test_formula(example.formula, &record);
        assert!(
            outcome.success,
            "example '{}' failed: {:?}",
            example.name, outcome.error
        );
        // And its declared format must be a known one.
        let format = ValueFormat::parse(example.format).unwrap();
        let formatted = format_value(outcome.value.unwrap(), format);
        assert!(!formatted.is_empty());
    }
}
