//! Display formatting for KPI values and numeric grid columns.
//!
//! The console shows numbers in one of three shapes: plain, currency or
//! percent. Output is locale-independent (en-US digit grouping, `$`
//! symbol) so the same inputs format identically across runs and
//! environments; KPI previews feed financial displays and must be stable.

use serde::{Deserialize, Serialize};

/// Display format attached to a KPI definition or a numeric column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    #[default]
    Number,
    Currency,
    Percent,
}

impl ValueFormat {
    /// Parse the wire name (`"number"`, `"currency"`, `"percent"`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "number" => Some(Self::Number),
            "currency" => Some(Self::Currency),
            "percent" => Some(Self::Percent),
            _ => None,
        }
    }
}

/// Format a value for display.
///
/// - `Number`: digit-grouped, at most two decimals, trailing zeros trimmed
///   (`1234.5` -> `"1,234.5"`, `12.0` -> `"12"`)
/// - `Currency`: `$` + digit-grouped, always two decimals
/// - `Percent`: raw value scaled by 100, two decimals (`0.153` -> `"15.30%"`)
///
/// Non-finite values render as `"NaN"` / `"∞"` / `"-∞"` rather than
/// panicking; evaluation reports those as errors before display in
/// normal flows.
pub fn format_value(value: f64, format: ValueFormat) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }
    match format {
        ValueFormat::Number => {
            let s = format!("{value:.2}");
            let trimmed = s.trim_end_matches('0').trim_end_matches('.');
            // -0.001 rounds to "-0.00" and trims to "-0"; don't print a
            // signed zero.
            let trimmed = if trimmed == "-0" { "0" } else { trimmed };
            group_digits(trimmed)
        }
        ValueFormat::Currency => {
            let s = format!("{:.2}", value.abs());
            let grouped = group_digits(&s);
            if value < 0.0 && !is_zero_string(&s) {
                format!("-${grouped}")
            } else {
                format!("${grouped}")
            }
        }
        ValueFormat::Percent => format!("{:.2}%", value * 100.0),
    }
}

/// True for "0.00"-style strings (negative zero must not print a sign).
fn is_zero_string(s: &str) -> bool {
    s.chars().all(|c| c == '0' || c == '.')
}

/// Insert `,` thousands separators into a plain decimal string.
/// The input is `format!`-produced: optional leading `-`, digits,
/// optional `.` fraction.
fn group_digits(s: &str) -> String {
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0, "0" ; "zero")]
    #[test_case(12.0, "12" ; "integer drops decimals")]
    #[test_case(1234.5, "1,234.5" ; "trailing zero trimmed")]
    #[test_case(1234567.89, "1,234,567.89" ; "grouping")]
    #[test_case(-9876.25, "-9,876.25" ; "negative grouped")]
    fn test_number_format(value: f64, expected: &str) {
        assert_eq!(format_value(value, ValueFormat::Number), expected);
    }

    #[test_case(0.0, "$0.00" ; "zero")]
    #[test_case(2000.0, "$2,000.00" ; "grouped")]
    #[test_case(1437.5, "$1,437.50" ; "two decimals kept")]
    #[test_case(-250.75, "-$250.75" ; "negative sign before symbol")]
    fn test_currency_format(value: f64, expected: &str) {
        assert_eq!(format_value(value, ValueFormat::Currency), expected);
    }

    #[test_case(0.153, "15.30%" ; "scaled by 100")]
    #[test_case(1.0, "100.00%" ; "unity")]
    #[test_case(-0.05, "-5.00%" ; "negative")]
    fn test_percent_format(value: f64, expected: &str) {
        assert_eq!(format_value(value, ValueFormat::Percent), expected);
    }

    #[test]
    fn test_non_finite_values() {
        assert_eq!(format_value(f64::NAN, ValueFormat::Currency), "NaN");
        assert_eq!(format_value(f64::INFINITY, ValueFormat::Number), "∞");
        assert_eq!(format_value(f64::NEG_INFINITY, ValueFormat::Percent), "-∞");
    }

    #[test]
    fn test_negative_zero_currency() {
        assert_eq!(format_value(-0.001, ValueFormat::Currency), "$0.00");
    }

    #[test]
    fn test_format_is_stable_across_runs() {
        let a = format_value(1234.56, ValueFormat::Currency);
        let b = format_value(1234.56, ValueFormat::Currency);
        assert_eq!(a, b);
        assert_eq!(a, "$1,234.56");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(ValueFormat::parse("currency"), Some(ValueFormat::Currency));
        assert_eq!(ValueFormat::parse("percent"), Some(ValueFormat::Percent));
        assert_eq!(ValueFormat::parse("number"), Some(ValueFormat::Number));
        assert_eq!(ValueFormat::parse("scientific"), None);
    }
}
