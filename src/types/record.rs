use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::numfmt::ValueFormat;

/// A single field value within a record.
///
/// Records arrive from the backend as JSON objects; fields are either text,
/// numbers, booleans or null. Numbers are what KPI formulas operate on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl FieldValue {
    /// Numeric view of the value, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.parse::<f64>().ok(),
            Self::Bool(_) | Self::Null => None,
        }
    }

    /// Display text for the grid (before any column format is applied).
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            Self::Null => String::new(),
        }
    }
}

/// One record row (a classification entry, an asset, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Stable identifying key. Row identity must survive re-sorts and
    /// filtered views, so the grid never keys rows by position.
    pub key: String,
    /// Field name -> value.
    #[serde(flatten)]
    pub fields: HashMap<String, FieldValue>,
}

impl Record {
    /// Look up a field's numeric value.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(FieldValue::as_number)
    }

    /// Look up a field's display text. Missing fields render empty.
    pub fn display(&self, field: &str) -> String {
        self.fields
            .get(field)
            .map(FieldValue::display)
            .unwrap_or_default()
    }

    /// Case-insensitive substring match across all text fields and the key.
    /// Used by the grid's client-side filter box.
    pub fn matches_filter(&self, query_lower: &str) -> bool {
        if query_lower.is_empty() {
            return true;
        }
        if self.key.to_lowercase().contains(query_lower) {
            return true;
        }
        self.fields.values().any(|v| match v {
            FieldValue::Text(s) => s.to_lowercase().contains(query_lower),
            FieldValue::Number(n) => n.to_string().contains(query_lower),
            FieldValue::Bool(_) | FieldValue::Null => false,
        })
    }
}

/// Column definition for the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Field name this column reads from each record.
    pub name: String,
    /// Header label.
    pub title: String,
    /// Column width in logical pixels.
    #[serde(default = "default_col_width")]
    pub width: f32,
    /// Display format for numeric values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ValueFormat>,
}

fn default_col_width() -> f32 {
    crate::layout::DEFAULT_COL_WIDTH
}

/// The loadable unit for a grid view: column definitions plus rows.
///
/// Row order is whatever the backend returned; the grid preserves it
/// across renders unless the source data changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    pub columns: Vec<ColumnSpec>,
    pub records: Vec<Record>,
}

impl RecordSet {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if there are no rows (the grid renders a placeholder instead
    /// of an empty scroll region).
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;

    fn record(key: &str, pairs: &[(&str, FieldValue)]) -> Record {
        Record {
            key: key.to_string(),
            fields: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_field_value_as_number() {
        assert_eq!(FieldValue::Number(2.5).as_number(), Some(2.5));
        assert_eq!(FieldValue::Text("17".to_string()).as_number(), Some(17.0));
        assert_eq!(FieldValue::Text("n/a".to_string()).as_number(), None);
        assert_eq!(FieldValue::Bool(true).as_number(), None);
        assert_eq!(FieldValue::Null.as_number(), None);
    }

    #[test]
    fn test_record_json_shape() {
        // Backend rows are flat JSON objects; `fields` must flatten.
        let json = r#"{"key":"PFA-001","assetTag":"TR-100","cost":1250.0}"#;
        let rec: Record = serde_json::from_str(json).unwrap();
        assert_eq!(rec.key, "PFA-001");
        assert_eq!(rec.number("cost"), Some(1250.0));
        assert_eq!(rec.display("assetTag"), "TR-100");
        assert_eq!(rec.display("missing"), "");
    }

    #[test]
    fn test_matches_filter() {
        let rec = record(
            "PFA-001",
            &[
                ("name", FieldValue::Text("Transformer".to_string())),
                ("cost", FieldValue::Number(1250.0)),
            ],
        );
        assert!(rec.matches_filter(""));
        assert!(rec.matches_filter("transfo"));
        assert!(rec.matches_filter("pfa-001"));
        assert!(rec.matches_filter("1250"));
        assert!(!rec.matches_filter("capacitor"));
    }
}
