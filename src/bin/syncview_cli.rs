//! CLI tool for syncview - evaluates KPI formulas against a record set
//! and outputs JSON
//!
//! Usage:
//!   syncview_cli <records.json> --formula "{cost} * 1.15" [--format currency]
//!   syncview_cli <records.json> --kpis kpis.json [-o out.json]

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};

use syncview::formula::{test_formula, validate_formula};
use syncview::numfmt::{format_value, ValueFormat};
use syncview::types::{KpiDefinition, Record, RecordSet};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!(
            "Usage: syncview_cli <records.json> (--formula <text> [--format <fmt>] | --kpis <kpis.json>) [-o output.json]"
        );
        std::process::exit(1);
    }

    let records_path = &args[1];
    let mut formula: Option<String> = None;
    let mut format = ValueFormat::Number;
    let mut kpis_path: Option<String> = None;
    let mut output_path: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--formula" if i + 1 < args.len() => {
                formula = Some(args[i + 1].clone());
                i += 2;
            }
            "--format" if i + 1 < args.len() => {
                format = match ValueFormat::parse(&args[i + 1]) {
                    Some(f) => f,
                    None => {
                        eprintln!("Unknown format: {}", args[i + 1]);
                        std::process::exit(1);
                    }
                };
                i += 2;
            }
            "--kpis" if i + 1 < args.len() => {
                kpis_path = Some(args[i + 1].clone());
                i += 2;
            }
            "-o" if i + 1 < args.len() => {
                output_path = Some(args[i + 1].clone());
                i += 2;
            }
            other => {
                eprintln!("Unknown argument: {other}");
                std::process::exit(1);
            }
        }
    }

    // Read record set
    let data = match fs::read_to_string(records_path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading {records_path}: {e}");
            std::process::exit(1);
        }
    };
    let records: RecordSet = match serde_json::from_str(&data) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error parsing {records_path}: {e}");
            std::process::exit(1);
        }
    };

    // Collect the KPI definitions to run
    let kpis: Vec<KpiDefinition> = match (formula, kpis_path) {
        (Some(formula), None) => vec![KpiDefinition {
            name: "kpi".to_string(),
            formula,
            format,
        }],
        (None, Some(path)) => {
            let data = match fs::read_to_string(&path) {
                Ok(d) => d,
                Err(e) => {
                    eprintln!("Error reading {path}: {e}");
                    std::process::exit(1);
                }
            };
            match serde_json::from_str(&data) {
                Ok(k) => k,
                Err(e) => {
                    eprintln!("Error parsing {path}: {e}");
                    std::process::exit(1);
                }
            }
        }
        _ => {
            eprintln!("Provide exactly one of --formula or --kpis");
            std::process::exit(1);
        }
    };

    // Validate everything up front; bad formulas fail the whole run.
    for kpi in &kpis {
        let validation = validate_formula(&kpi.formula);
        if !validation.valid {
            eprintln!(
                "Invalid formula '{}': {}",
                kpi.name,
                validation.error.unwrap_or_default()
            );
            std::process::exit(1);
        }
    }

    let results: Vec<serde_json::Value> = records
        .records
        .iter()
        .map(|record| evaluate_record(record, &kpis))
        .collect();

    let json = match serde_json::to_string_pretty(&results) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {e}");
            std::process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                eprintln!("Error writing {path}: {e}");
                std::process::exit(1);
            }
            eprintln!("Written: {path}");
        }
        None => {
            io::stdout().write_all(json.as_bytes()).unwrap();
            println!();
        }
    }
}

/// Evaluate every KPI against one record's numeric fields.
fn evaluate_record(record: &Record, kpis: &[KpiDefinition]) -> serde_json::Value {
    let sample: std::collections::HashMap<String, f64> = record
        .fields
        .iter()
        .filter_map(|(name, value)| value.as_number().map(|n| (name.clone(), n)))
        .collect();

    let mut out = serde_json::Map::new();
    out.insert("key".to_string(), serde_json::Value::String(record.key.clone()));

    for kpi in kpis {
        let outcome = test_formula(&kpi.formula, &sample);
        let entry = match (outcome.success, outcome.value) {
            (true, Some(value)) => serde_json::json!({
                "value": value,
                "formatted": format_value(value, kpi.format),
            }),
            _ => serde_json::json!({
                "error": outcome.error.unwrap_or_default(),
            }),
        };
        out.insert(kpi.name.clone(), entry);
    }

    serde_json::Value::Object(out)
}
