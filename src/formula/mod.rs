//! KPI formula parsing, validation and preview evaluation.
//!
//! Formulas are string templates over record fields: `{field}` references
//! plus arithmetic, e.g. `({acquisition_cost} - {salvage_value}) /
//! {useful_life}`. The same formulas ultimately run server-side against
//! real financial data, so the grammar accepted here is the security
//! boundary: a closed recursive-descent parser over numbers, field
//! references, `+ - * /` and parentheses. Nothing is ever passed to a
//! general-purpose evaluator.
//!
//! Validation and preview are split the way the builder UI consumes them:
//! [`validate_formula`] answers "can this be saved" and lists the fields
//! referenced; [`test_formula`] substitutes a sample record and produces
//! the live preview value.

mod eval;
mod parser;
mod token;

pub use eval::{
    available_fields, example_formulas, test_formula, validate_formula, ExampleFormula, FieldInfo,
};
