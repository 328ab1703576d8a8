//! Data types for the sync console grid.

mod job;
mod kpi;
mod record;

pub use job::*;
pub use kpi::*;
pub use record::*;
