//! Output formatting for plans.
//!
//! - [`csv`] - CSV export
//! - [`terminal`] - Terminal report with colors

mod csv;
mod terminal;

pub use csv::plan_csv;
pub use terminal::{format_field, print_report};
