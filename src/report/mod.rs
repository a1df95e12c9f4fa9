//! Console rendering of comparison reports.
//!
//! The comparator output is printed verbatim; this module only frames it with
//! headers and caps the length of the aggregate report.

pub mod console;

pub use console::{AGGREGATE_HEAD_LINES, aggregate_header, package_header, report_head};
