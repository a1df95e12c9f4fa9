//! Core types: run configuration, the verbosity flag, durations and record schema.

pub mod config;
pub mod duration;
pub mod env;
pub mod schema;
pub mod verbosity;

// Re-export key types for convenience
pub use config::{BenchSettings, BuildFlags, CliOverrides, FileConfig, RunConfig, load_file_config};
pub use duration::{format_duration, parse_duration};
pub use env::HostInfo;
pub use schema::{ComparisonRecord, ComparisonScope, SCHEMA_VERSION};
pub use verbosity::{CountToken, Verbosity};
