//! External process execution.

pub mod process;

pub use process::{CommandSpec, EnvPolicy, command_string, run_checked, run_unchecked};
