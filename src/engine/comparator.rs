//! Comparator: hands two benchmark logs to an external statistics tool.

use std::path::PathBuf;

use tracing::warn;

use super::scratch::write_scratch_file;
use crate::exec::{CommandSpec, command_string, run_unchecked};
use crate::{BenchResult, flatten_package_name};

pub trait Comparator {
    /// Compare two benchmark logs under `label`, returning the tool's report.
    ///
    /// A failing tool is not an error; the captured output (possibly empty) is
    /// returned instead.
    fn compare(&self, label: &str, before: &str, after: &str) -> BenchResult<String>;
}

/// `benchstat <before-file> <after-file>`.
#[derive(Debug, Clone)]
pub struct Benchstat {
    program: PathBuf,
    scratch: PathBuf,
}

impl Benchstat {
    pub fn new(program: impl Into<PathBuf>, scratch: impl Into<PathBuf>) -> Self {
        Benchstat {
            program: program.into(),
            scratch: scratch.into(),
        }
    }

    /// Scratch file names for a label: `before-<label>.bench`, `after-<label>.bench`.
    pub fn input_names(label: &str) -> (String, String) {
        let flat = flatten_package_name(label);
        (format!("before-{flat}.bench"), format!("after-{flat}.bench"))
    }
}

impl Comparator for Benchstat {
    fn compare(&self, label: &str, before: &str, after: &str) -> BenchResult<String> {
        let (before_name, after_name) = Self::input_names(label);
        let before_file = write_scratch_file(&self.scratch, &before_name, before)?;
        let after_file = write_scratch_file(&self.scratch, &after_name, after)?;

        let cmd = CommandSpec::new(&self.program)
            .arg(before_file)
            .arg(after_file);
        match run_unchecked(&cmd) {
            Ok(out) => {
                if !out.status.success() {
                    warn!(label, status = %out.status, "{} failed", command_string(&cmd));
                }
                Ok(out.text)
            }
            Err(e) => {
                warn!(label, error = %e, "{} could not start", command_string(&cmd));
                Ok(String::new())
            }
        }
    }
}
