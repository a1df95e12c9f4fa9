//! Test runner: executes compiled test binaries in correctness or benchmark mode.

use super::compiler::CompiledTest;
use crate::core::{BenchSettings, Verbosity, format_duration};
use crate::exec::{CommandSpec, run_checked};
use crate::BenchResult;

/// Filter that matches no test name; used to disable tests in benchmark mode.
pub const NO_TESTS_FILTER: &str = "NONE";

pub trait TestExecutor {
    /// Run `test` with `args`, returning its trimmed output. Nonzero exit is an error.
    fn run(&self, test: &CompiledTest, args: &[String]) -> BenchResult<String>;
}

/// Arguments for the one-off correctness run.
pub fn correctness_args(run_filter: &str) -> Vec<String> {
    vec![format!("-test.run={run_filter}")]
}

/// Arguments for a benchmark-mode run.
pub fn benchmark_args(settings: &BenchSettings) -> Vec<String> {
    vec![
        format!("-test.run={NO_TESTS_FILTER}"),
        format!("-test.bench={}", settings.filter),
        format!("-test.benchmem={}", settings.benchmem),
        format!("-test.benchtime={}", format_duration(settings.benchtime)),
    ]
}

/// Runs test binaries as subprocesses from their package directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor {
    verbosity: Verbosity,
}

impl ProcessExecutor {
    pub fn new(verbosity: Verbosity) -> Self {
        ProcessExecutor { verbosity }
    }

    pub fn command(&self, test: &CompiledTest, args: &[String]) -> CommandSpec {
        let mut cmd = CommandSpec::new(&test.binary).current_dir(&test.dir);
        if self.verbosity > Verbosity::COMMANDS {
            cmd = cmd.arg("-test.v");
        }
        cmd.args(args)
    }
}

impl TestExecutor for ProcessExecutor {
    fn run(&self, test: &CompiledTest, args: &[String]) -> BenchResult<String> {
        run_checked(&self.command(test, args))
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::time::Duration;

    use super::*;

    fn test_artifact() -> CompiledTest {
        CompiledTest {
            binary: "/scratch/before-fmt.test".into(),
            dir: "/root/src/fmt".into(),
        }
    }

    #[test]
    fn correctness_mode_applies_run_filter_only() {
        assert_eq!(correctness_args("TestSort"), vec!["-test.run=TestSort"]);
    }

    #[test]
    fn benchmark_mode_disables_tests() {
        let args = benchmark_args(&BenchSettings {
            filter: "Sort".into(),
            benchmem: true,
            benchtime: Duration::from_millis(500),
        });
        assert_eq!(
            args,
            vec![
                "-test.run=NONE",
                "-test.bench=Sort",
                "-test.benchmem=true",
                "-test.benchtime=500ms",
            ]
        );
    }

    #[test]
    fn high_verbosity_prepends_test_v() {
        let args = vec!["-test.run=NONE".to_string()];
        let quiet = ProcessExecutor::new(Verbosity(1)).command(&test_artifact(), &args);
        assert_eq!(quiet.args, vec![OsString::from("-test.run=NONE")]);

        let loud = ProcessExecutor::new(Verbosity(2)).command(&test_artifact(), &args);
        assert_eq!(
            loud.args,
            vec![OsString::from("-test.v"), OsString::from("-test.run=NONE")]
        );
    }

    #[test]
    fn runs_from_package_directory() {
        let cmd = ProcessExecutor::default().command(&test_artifact(), &[]);
        assert_eq!(cmd.dir.as_deref(), Some(std::path::Path::new("/root/src/fmt")));
        assert_eq!(cmd.program, std::path::PathBuf::from("/scratch/before-fmt.test"));
    }
}
