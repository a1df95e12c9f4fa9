//! Append-only per-package benchmark logs.

use std::collections::HashMap;

/// Entire output of a benchmark run that matched no benchmark.
pub const NO_BENCHMARKS_SENTINEL: &str = "PASS";

/// True when `text` holds output and every non-blank line is the sentinel,
/// i.e. every accumulated run executed no benchmark at all.
pub fn ran_no_benchmarks(text: &str) -> bool {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();
    lines.peek().is_some() && lines.all(|l| l == NO_BENCHMARKS_SENTINEL)
}

/// Benchmark output collected so far for one side of the comparison.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    logs: HashMap<String, String>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one run's output, wrapped in newlines.
    pub fn append(&mut self, package: &str, output: &str) {
        let log = self.logs.entry(package.to_string()).or_default();
        log.push('\n');
        log.push_str(output);
        log.push('\n');
    }

    /// Accumulated text for `package`; empty if nothing ran.
    pub fn get(&self, package: &str) -> &str {
        self.logs.get(package).map(String::as_str).unwrap_or("")
    }

    /// Concatenate the logs of `packages` in order.
    pub fn concat<S: AsRef<str>>(&self, packages: &[S]) -> String {
        packages.iter().map(|p| self.get(p.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_wraps_each_run() {
        let mut acc = Accumulator::new();
        acc.append("fmt", "run1");
        acc.append("fmt", "run2");
        assert_eq!(acc.get("fmt"), "\nrun1\n\nrun2\n");
    }

    #[test]
    fn get_missing_is_empty() {
        assert_eq!(Accumulator::new().get("nope"), "");
    }

    #[test]
    fn concat_follows_package_order_and_skips_missing() {
        let mut acc = Accumulator::new();
        acc.append("b", "B");
        acc.append("a", "A");
        assert_eq!(acc.concat(&["a", "missing", "b"]), "\nA\n\nB\n");
    }

    #[test]
    fn sentinel_only_output_ran_no_benchmarks() {
        assert!(ran_no_benchmarks("PASS"));
        let mut acc = Accumulator::new();
        acc.append("x", "PASS");
        acc.append("x", "PASS");
        assert!(ran_no_benchmarks(acc.get("x")));
    }

    #[test]
    fn any_benchmark_line_counts_as_ran() {
        assert!(!ran_no_benchmarks("\nBenchmarkSort-8 100 10 ns/op\nPASS\n"));
        assert!(!ran_no_benchmarks("\nPASS\n\nok fmt 0.1s\n"));
    }

    #[test]
    fn empty_text_is_not_the_sentinel() {
        assert!(!ran_no_benchmarks(""));
        assert!(!ran_no_benchmarks("\n\n"));
    }
}
