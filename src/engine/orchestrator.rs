//! Before/after benchmark loop.
//!
//! Each iteration benchmarks every package that has a test binary on both
//! sides, appends the output to that side's accumulator, and compares the full
//! accumulated logs. With more than one package, the logs of all packages are
//! also compared together and the head of that report is printed.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::accumulator::{Accumulator, ran_no_benchmarks};
use super::comparator::Comparator;
use super::compiler::CompiledTests;
use super::runner::{TestExecutor, benchmark_args, correctness_args};
use crate::core::config::{DEFAULT_BENCH_FILTER, DEFAULT_BENCHTIME};
use crate::core::{BenchSettings, ComparisonRecord, ComparisonScope};
use crate::report::{AGGREGATE_HEAD_LINES, aggregate_header, package_header, report_head};
use crate::storage::JsonlWriter;
use crate::{BenchError, BenchResult};

/// Label under which the aggregate of all packages is compared.
pub const AGGREGATE_LABEL: &str = "all";

/// Run every compiled test once in correctness mode.
pub fn run_correctness(
    executor: &dyn TestExecutor,
    label: &str,
    tests: &CompiledTests,
    run_filter: &str,
) -> BenchResult<()> {
    info!("Running {label} tests");
    let args = correctness_args(run_filter);
    for (package, test) in tests.iter() {
        debug!(package, "correctness run");
        executor.run(test, &args)?;
    }
    Ok(())
}

pub struct Orchestrator<'a, W: Write> {
    packages: Vec<String>,
    before: CompiledTests,
    after: CompiledTests,
    executor: &'a dyn TestExecutor,
    comparator: &'a dyn Comparator,
    bench_args: Vec<String>,
    sleep: Duration,
    out: W,
    jsonl: Option<JsonlWriter>,
    interrupt: Option<Arc<AtomicBool>>,
    before_logs: Accumulator,
    after_logs: Accumulator,
    iteration: u64,
}

impl<'a, W: Write> Orchestrator<'a, W> {
    pub fn new(
        packages: Vec<String>,
        before: CompiledTests,
        after: CompiledTests,
        executor: &'a dyn TestExecutor,
        comparator: &'a dyn Comparator,
        out: W,
    ) -> Self {
        Orchestrator {
            packages,
            before,
            after,
            executor,
            comparator,
            bench_args: benchmark_args(&BenchSettings {
                filter: DEFAULT_BENCH_FILTER.to_string(),
                benchmem: false,
                benchtime: DEFAULT_BENCHTIME,
            }),
            sleep: Duration::ZERO,
            out,
            jsonl: None,
            interrupt: None,
            before_logs: Accumulator::new(),
            after_logs: Accumulator::new(),
            iteration: 0,
        }
    }

    pub fn with_bench(mut self, settings: &BenchSettings) -> Self {
        self.bench_args = benchmark_args(settings);
        self
    }

    pub fn with_sleep(mut self, sleep: Duration) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn with_jsonl(mut self, writer: JsonlWriter) -> Self {
        self.jsonl = Some(writer);
        self
    }

    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Number of completed iterations.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn before_log(&self, package: &str) -> &str {
        self.before_logs.get(package)
    }

    pub fn after_log(&self, package: &str) -> &str {
        self.after_logs.get(package)
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Loop until interrupted, or until `limit` iterations have completed.
    ///
    /// Returns immediately when no package has a test binary on both sides.
    pub fn run(&mut self, limit: Option<u64>) -> BenchResult<u64> {
        if !self.has_runnable_package() {
            warn!("No package has test binaries on both sides; nothing to benchmark");
            return Ok(self.iteration);
        }
        while limit.is_none_or(|n| self.iteration < n) {
            self.run_iteration()?;
        }
        Ok(self.iteration)
    }

    pub fn run_iteration(&mut self) -> BenchResult<()> {
        self.check_interrupt()?;
        let n = self.iteration + 1;
        let packages = std::mem::take(&mut self.packages);
        let result = self.benchmark_packages(&packages, n);
        self.packages = packages;
        result?;

        if self.packages.len() > 1 {
            self.compare_all(n)?;
        }
        self.iteration = n;
        Ok(())
    }

    fn has_runnable_package(&self) -> bool {
        self.packages
            .iter()
            .any(|p| self.before.contains(p) && self.after.contains(p))
    }

    fn benchmark_packages(&mut self, packages: &[String], n: u64) -> BenchResult<()> {
        for package in packages {
            let (Some(before), Some(after)) = (self.before.get(package), self.after.get(package))
            else {
                continue;
            };
            self.check_interrupt()?;

            let start = Instant::now();
            debug!("Running before benchmarks: {package}");
            let out = self.executor.run(before, &self.bench_args)?;
            self.before_logs.append(package, &out);
            self.pause()?;

            debug!("Running after benchmarks: {package}");
            let out = self.executor.run(after, &self.bench_args)?;
            self.after_logs.append(package, &out);

            let before_log = self.before_logs.get(package);
            let after_log = self.after_logs.get(package);
            if !(ran_no_benchmarks(before_log) && ran_no_benchmarks(after_log)) {
                let header = package_header(package, n, start.elapsed());
                let report = self.comparator.compare(package, before_log, after_log)?;
                self.emit(&header, &[report.as_str()])?;
                self.record(
                    ComparisonRecord::new(n, ComparisonScope::Package, package.as_str(), report)
                        .with_elapsed_ms(start.elapsed().as_millis()),
                )?;
            }
            self.pause()?;
        }
        Ok(())
    }

    fn compare_all(&mut self, n: u64) -> BenchResult<()> {
        self.check_interrupt()?;
        let before_all = self.before_logs.concat(&self.packages);
        let after_all = self.after_logs.concat(&self.packages);
        let report = self
            .comparator
            .compare(AGGREGATE_LABEL, &before_all, &after_all)?;
        let head = report_head(&report, AGGREGATE_HEAD_LINES);
        self.emit(&aggregate_header(n), &head)?;
        self.record(ComparisonRecord::new(
            n,
            ComparisonScope::Aggregate,
            AGGREGATE_LABEL,
            report.as_str(),
        ))
    }

    fn emit(&mut self, header: &str, lines: &[&str]) -> BenchResult<()> {
        let write = |out: &mut W| -> std::io::Result<()> {
            writeln!(out, "{header}")?;
            for line in lines {
                writeln!(out, "{line}")?;
            }
            writeln!(out)?;
            out.flush()
        };
        write(&mut self.out).map_err(|e| BenchError::io("failed to write report", e))
    }

    fn record(&self, record: ComparisonRecord) -> BenchResult<()> {
        match &self.jsonl {
            Some(writer) => writer.append(&record),
            None => Ok(()),
        }
    }

    fn pause(&self) -> BenchResult<()> {
        if !self.sleep.is_zero() {
            std::thread::sleep(self.sleep);
        }
        self.check_interrupt()
    }

    fn check_interrupt(&self) -> BenchResult<()> {
        match &self.interrupt {
            Some(flag) if flag.load(Ordering::SeqCst) => Err(BenchError::Interrupted),
            _ => Ok(()),
        }
    }
}
