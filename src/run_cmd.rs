//! The `abbench` run: probe, compile, correctness-check, then benchmark until stopped.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::info;

use crate::core::{HostInfo, RunConfig};
use crate::engine::{
    Benchstat, CompiledTests, GoToolchain, Orchestrator, ProcessExecutor, ScratchDir,
    TestExecutor, Toolchain, compile_tests, run_correctness,
};
use crate::{BenchError, BenchResult, JsonlWriter};

/// Positional token standing for the whole standard package set.
pub const STD_PACKAGES: &str = "std";

/// Expand a leading `std` into the before-root's standard package list.
pub fn resolve_packages(before: &dyn Toolchain, requested: &[String]) -> BenchResult<Vec<String>> {
    match requested.first() {
        None => Err(BenchError::Message(
            "must provide at least one package".into(),
        )),
        Some(first) if first == STD_PACKAGES => before.list_std(),
        Some(_) => Ok(requested.to_vec()),
    }
}

/// Packages and compiled tests ready for the benchmark loop.
#[derive(Debug)]
pub struct Prepared {
    pub packages: Vec<String>,
    pub before: CompiledTests,
    pub after: CompiledTests,
}

/// Everything up to the benchmark loop: resolve, compile both sides, run correctness passes.
pub fn prepare(
    config: &RunConfig,
    before: &dyn Toolchain,
    after: &dyn Toolchain,
    executor: &dyn TestExecutor,
    scratch: &ScratchDir,
) -> BenchResult<Prepared> {
    let start = Instant::now();
    info!("Before: {} ({})", before.root().display(), before.version()?);
    info!("After: {} ({})", after.root().display(), after.version()?);

    let packages = resolve_packages(before, &config.packages)?;
    info!("Using scratch dir {}", scratch.path().display());

    info!("Compiling before tests");
    let before_tests = compile_tests(before, "before", &packages, scratch.path(), &config.build)?;
    info!("Compiling after tests");
    let after_tests = compile_tests(after, "after", &packages, scratch.path(), &config.build)?;

    run_correctness(executor, "before", &before_tests, &config.run_filter)?;
    run_correctness(executor, "after", &after_tests, &config.run_filter)?;

    info!("Elapsed: {:.2?}", start.elapsed());
    Ok(Prepared {
        packages,
        before: before_tests,
        after: after_tests,
    })
}

/// Run the full comparison, writing reports to `out`.
///
/// Returns the number of completed iterations, which only happens when an
/// iteration limit is configured. An interrupt ends the run with
/// `BenchError::Interrupted`, including failures of subprocesses killed by it.
pub fn run<W: Write>(config: &RunConfig, out: W, interrupt: Arc<AtomicBool>) -> BenchResult<u64> {
    let scratch = ScratchDir::create(config.keep_scratch)?;
    info!("Host: {}", HostInfo::detect().summary());

    let result = run_in(config, &scratch, out, interrupt.clone());
    if scratch.is_kept() {
        info!("Scratch dir kept at {}", scratch.path().display());
    }
    match result {
        Err(_) if interrupt.load(Ordering::SeqCst) => Err(BenchError::Interrupted),
        other => other,
    }
}

fn run_in<W: Write>(
    config: &RunConfig,
    scratch: &ScratchDir,
    out: W,
    interrupt: Arc<AtomicBool>,
) -> BenchResult<u64> {
    let before = GoToolchain::new(&config.before_root);
    let after = GoToolchain::new(&config.after_root);
    let executor = ProcessExecutor::new(config.verbosity);

    let prepared = prepare(config, &before, &after, &executor, scratch)?;

    let comparator = Benchstat::new(&config.benchstat, scratch.path());
    let mut orchestrator = Orchestrator::new(
        prepared.packages,
        prepared.before,
        prepared.after,
        &executor,
        &comparator,
        out,
    )
    .with_bench(&config.bench)
    .with_sleep(config.sleep)
    .with_interrupt(interrupt);
    if let Some(path) = &config.jsonl {
        orchestrator = orchestrator.with_jsonl(JsonlWriter::new(path));
    }
    orchestrator.run(config.iterations)
}
