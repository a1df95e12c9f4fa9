//! Engine module: compiles, runs and compares test binaries from two toolchain roots.
//!
//! # Architecture
//!
//! - **Toolchain**: probes a root and builds test binaries.
//!   Example: `GoToolchain` (shells out to `<root>/bin/go`).
//!
//! - **TestExecutor**: runs a compiled test binary in correctness or benchmark mode.
//!   Example: `ProcessExecutor`.
//!
//! - **Comparator**: turns two benchmark logs into a delta report.
//!   Example: `Benchstat`.
//!
//! The `orchestrator` submodule drives these across the package set and across
//! repeated iterations.
//!
//! # Boundaries
//!
//! - `Toolchain` does NOT run tests; the orchestrator never builds anything.
//! - Benchmark output is opaque text: nothing in the engine parses it except
//!   the `ran_no_benchmarks` predicate.

pub mod accumulator;
pub mod comparator;
pub mod compiler;
pub mod orchestrator;
pub mod runner;
pub mod scratch;
pub mod toolchain;

// Re-export key types for convenience
pub use accumulator::{Accumulator, NO_BENCHMARKS_SENTINEL, ran_no_benchmarks};
pub use comparator::{Benchstat, Comparator};
pub use compiler::{CompiledTest, CompiledTests, compile_tests};
pub use orchestrator::{AGGREGATE_LABEL, Orchestrator, run_correctness};
pub use runner::{ProcessExecutor, TestExecutor, benchmark_args, correctness_args};
pub use scratch::ScratchDir;
pub use toolchain::{GoToolchain, MockToolchain, Toolchain, filter_command_packages};
