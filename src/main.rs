#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use abbench::core::duration::parse_duration_arg;
use abbench::core::verbosity::parse_count_token;
use abbench::core::{CliOverrides, CountToken, FileConfig, RunConfig, load_file_config};
use abbench::{BenchError, BenchResult, run_cmd};

#[derive(Parser, Debug)]
#[command(name = "abbench")]
#[command(
    about = "Compare package benchmarks between two toolchain roots",
    long_about = "Builds each package's tests against a 'before' and an 'after' toolchain root, \
                  checks that they pass, then benchmarks both sides repeatedly and prints \
                  comparator reports until interrupted."
)]
struct Cli {
    /// Toolchain root for 'before'
    #[arg(long, value_name = "ROOT")]
    before: Option<PathBuf>,

    /// Toolchain root for 'after'
    #[arg(long, value_name = "ROOT")]
    after: Option<PathBuf>,

    /// Test filter for the correctness runs (-test.run=)
    #[arg(long, value_name = "REGEXP")]
    run: Option<String>,

    /// Benchmark filter (-test.bench=)
    #[arg(long, value_name = "REGEXP")]
    bench: Option<String>,

    /// Report memory allocation statistics (-test.benchmem=)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    benchmem: Option<bool>,

    /// Minimum time per benchmark (-test.benchtime=), e.g. 1s, 500ms
    #[arg(long, value_parser = parse_duration_arg)]
    benchtime: Option<Duration>,

    /// Linker flags passed to the test build (-ldflags=)
    #[arg(long, allow_hyphen_values = true)]
    ldflags: Option<String>,

    /// Compiler flags passed to the test build (-gcflags=)
    #[arg(long, allow_hyphen_values = true)]
    gcflags: Option<String>,

    /// Time to sleep between benchmark runs
    #[arg(long, value_parser = parse_duration_arg)]
    sleep: Option<Duration>,

    /// Verbosity: repeat to increase, or set with -v=N (1 echoes commands, 2 dumps output)
    #[arg(
        short = 'v',
        long = "verbose",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        action = ArgAction::Append,
        value_parser = parse_count_token
    )]
    verbose: Vec<CountToken>,

    /// Keep the scratch directory (test binaries, comparator inputs) on exit
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    keep_scratch: Option<bool>,

    /// Benchmark comparison program
    #[arg(long, value_name = "PATH")]
    benchstat: Option<PathBuf>,

    /// Stop after this many iterations (0 or unset: run until interrupted)
    #[arg(long)]
    iterations: Option<u64>,

    /// Append a JSON record for every printed comparison to this file
    #[arg(long, value_name = "PATH")]
    jsonl: Option<PathBuf>,

    /// TOML file with defaults for any of the options above
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Packages to benchmark, or `std` for the before-root's standard packages
    packages: Vec<String>,
}

impl Cli {
    fn into_overrides(self) -> (Option<PathBuf>, CliOverrides) {
        let overrides = CliOverrides {
            before: self.before,
            after: self.after,
            run: self.run,
            bench: self.bench,
            benchmem: self.benchmem,
            benchtime: self.benchtime,
            ldflags: self.ldflags,
            gcflags: self.gcflags,
            sleep: self.sleep,
            verbose: self.verbose,
            keep_scratch: self.keep_scratch,
            benchstat: self.benchstat,
            iterations: self.iterations,
            jsonl: self.jsonl,
            packages: self.packages,
        };
        (self.config, overrides)
    }
}

fn init_tracing(config: &RunConfig) {
    let env = std::env::var("ABBENCH_LOG")
        .unwrap_or_else(|_| config.verbosity.log_filter().to_string());
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn install_interrupt_handler() -> BenchResult<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = flag.clone();
    ctrlc::set_handler(move || {
        // A second interrupt while shutting down exits right away.
        if handler_flag.swap(true, Ordering::SeqCst) {
            std::process::exit(0);
        }
    })
    .map_err(|e| BenchError::Message(format!("failed to install interrupt handler: {e}")))?;
    Ok(flag)
}

fn run(cli: Cli) -> BenchResult<()> {
    let (config_path, overrides) = cli.into_overrides();
    let file = match config_path {
        Some(path) => load_file_config(&path)?,
        None => FileConfig::default(),
    };
    let config = RunConfig::resolve(overrides, file)?;
    init_tracing(&config);

    let interrupt = install_interrupt_handler()?;
    let iterations = run_cmd::run(&config, std::io::stdout().lock(), interrupt)?;
    tracing::info!("Completed {iterations} iterations");
    Ok(())
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) | Err(BenchError::Interrupted) => {}
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    }
}
