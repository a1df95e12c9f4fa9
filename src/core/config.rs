//! Run configuration: command-line values layered over an optional TOML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use super::duration::parse_duration;
use super::verbosity::{CountToken, Verbosity};
use crate::{BenchError, BenchResult};

pub const DEFAULT_RUN_FILTER: &str = "NONE";
pub const DEFAULT_BENCH_FILTER: &str = ".";
pub const DEFAULT_BENCHTIME: Duration = Duration::from_secs(1);
pub const DEFAULT_BENCHSTAT: &str = "benchstat";

/// Values read from a `--config` file. Keys mirror the long flag names.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
pub struct FileConfig {
    pub before: Option<PathBuf>,
    pub after: Option<PathBuf>,
    pub run: Option<String>,
    pub bench: Option<String>,
    pub benchmem: Option<bool>,
    pub benchtime: Option<String>,
    pub ldflags: Option<String>,
    pub gcflags: Option<String>,
    pub sleep: Option<String>,
    pub verbose: Option<u8>,
    pub keep_scratch: Option<bool>,
    pub benchstat: Option<PathBuf>,
    pub iterations: Option<u64>,
    pub jsonl: Option<PathBuf>,
    #[serde(default)]
    pub packages: Vec<String>,
}

pub fn load_file_config(path: &Path) -> BenchResult<FileConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: FileConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(cfg)
}

/// Values supplied on the command line; `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub before: Option<PathBuf>,
    pub after: Option<PathBuf>,
    pub run: Option<String>,
    pub bench: Option<String>,
    pub benchmem: Option<bool>,
    pub benchtime: Option<Duration>,
    pub ldflags: Option<String>,
    pub gcflags: Option<String>,
    pub sleep: Option<Duration>,
    pub verbose: Vec<CountToken>,
    pub keep_scratch: Option<bool>,
    pub benchstat: Option<PathBuf>,
    pub iterations: Option<u64>,
    pub jsonl: Option<PathBuf>,
    pub packages: Vec<String>,
}

/// Options passed to the test-build subcommand verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildFlags {
    pub ldflags: String,
    pub gcflags: String,
}

/// Settings for benchmark-mode runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchSettings {
    pub filter: String,
    pub benchmem: bool,
    pub benchtime: Duration,
}

/// Fully resolved configuration for one comparison run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub before_root: PathBuf,
    pub after_root: PathBuf,
    pub run_filter: String,
    pub bench: BenchSettings,
    pub build: BuildFlags,
    pub sleep: Duration,
    pub verbosity: Verbosity,
    pub keep_scratch: bool,
    pub benchstat: PathBuf,
    pub iterations: Option<u64>,
    pub jsonl: Option<PathBuf>,
    pub packages: Vec<String>,
}

impl RunConfig {
    pub fn resolve(cli: CliOverrides, file: FileConfig) -> BenchResult<Self> {
        let file_duration = |value: Option<String>| -> BenchResult<Option<Duration>> {
            value.map(|s| parse_duration(&s)).transpose()
        };

        let before_root = cli
            .before
            .or(file.before)
            .ok_or_else(|| BenchError::Config("missing --before toolchain root".into()))?;
        let after_root = cli
            .after
            .or(file.after)
            .ok_or_else(|| BenchError::Config("missing --after toolchain root".into()))?;

        let packages = if cli.packages.is_empty() {
            file.packages
        } else {
            cli.packages
        };
        if packages.is_empty() {
            return Err(BenchError::Message(
                "must provide at least one package".into(),
            ));
        }

        let benchtime = match cli.benchtime {
            Some(d) => d,
            None => file_duration(file.benchtime)?.unwrap_or(DEFAULT_BENCHTIME),
        };
        let sleep = match cli.sleep {
            Some(d) => d,
            None => file_duration(file.sleep)?.unwrap_or(Duration::ZERO),
        };
        let verbosity = Verbosity::from_tokens(Verbosity(file.verbose.unwrap_or(0)), &cli.verbose);

        Ok(RunConfig {
            before_root,
            after_root,
            run_filter: cli
                .run
                .or(file.run)
                .unwrap_or_else(|| DEFAULT_RUN_FILTER.to_string()),
            bench: BenchSettings {
                filter: cli
                    .bench
                    .or(file.bench)
                    .unwrap_or_else(|| DEFAULT_BENCH_FILTER.to_string()),
                benchmem: cli.benchmem.or(file.benchmem).unwrap_or(false),
                benchtime,
            },
            build: BuildFlags {
                ldflags: cli.ldflags.or(file.ldflags).unwrap_or_default(),
                gcflags: cli.gcflags.or(file.gcflags).unwrap_or_default(),
            },
            sleep,
            verbosity,
            keep_scratch: cli.keep_scratch.or(file.keep_scratch).unwrap_or(false),
            benchstat: cli
                .benchstat
                .or(file.benchstat)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BENCHSTAT)),
            iterations: cli.iterations.or(file.iterations).filter(|n| *n > 0),
            jsonl: cli.jsonl.or(file.jsonl),
            packages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_cli() -> CliOverrides {
        CliOverrides {
            before: Some("/tmp/root-a".into()),
            after: Some("/tmp/root-b".into()),
            packages: vec!["std".into()],
            ..Default::default()
        }
    }

    #[test]
    fn defaults_apply_when_nothing_set() {
        let cfg = RunConfig::resolve(minimal_cli(), FileConfig::default()).unwrap();
        assert_eq!(cfg.run_filter, "NONE");
        assert_eq!(cfg.bench.filter, ".");
        assert!(!cfg.bench.benchmem);
        assert_eq!(cfg.bench.benchtime, Duration::from_secs(1));
        assert_eq!(cfg.sleep, Duration::ZERO);
        assert_eq!(cfg.verbosity, Verbosity(0));
        assert!(!cfg.keep_scratch);
        assert_eq!(cfg.benchstat, PathBuf::from("benchstat"));
        assert!(cfg.iterations.is_none());
        assert_eq!(cfg.build, BuildFlags::default());
    }

    #[test]
    fn cli_wins_over_file() {
        let file: FileConfig = toml::from_str(
            r#"
            before = "/file/a"
            bench = "Sort"
            sleep = "2s"
            verbose = 1
            "#,
        )
        .unwrap();
        let mut cli = minimal_cli();
        cli.bench = Some("Map".into());
        cli.verbose = vec![CountToken::Increment];
        let cfg = RunConfig::resolve(cli, file).unwrap();
        assert_eq!(cfg.before_root, PathBuf::from("/tmp/root-a"));
        assert_eq!(cfg.bench.filter, "Map");
        assert_eq!(cfg.sleep, Duration::from_secs(2));
        assert_eq!(cfg.verbosity, Verbosity(2));
    }

    #[test]
    fn file_supplies_roots_and_packages() {
        let file: FileConfig = toml::from_str(
            r#"
            before = "/a"
            after = "/b"
            packages = ["fmt", "strings"]
            benchtime = "500ms"
            iterations = 3
            "#,
        )
        .unwrap();
        let cfg = RunConfig::resolve(CliOverrides::default(), file).unwrap();
        assert_eq!(cfg.packages, vec!["fmt", "strings"]);
        assert_eq!(cfg.bench.benchtime, Duration::from_millis(500));
        assert_eq!(cfg.iterations, Some(3));
    }

    #[test]
    fn zero_iterations_means_unbounded() {
        let mut cli = minimal_cli();
        cli.iterations = Some(0);
        let cfg = RunConfig::resolve(cli, FileConfig::default()).unwrap();
        assert!(cfg.iterations.is_none());
    }

    #[test]
    fn missing_packages_is_an_error() {
        let mut cli = minimal_cli();
        cli.packages.clear();
        let err = RunConfig::resolve(cli, FileConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "must provide at least one package");
    }

    #[test]
    fn missing_root_is_an_error() {
        let mut cli = minimal_cli();
        cli.after = None;
        let err = RunConfig::resolve(cli, FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("--after"));
    }

    #[test]
    fn bad_file_duration_is_an_error() {
        let file: FileConfig = toml::from_str(r#"sleep = "soon""#).unwrap();
        assert!(RunConfig::resolve(minimal_cli(), file).is_err());
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>(r#"benchtimes = "1s""#).is_err());
    }

    #[test]
    fn load_file_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abbench.toml");
        std::fs::write(&path, "run = [").unwrap();
        let err = load_file_config(&path).unwrap_err();
        assert!(err.to_string().contains("abbench.toml"), "{err}");
    }
}
