//! Toolchain abstraction for probing a toolchain root and building test binaries.
//!
//! A `Toolchain` is one installation being benchmarked. It is responsible for:
//! - Reporting its version (display only)
//! - Enumerating the standard package set
//! - Resolving a package's source directory
//! - Building a package's test binary
//!
//! Running the built binaries belongs to `crate::engine::runner`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::core::BuildFlags;
use crate::exec::{CommandSpec, EnvPolicy, run_checked};
use crate::BenchResult;

/// Packages under this prefix are command-line tools, not library packages.
pub const COMMAND_PACKAGE_PREFIX: &str = "cmd/";

/// Ambient variables forwarded to the isolated test-build environment, if set.
pub const BUILD_ENV_PASSTHROUGH: &[&str] = &["PATH", "GOPATH", "HOME", "GOCACHE"];

pub trait Toolchain {
    /// Root directory of the installation.
    fn root(&self) -> &Path;

    /// Version string reported by the toolchain.
    fn version(&self) -> BenchResult<String>;

    /// Full standard package set, minus command packages, in the tool's order.
    fn list_std(&self) -> BenchResult<Vec<String>>;

    /// Source directory of `package`; compiled tests run from here.
    fn package_dir(&self, package: &str) -> BenchResult<PathBuf>;

    /// Build the test binary for `package` into `output`.
    ///
    /// Succeeding without creating `output` means the package has no tests.
    fn build_test(&self, package: &str, output: &Path, flags: &BuildFlags) -> BenchResult<()>;
}

/// Drop blank lines and command packages, preserving order.
pub fn filter_command_packages(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMAND_PACKAGE_PREFIX))
        .map(str::to_string)
        .collect()
}

/// The Go toolchain layout: `<root>/bin/go`.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    root: PathBuf,
}

impl GoToolchain {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        GoToolchain { root: root.into() }
    }

    pub fn go_binary(&self) -> PathBuf {
        self.root.join("bin").join("go")
    }

    fn go(&self) -> CommandSpec {
        CommandSpec::new(self.go_binary())
            .current_dir(&self.root)
            .env_policy(EnvPolicy::Inherit(vec![(
                "GOROOT".to_string(),
                self.root.clone().into_os_string(),
            )]))
    }

    /// Minimal environment for test builds, isolated from the caller's toolchain config.
    pub fn build_env(&self) -> Vec<(String, OsString)> {
        let mut vars = vec![("GOROOT".to_string(), self.root.clone().into_os_string())];
        for name in BUILD_ENV_PASSTHROUGH {
            if let Some(value) = std::env::var_os(name) {
                vars.push((name.to_string(), value));
            }
        }
        vars
    }
}

impl Toolchain for GoToolchain {
    fn root(&self) -> &Path {
        &self.root
    }

    fn version(&self) -> BenchResult<String> {
        run_checked(&self.go().arg("version"))
    }

    fn list_std(&self) -> BenchResult<Vec<String>> {
        let out = run_checked(&self.go().args(["list", "std"]))?;
        Ok(filter_command_packages(&out))
    }

    fn package_dir(&self, package: &str) -> BenchResult<PathBuf> {
        let out = run_checked(&self.go().args(["list", "-f", "{{.Dir}}", package]))?;
        Ok(PathBuf::from(out))
    }

    fn build_test(&self, package: &str, output: &Path, flags: &BuildFlags) -> BenchResult<()> {
        let cmd = CommandSpec::new(self.go_binary())
            .current_dir(&self.root)
            .env_policy(EnvPolicy::Exact(self.build_env()))
            .arg("test")
            .arg("-c")
            .arg(format!("-ldflags={}", flags.ldflags))
            .arg(format!("-gcflags={}", flags.gcflags))
            .arg("-o")
            .arg(output)
            .arg(package);
        run_checked(&cmd).map(|_| ())
    }
}

/// Mock toolchain for testing purposes.
///
/// Builds write a placeholder file for every package in `with_tests`; other
/// packages build successfully without producing a binary.
#[derive(Debug, Clone)]
pub struct MockToolchain {
    pub root: PathBuf,
    pub mock_version: String,
    pub std_listing: String,
    pub with_tests: Vec<String>,
    /// Whether operations should fail
    pub should_fail: bool,
}

impl Default for MockToolchain {
    fn default() -> Self {
        MockToolchain {
            root: PathBuf::from("/mock/root"),
            mock_version: "go version mock".to_string(),
            std_listing: String::new(),
            with_tests: Vec::new(),
            should_fail: false,
        }
    }
}

impl MockToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tests<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_tests = packages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_listing(mut self, listing: impl Into<String>) -> Self {
        self.std_listing = listing.into();
        self
    }

    /// Make all operations fail.
    pub fn failing(mut self) -> Self {
        self.should_fail = true;
        self
    }

    fn check(&self, what: &str) -> BenchResult<()> {
        if self.should_fail {
            return Err(crate::BenchError::Message(format!("mock {what} failed")));
        }
        Ok(())
    }
}

impl Toolchain for MockToolchain {
    fn root(&self) -> &Path {
        &self.root
    }

    fn version(&self) -> BenchResult<String> {
        self.check("version")?;
        Ok(self.mock_version.clone())
    }

    fn list_std(&self) -> BenchResult<Vec<String>> {
        self.check("list")?;
        Ok(filter_command_packages(&self.std_listing))
    }

    fn package_dir(&self, package: &str) -> BenchResult<PathBuf> {
        self.check("package dir")?;
        Ok(self.root.join("src").join(package))
    }

    fn build_test(&self, package: &str, output: &Path, _flags: &BuildFlags) -> BenchResult<()> {
        self.check("build")?;
        if self.with_tests.iter().any(|p| p == package) {
            std::fs::write(output, b"mock test binary")
                .map_err(|e| crate::BenchError::io(format!("write {}", output.display()), e))?;
        }
        Ok(())
    }
}
