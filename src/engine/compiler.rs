//! Test compiler: builds one test binary per package against one toolchain root.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::toolchain::Toolchain;
use crate::core::BuildFlags;
use crate::{BenchResult, flatten_package_name};

/// A compiled, runnable test binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTest {
    /// Path to the binary inside the scratch directory
    pub binary: PathBuf,
    /// Package source directory; tests with relative fixtures must run here
    pub dir: PathBuf,
}

/// Compiled tests for one toolchain root, in package-list order.
#[derive(Debug, Clone, Default)]
pub struct CompiledTests {
    order: Vec<String>,
    by_package: HashMap<String, CompiledTest>,
}

impl CompiledTests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, package: impl Into<String>, test: CompiledTest) {
        let package = package.into();
        if self.by_package.insert(package.clone(), test).is_none() {
            self.order.push(package);
        }
    }

    pub fn get(&self, package: &str) -> Option<&CompiledTest> {
        self.by_package.get(package)
    }

    pub fn contains(&self, package: &str) -> bool {
        self.by_package.contains_key(package)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CompiledTest)> {
        self.order
            .iter()
            .map(|p| (p.as_str(), &self.by_package[p]))
    }
}

/// Deterministic scratch path for a label/package pair.
pub fn test_binary_path(scratch: &Path, label: &str, package: &str) -> PathBuf {
    scratch.join(format!("{label}-{}.test", flatten_package_name(package)))
}

/// Build tests for every package against `toolchain`.
///
/// Packages whose build succeeds without producing a binary have no tests and
/// are left out of the result. Build failures are returned as errors.
pub fn compile_tests(
    toolchain: &dyn Toolchain,
    label: &str,
    packages: &[String],
    scratch: &Path,
    flags: &BuildFlags,
) -> BenchResult<CompiledTests> {
    let mut tests = CompiledTests::new();
    for package in packages {
        let binary = test_binary_path(scratch, label, package);
        toolchain.build_test(package, &binary, flags)?;
        if !binary.exists() {
            debug!(package = %package, label, "no test binary produced");
            continue;
        }
        let dir = toolchain.package_dir(package)?;
        tests.insert(package.clone(), CompiledTest { binary, dir });
    }
    Ok(tests)
}
