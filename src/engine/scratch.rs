//! Process-wide scratch directory for test binaries and comparator inputs.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{BenchError, BenchResult};

/// Scratch directory acquired at startup.
///
/// Removed when dropped unless created with `keep = true`, in which case it
/// stays behind for inspection.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
    keep: bool,
}

impl ScratchDir {
    pub fn create(keep: bool) -> BenchResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("abbench")
            .disable_cleanup(keep)
            .tempdir()
            .map_err(|e| BenchError::io("failed to create scratch directory", e))?;
        Ok(ScratchDir { dir, keep })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn is_kept(&self) -> bool {
        self.keep
    }
}

/// Write `data` to `dir/name`, returning the full path.
pub fn write_scratch_file(dir: &Path, name: &str, data: &str) -> BenchResult<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, data)
        .map_err(|e| BenchError::io(format!("could not write {}", path.display()), e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_on_drop_by_default() {
        let scratch = ScratchDir::create(false).unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.is_dir());
        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn kept_when_requested() {
        let scratch = ScratchDir::create(true).unwrap();
        let path = scratch.path().to_path_buf();
        assert!(scratch.is_kept());
        drop(scratch);
        assert!(path.is_dir());
        std::fs::remove_dir_all(&path).unwrap();
    }

    #[test]
    fn write_scratch_file_overwrites() {
        let scratch = ScratchDir::create(false).unwrap();
        write_scratch_file(scratch.path(), "before-fmt.bench", "one").unwrap();
        let path = write_scratch_file(scratch.path(), "before-fmt.bench", "two").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "two");
    }
}
