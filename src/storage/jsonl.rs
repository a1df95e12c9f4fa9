//! Comparison records as JSON Lines, one record appended per printed report.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::core::schema::{ComparisonRecord, ComparisonScope, SCHEMA_VERSION};
use crate::{BenchError, BenchResult};

/// Append-only store of [`ComparisonRecord`]s.
///
/// The file is opened per append so a run that is killed mid-iteration leaves
/// every earlier line intact.
#[derive(Debug, Clone)]
pub struct JsonlWriter {
    path: PathBuf,
}

impl JsonlWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        JsonlWriter {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file and its parent directory on first use.
    pub fn append(&self, record: &ComparisonRecord) -> BenchResult<()> {
        if record.schema_version != SCHEMA_VERSION {
            return Err(BenchError::Message(format!(
                "schema version mismatch: record has v{}, expected v{}",
                record.schema_version, SCHEMA_VERSION
            )));
        }

        let mut line = serde_json::to_string(record)
            .map_err(|e| BenchError::Message(format!("failed to serialize record: {e}")))?;
        line.push('\n');

        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
                .map_err(|e| BenchError::io(format!("failed to create {}", dir.display()), e))?,
            _ => {}
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()))
            .map_err(|e| BenchError::io(format!("failed to append to {}", self.path.display()), e))
    }

    pub fn read_all(&self) -> BenchResult<Vec<ComparisonRecord>> {
        self.read_matching(|_| true)
    }

    /// Per-package records for `package`, in iteration order.
    pub fn read_package(&self, package: &str) -> BenchResult<Vec<ComparisonRecord>> {
        self.read_matching(|r| r.scope == ComparisonScope::Package && r.package == package)
    }

    fn read_matching(
        &self,
        keep: impl Fn(&ComparisonRecord) -> bool,
    ) -> BenchResult<Vec<ComparisonRecord>> {
        let file = File::open(&self.path)
            .map_err(|e| BenchError::io(format!("failed to open {}", self.path.display()), e))?;

        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                BenchError::io(format!("{}:{}", self.path.display(), idx + 1), e)
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record: ComparisonRecord = serde_json::from_str(&line).map_err(|e| {
                BenchError::Message(format!("{}:{}: {e}", self.path.display(), idx + 1))
            })?;
            if keep(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }
}
