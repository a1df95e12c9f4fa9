//! ComparisonRecord schema v1, one JSON line per printed comparison.

use serde::{Deserialize, Serialize};

/// Schema version for forward compatibility
pub const SCHEMA_VERSION: u32 = 1;

/// Whether a record covers one package or the aggregate of all packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonScope {
    Package,
    Aggregate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub schema_version: u32,
    /// RFC 3339 timestamp
    pub timestamp: String,
    /// 1-based loop iteration
    pub iteration: u64,
    pub scope: ComparisonScope,
    /// Package identifier, or `all` for the aggregate
    pub package: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u128>,
    /// Comparator output, verbatim
    pub report: String,
}

impl ComparisonRecord {
    pub fn new(
        iteration: u64,
        scope: ComparisonScope,
        package: impl Into<String>,
        report: impl Into<String>,
    ) -> Self {
        ComparisonRecord {
            schema_version: SCHEMA_VERSION,
            timestamp: now_string(),
            iteration,
            scope,
            package: package.into(),
            elapsed_ms: None,
            report: report.into(),
        }
    }

    pub fn with_elapsed_ms(mut self, elapsed_ms: u128) -> Self {
        self.elapsed_ms = Some(elapsed_ms);
        self
    }
}

fn now_string() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
