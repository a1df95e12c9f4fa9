use std::time::Duration;

/// Maximum number of aggregate report lines printed per iteration.
pub const AGGREGATE_HEAD_LINES: usize = 50;

/// First `max_lines` lines of `report` (all of them when it is shorter).
pub fn report_head(report: &str, max_lines: usize) -> Vec<&str> {
    report.lines().take(max_lines).collect()
}

pub fn package_header(package: &str, iteration: u64, elapsed: Duration) -> String {
    format!("--- {package}, {iteration} iter ({elapsed:.2?})")
}

pub fn aggregate_header(iteration: u64) -> String {
    format!("--- ALL, {iteration} iter")
}
