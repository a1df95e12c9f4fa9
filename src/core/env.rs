//! Host detection for run logs.

/// Machine the comparison runs on.
#[derive(Debug, Clone)]
pub struct HostInfo {
    pub cpu_model: Option<String>,
    pub cpu_cores_logical: Option<usize>,
    pub total_ram_bytes: Option<u64>,
    pub os: String,
    pub hostname: Option<String>,
}

impl Default for HostInfo {
    fn default() -> Self {
        HostInfo {
            cpu_model: None,
            cpu_cores_logical: None,
            total_ram_bytes: None,
            os: std::env::consts::OS.to_string(),
            hostname: None,
        }
    }
}

impl HostInfo {
    pub fn detect() -> Self {
        use sysinfo::System;

        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();

        HostInfo {
            cpu_model: sys
                .cpus()
                .first()
                .map(|c| c.brand().trim().to_string())
                .filter(|s| !s.is_empty()),
            cpu_cores_logical: Some(sys.cpus().len()).filter(|n| *n > 0),
            total_ram_bytes: Some(sys.total_memory()),
            os: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            hostname: System::host_name(),
        }
    }

    /// One-line summary for the startup log.
    pub fn summary(&self) -> String {
        let cpu = self.cpu_model.as_deref().unwrap_or("unknown cpu");
        let cores = self
            .cpu_cores_logical
            .map(|n| format!("{n} cores"))
            .unwrap_or_else(|| "? cores".to_string());
        let ram = self
            .total_ram_bytes
            .map(|b| format!("{:.1} GB", b as f64 / 1_000_000_000.0))
            .unwrap_or_else(|| "? GB".to_string());
        match &self.hostname {
            Some(host) => format!("{host}: {} ({cpu}, {cores}, {ram})", self.os),
            None => format!("{} ({cpu}, {cores}, {ram})", self.os),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_has_os() {
        let host = HostInfo::detect();
        assert!(!host.os.is_empty());
    }

    #[test]
    fn summary_handles_missing_fields() {
        let host = HostInfo {
            os: "linux".into(),
            ..Default::default()
        };
        assert_eq!(host.summary(), "linux (unknown cpu, ? cores, ? GB)");
    }

    #[test]
    fn summary_leads_with_hostname() {
        let host = HostInfo {
            os: "linux".into(),
            hostname: Some("bench-01".into()),
            ..Default::default()
        };
        assert_eq!(host.summary(), "bench-01: linux (unknown cpu, ? cores, ? GB)");
    }

    #[test]
    fn summary_formats_known_fields() {
        let host = HostInfo {
            cpu_model: Some("Test CPU".into()),
            cpu_cores_logical: Some(8),
            total_ram_bytes: Some(16_000_000_000),
            os: "linux".into(),
            hostname: None,
        };
        assert_eq!(host.summary(), "linux (Test CPU, 8 cores, 16.0 GB)");
    }
}
