//! Progress statistics for long counts.

use std::time::Instant;

use tracing::info;

/// Current process memory usage in bytes (resident set size).
#[cfg(target_os = "linux")]
pub fn memory_usage() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb * 1024)
}

#[cfg(not(target_os = "linux"))]
pub fn memory_usage() -> Option<u64> {
    None
}

/// Format bytes as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// `hh:mm:ss`
pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Rate tracking between periodic log lines.
pub struct Stats {
    pub start_time: Instant,
    last_log_time: Instant,
    last_log_nodes: u64,
    log_interval_secs: u64,
}

impl Stats {
    pub fn new(log_interval_secs: u64) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_log_time: now,
            last_log_nodes: 0,
            log_interval_secs,
        }
    }

    /// Log a progress line if the interval has passed.
    pub fn maybe_log(&mut self, nodes: u64, unique: usize) {
        if self.last_log_time.elapsed().as_secs() >= self.log_interval_secs {
            self.log_progress(nodes, unique);
        }
    }

    pub fn log_progress(&mut self, nodes: u64, unique: usize) {
        let since = self.last_log_time.elapsed().as_secs_f64();
        let rate = if since > 0.0 {
            (nodes - self.last_log_nodes) as f64 / since
        } else {
            0.0
        };
        let memory = memory_usage().map_or_else(|| "?".to_string(), format_bytes);
        info!(
            elapsed = %format_elapsed(self.start_time.elapsed().as_secs()),
            nodes,
            unique,
            rate = %format!("{rate:.0}/s"),
            %memory,
            "perft progress"
        );
        self.last_log_time = Instant::now();
        self.last_log_nodes = nodes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00:00");
        assert_eq!(format_elapsed(3725), "01:02:05");
    }
}
