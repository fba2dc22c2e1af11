//! Utility functions for formatting replies

use crate::constants::emoji;
use vault::system::{DiskUsage, SpeedReport};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes = bytes as f64;
    let unit_index = (bytes.ln() / 1024_f64.ln()).floor() as usize;
    let unit_index = unit_index.min(UNITS.len() - 1);

    let size = bytes / 1024_f64.powi(unit_index as i32);
    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Format a byte count as gigabytes with two decimals
pub fn format_gigabytes(bytes: u64) -> String {
    format!("{:.2} GB", bytes as f64 / GIB)
}

/// Truncate hash to first N characters for display
pub fn truncate_hash(hash: &str, len: usize) -> &str {
    if hash.len() > len {
        &hash[..len]
    } else {
        hash
    }
}

/// Reply text for `/local`
pub fn format_disk_usage(usage: &DiskUsage) -> String {
    format!(
        "{} Local Storage Usage:\n\
        Total: {}\n\
        Used: {}\n\
        Free: {}",
        emoji::STORAGE,
        format_gigabytes(usage.total),
        format_gigabytes(usage.used),
        format_gigabytes(usage.free)
    )
}

/// Reply text for `/speed`
pub fn format_speed_report(report: &SpeedReport) -> String {
    format!(
        "{} Internet Speed Test Results:\n\
        Download Speed: {:.2} Mbps\n\
        Upload Speed: {:.2} Mbps\n\
        Measured: {}",
        emoji::SPEED,
        report.download_mbps,
        report.upload_mbps,
        report.measured_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(10), "10.00 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }

    #[test]
    fn test_format_gigabytes() {
        assert_eq!(format_gigabytes(0), "0.00 GB");
        assert_eq!(format_gigabytes(1073741824), "1.00 GB");
        assert_eq!(format_gigabytes(536870912), "0.50 GB");
    }

    #[test]
    fn test_truncate_hash() {
        assert_eq!(truncate_hash("abcdefgh", 4), "abcd");
        assert_eq!(truncate_hash("abc", 4), "abc");
        assert_eq!(truncate_hash("", 4), "");
    }

    #[test]
    fn test_format_disk_usage() {
        let text = format_disk_usage(&DiskUsage {
            total: 4 * 1073741824,
            used: 3 * 1073741824,
            free: 1073741824,
        });
        assert!(text.contains("Total: 4.00 GB"));
        assert!(text.contains("Used: 3.00 GB"));
        assert!(text.contains("Free: 1.00 GB"));
    }
}
