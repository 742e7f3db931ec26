//! Memory estimates for deduplication runs
//!
//! Lets callers size a run before committing to it (the CLI's dry run
//! reports these numbers).

use std::mem::size_of;

/// Estimated working memory for deduplicating `n` records, excluding the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupFootprint {
    /// Identity index table
    pub index_bytes: usize,
    /// Caller-side output buffers that were requested
    pub output_bytes: usize,
    /// Precomputed hashes (parallel runs only)
    pub hash_bytes: usize,
}

impl DedupFootprint {
    /// Estimate the footprint for `n` records with `outputs` requested buffers
    pub fn estimate(n: usize, outputs: usize, parallel: bool) -> Self {
        // hashbrown keeps its load factor at 7/8 and rounds buckets up to a power of two
        let buckets = (n.saturating_mul(8) / 7)
            .max(1)
            .checked_next_power_of_two()
            .unwrap_or(usize::MAX);
        Self {
            index_bytes: buckets.saturating_mul(size_of::<usize>() + 1),
            output_bytes: n.saturating_mul(size_of::<usize>()).saturating_mul(outputs),
            hash_bytes: if parallel {
                n.saturating_mul(size_of::<u64>())
            } else {
                0
            },
        }
    }

    /// Sum of all parts
    pub fn total(&self) -> usize {
        self.index_bytes
            .saturating_add(self.output_bytes)
            .saturating_add(self.hash_bytes)
    }
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let bytes_f = bytes as f64;

    if bytes_f >= GB {
        format!("{:.2} GB", bytes_f / GB)
    } else if bytes_f >= MB {
        format!("{:.2} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.2} KB", bytes_f / KB)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GB");
    }

    #[test]
    fn test_footprint() {
        let fp = DedupFootprint::estimate(1000, 3, false);
        assert_eq!(fp.output_bytes, 3 * 1000 * size_of::<usize>());
        assert_eq!(fp.hash_bytes, 0);
        // 1000 * 8 / 7 rounds up to 2048 buckets
        assert_eq!(fp.index_bytes, 2048 * (size_of::<usize>() + 1));

        let par = DedupFootprint::estimate(1000, 3, true);
        assert_eq!(par.hash_bytes, 8000);
        assert_eq!(par.total(), fp.total() + 8000);
    }

    #[test]
    fn test_footprint_saturates() {
        let fp = DedupFootprint::estimate(usize::MAX, 3, true);
        assert_eq!(fp.total(), usize::MAX);
    }
}
