//! Human-readable and JSON run reports

use rowdedup_core::memory::{format_bytes, DedupFootprint};
use rowdedup_core::DedupStats;
use serde_json::{json, Value};
use std::path::Path;

/// Everything a report needs to know about one run
pub struct RunSummary<'a> {
    pub input: &'a Path,
    pub shape: &'a [usize],
    pub axis: usize,
    pub stats: Option<&'a DedupStats>,
    pub footprint: DedupFootprint,
    pub written: Vec<&'a str>,
}

impl RunSummary<'_> {
    /// Report as a JSON value
    pub fn to_json(&self) -> Value {
        json!({
            "input": self.input.to_string_lossy().to_string(),
            "shape": self.shape,
            "axis": self.axis,
            "total_records": self.stats.map(|s| s.total_records),
            "unique_records": self.stats.map(|s| s.unique_records),
            "duplicates": self.stats.map(|s| s.duplicates),
            "deduplication_rate": self.stats.map(|s| s.dedup_rate()),
            "estimated_memory_bytes": self.footprint.total(),
            "outputs": self.written,
            "dry_run": self.stats.is_none(),
        })
    }

    /// Print a boxed summary to stdout
    pub fn print(&self) {
        println!("\n{}", "═".repeat(60));
        println!("Record Deduplication Complete");
        println!("{}", "═".repeat(60));
        println!("Input:              {}", self.input.display());
        println!("Shape:              {:?} (axis {})", self.shape, self.axis);
        println!(
            "Working memory:     ~{}",
            format_bytes(self.footprint.total())
        );

        match self.stats {
            Some(stats) => {
                println!(
                    "Total records:      {}",
                    format_with_commas(stats.total_records)
                );
                if stats.duplicates > 0 {
                    println!(
                        "Duplicates:         {} ({:.1}%)",
                        format_with_commas(stats.duplicates),
                        stats.dedup_rate()
                    );
                }
                println!(
                    "Unique records:     {}",
                    format_with_commas(stats.unique_records)
                );
            }
            None => println!("Result:             (dry run - nothing computed)"),
        }

        if self.written.is_empty() {
            println!("Outputs:            (none written)");
        } else {
            println!("Outputs:            {}", self.written.join(", "));
        }

        println!("{}", "═".repeat(60));
    }
}

/// Format number with thousand separators
fn format_with_commas(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
