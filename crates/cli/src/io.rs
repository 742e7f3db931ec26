//! Reading record files and writing result arrays

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Read a whole input file into memory
pub fn read_records(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display()))
}

/// Write raw bytes to `path`
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write output file: {}", path.display()))
}

/// Write positions or counts as little-endian `u64` values
pub fn write_u64_le(path: &Path, values: &[usize]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for &v in values {
        writer.write_all(&(v as u64).to_le_bytes())?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    Ok(())
}

/// Lowercase hex rendering of a record, grouped by `group` bytes
pub fn hex_record(record: &[u8], group: usize) -> String {
    let group = group.max(1);
    record
        .chunks(group)
        .map(|chunk| chunk.iter().map(|b| format!("{:02x}", b)).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}
