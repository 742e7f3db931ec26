//! Order-preserving deduplication of fixed-width records
//!
//! One left-to-right scan classifies every record into a group. Groups are
//! ranked in the order they are first seen, so the output never depends on
//! record values, only on where duplicates occur.

use crate::identity_index::IdentityIndex;
use crate::records::RecordView;
use crate::{Error, Result};
use tracing::{debug, warn};

/// Caller-owned output buffers for one deduplication call
///
/// Each buffer is optional; an absent buffer is simply never written.
#[derive(Debug, Default)]
pub struct DedupOutputs<'o> {
    /// Slot `k` receives the position of the k-th group's first occurrence
    pub index: Option<&'o mut [usize]>,
    /// Slot `i` receives the rank of the group containing position `i`
    pub inverse: Option<&'o mut [usize]>,
    /// Slot `p` receives the population of the group first seen at `p`;
    /// every other slot is left as the caller initialized it
    pub counts: Option<&'o mut [usize]>,
}

impl<'o> DedupOutputs<'o> {
    /// Request no outputs (only the number of groups is computed)
    pub fn none() -> Self {
        Self::default()
    }

    /// Check every requested buffer has room for `n` slots
    pub(crate) fn check(&self, n: usize) -> Result<()> {
        let buffers = [
            ("index", self.index.as_deref()),
            ("inverse", self.inverse.as_deref()),
            ("counts", self.counts.as_deref()),
        ];
        for (output, buffer) in buffers {
            if let Some(buffer) = buffer {
                if buffer.len() < n {
                    return Err(Error::OutputTooSmall {
                        output,
                        required: n,
                        actual: buffer.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Deduplicate `n` records of `stride` bytes stored contiguously in `data`
///
/// Returns the number of distinct records. Preconditions (buffer sizes,
/// `n * stride` overflow) and the identity index allocation are checked
/// before any output is written, so on error every output is untouched.
///
/// With a zero `stride` every record is the empty span and all records fall
/// into one group.
pub fn dedup(
    n: usize,
    stride: usize,
    data: &[u8],
    index: Option<&mut [usize]>,
    inverse: Option<&mut [usize]>,
    counts: Option<&mut [usize]>,
) -> Result<usize> {
    let records = RecordView::new(data, n, stride)?;
    dedup_view(
        records,
        DedupOutputs {
            index,
            inverse,
            counts,
        },
    )
}

/// Deduplicate the records of an already validated view
pub fn dedup_view(records: RecordView<'_>, outputs: DedupOutputs<'_>) -> Result<usize> {
    outputs.check(records.len())?;

    // Zero-width records all share one entry
    let entries = if records.stride() == 0 {
        records.len().min(1)
    } else {
        records.len()
    };
    let mut identity = IdentityIndex::new(records);
    identity.try_reserve(entries)?;

    let hasher = identity.hasher().clone();
    Ok(scan(records, &mut identity, outputs, |_, span| {
        hasher.hash_span(span)
    }))
}

/// The scan proper
///
/// `hash_of` supplies the hash of record `i`; it must agree with the
/// hasher of `identity`. The index must already have room for every record,
/// which makes the scan infallible.
pub(crate) fn scan<F>(
    records: RecordView<'_>,
    identity: &mut IdentityIndex<'_>,
    outputs: DedupOutputs<'_>,
    mut hash_of: F,
) -> usize
where
    F: FnMut(usize, &[u8]) -> u64,
{
    if records.stride() == 0 && records.len() > 1 {
        warn!(
            "Zero-width records: all {} records form a single group",
            records.len()
        );
    }

    let DedupOutputs {
        mut index,
        mut inverse,
        mut counts,
    } = outputs;

    let mut n_unique = 0usize;
    for (i, span) in records.iter().enumerate() {
        let hash = hash_of(i, span);
        match identity.lookup_hashed(hash, span) {
            Some(first) => {
                // first < i, so inverse[first] was written earlier in this scan
                if let Some(inverse) = inverse.as_deref_mut() {
                    inverse[i] = inverse[first];
                }
                if let Some(counts) = counts.as_deref_mut() {
                    counts[first] += 1;
                }
            }
            None => {
                identity.insert_hashed(hash, i);
                if let Some(index) = index.as_deref_mut() {
                    index[n_unique] = i;
                }
                if let Some(inverse) = inverse.as_deref_mut() {
                    inverse[i] = n_unique;
                }
                if let Some(counts) = counts.as_deref_mut() {
                    counts[i] = 1;
                }
                n_unique += 1;
            }
        }
    }

    debug!(
        "Deduplicated {} records of {} bytes into {} groups (index ~{} bytes)",
        records.len(),
        records.stride(),
        n_unique,
        identity.memory_usage()
    );

    n_unique
}

/// Summary statistics for a deduplication call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupStats {
    /// Total number of records scanned
    pub total_records: usize,
    /// Number of distinct records
    pub unique_records: usize,
    /// Number of records that repeated an earlier one
    pub duplicates: usize,
}

impl DedupStats {
    /// Build stats from a record count and the number of groups found
    pub fn new(total_records: usize, unique_records: usize) -> Self {
        Self {
            total_records,
            unique_records,
            duplicates: total_records - unique_records,
        }
    }

    /// Get the deduplication rate as a percentage
    pub fn dedup_rate(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            (self.duplicates as f64 / self.total_records as f64) * 100.0
        }
    }
}
