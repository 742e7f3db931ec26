//! Parallel record hashing with a sequential reconciliation scan
//!
//! Hashing is the only part of the scan that does not depend on earlier
//! records, so it is spread over the rayon pool. Group assignment still runs
//! strictly left to right over the precomputed hashes, which keeps the output
//! identical to [`dedup`](crate::dedup::dedup) for every input.

use crate::dedup::{dedup_view, scan, DedupOutputs};
use crate::identity_index::IdentityIndex;
use crate::records::RecordView;
use crate::{Error, Result};
use rayon::prelude::*;
use tracing::debug;

/// Inputs with fewer records than this are scanned without the thread pool
pub const PARALLEL_THRESHOLD: usize = 1 << 16;

/// Records hashed per rayon task
const HASH_CHUNK: usize = 4096;

/// Parallel counterpart of [`dedup`](crate::dedup::dedup)
///
/// Same arguments, same outputs, same error behavior. Needs one extra `u64`
/// per record for the precomputed hashes.
pub fn dedup_parallel(
    n: usize,
    stride: usize,
    data: &[u8],
    index: Option<&mut [usize]>,
    inverse: Option<&mut [usize]>,
    counts: Option<&mut [usize]>,
) -> Result<usize> {
    let records = RecordView::new(data, n, stride)?;
    dedup_view_parallel(
        records,
        DedupOutputs {
            index,
            inverse,
            counts,
        },
    )
}

/// Parallel counterpart of [`dedup_view`](crate::dedup::dedup_view)
pub fn dedup_view_parallel(records: RecordView<'_>, outputs: DedupOutputs<'_>) -> Result<usize> {
    // Zero-width records have nothing to hash
    if records.len() < PARALLEL_THRESHOLD || records.stride() == 0 {
        return dedup_view(records, outputs);
    }
    outputs.check(records.len())?;

    let mut identity = IdentityIndex::new(records);
    identity.try_reserve(records.len())?;

    let mut hashes: Vec<u64> = Vec::new();
    hashes.try_reserve_exact(records.len()).map_err(|e| {
        Error::AllocationFailed(format!("hash buffer for {} records: {}", records.len(), e))
    })?;
    hashes.resize(records.len(), 0);

    let hasher = identity.hasher().clone();
    let stride = records.stride();
    records
        .as_bytes()
        .par_chunks(stride * HASH_CHUNK)
        .zip(hashes.par_chunks_mut(HASH_CHUNK))
        .for_each(|(bytes, out)| {
            for (span, slot) in bytes.chunks_exact(stride).zip(out.iter_mut()) {
                *slot = hasher.hash_span(span);
            }
        });

    debug!(
        "Hashed {} records on {} threads",
        records.len(),
        rayon::current_num_threads()
    );

    Ok(scan(records, &mut identity, outputs, |i, _| hashes[i]))
}
