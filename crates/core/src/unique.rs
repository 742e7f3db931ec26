//! Owned front-end: unique sub-arrays along an axis
//!
//! Wraps the in-place [`dedup`](crate::dedup::dedup) contract the way an
//! array library presents it: the caller gets the unique sub-arrays in order
//! of first appearance and, on request, the first-occurrence index, the
//! inverse mapping and dense per-group counts.

use crate::dedup::{dedup_view, DedupOutputs, DedupStats};
use crate::layout::{move_axis_to_front, ArrayLayout};
use crate::parallel::dedup_view_parallel;
use crate::records::RecordView;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// What to return from [`unique`] and how to compute it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniqueOptions {
    /// Return the position of each group's first occurrence
    pub return_index: bool,
    /// Return the group rank of every input record
    pub return_inverse: bool,
    /// Return the population of every group
    pub return_counts: bool,
    /// Axis along which sub-arrays are compared
    pub axis: usize,
    /// Hash records on the rayon pool
    pub parallel: bool,
}

impl UniqueOptions {
    /// Request index, inverse and counts
    pub fn all() -> Self {
        Self {
            return_index: true,
            return_inverse: true,
            return_counts: true,
            ..Self::default()
        }
    }

    /// Compare sub-arrays along `axis`
    pub fn with_axis(mut self, axis: usize) -> Self {
        self.axis = axis;
        self
    }

    /// Enable or disable parallel hashing
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Result of [`unique`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unique {
    /// Unique sub-arrays in order of first appearance, laid out as `layout`
    pub values: Vec<u8>,
    /// Layout of `values`; the deduplicated axis has one entry per group
    pub layout: ArrayLayout,
    /// Position of each group's first occurrence
    pub index: Option<Vec<usize>>,
    /// Group rank of every input record
    pub inverse: Option<Vec<usize>>,
    /// Population of each group, by rank
    pub counts: Option<Vec<usize>>,
    /// Totals for the call
    pub stats: DedupStats,
}

impl Unique {
    /// Number of distinct sub-arrays
    pub fn len(&self) -> usize {
        self.stats.unique_records
    }

    /// Check if no sub-arrays were found
    pub fn is_empty(&self) -> bool {
        self.stats.unique_records == 0
    }
}

/// Find the unique sub-arrays of `data` along `options.axis`
///
/// Linear time; groups come out in order of first appearance rather than
/// sorted. An array with no items is rejected.
pub fn unique(data: &[u8], layout: &ArrayLayout, options: &UniqueOptions) -> Result<Unique> {
    layout.validate()?;
    if layout.num_items()? == 0 {
        return Err(Error::EmptyInput);
    }

    let (moved, front) = move_axis_to_front(data, layout, options.axis)?;
    let n = front.num_records();
    let stride = front.record_stride()?;
    let records = RecordView::new(&moved, n, stride)?;

    let mut index = vec![0usize; n];
    let mut inverse = options.return_inverse.then(|| vec![0usize; n]);
    let mut counts = options.return_counts.then(|| vec![0usize; n]);

    let outputs = DedupOutputs {
        index: Some(&mut index[..]),
        inverse: inverse.as_deref_mut(),
        counts: counts.as_deref_mut(),
    };
    let n_unique = if options.parallel {
        dedup_view_parallel(records, outputs)?
    } else {
        dedup_view(records, outputs)?
    };
    index.truncate(n_unique);

    // Sparse counts live at first-occurrence slots; reorder them by rank
    let counts = counts.map(|sparse| index.iter().map(|&p| sparse[p]).collect::<Vec<_>>());

    let gathered = gather(records, &index);
    let gathered_layout = front.with_leading(n_unique);
    let (values, layout) = if options.axis == 0 {
        (gathered, gathered_layout)
    } else {
        let (restored, layout) = move_axis_to_front(&gathered, &gathered_layout, options.axis)?;
        (restored.into_owned(), layout)
    };

    let stats = DedupStats::new(n, n_unique);
    info!(
        "Found {} unique of {} records along axis {} ({:.2}% duplicates)",
        stats.unique_records,
        stats.total_records,
        options.axis,
        stats.dedup_rate()
    );

    Ok(Unique {
        values,
        layout,
        index: options.return_index.then_some(index),
        inverse,
        counts,
        stats,
    })
}

/// [`unique`] for `data.len() / stride` flat records of `stride` bytes
///
/// `options.axis` must be 0; records have no inner structure to reorder.
pub fn unique_records(data: &[u8], stride: usize, options: &UniqueOptions) -> Result<Unique> {
    if options.axis != 0 {
        return Err(Error::InvalidLayout(format!(
            "flat records only have axis 0, got axis {}",
            options.axis
        )));
    }
    let records = RecordView::from_bytes(data, stride)?;
    unique(data, &ArrayLayout::records(records.len(), stride), options)
}

/// Concatenate the records at `positions`, in order
fn gather(records: RecordView<'_>, positions: &[usize]) -> Vec<u8> {
    let mut out = Vec::with_capacity(positions.len() * records.stride());
    for &p in positions {
        out.extend_from_slice(records.record(p));
    }
    out
}
