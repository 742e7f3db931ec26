//! Core deduplication logic for fixed-width binary records
//!
//! This crate finds the distinct records of a contiguous buffer in a single
//! linear scan, keeping groups in order of first appearance. It provides the
//! in-place [`dedup`] contract over caller-owned buffers, a parallel variant
//! with identical output, and an owned [`unique`] front-end for
//! N-dimensional arrays.

pub mod error;
pub mod hash;
pub mod records;
pub mod identity_index;
pub mod dedup;
pub mod parallel;
pub mod layout;
pub mod unique;
pub mod memory;

pub use dedup::{dedup, dedup_view, DedupOutputs, DedupStats};
pub use error::{Error, Result};
pub use identity_index::IdentityIndex;
pub use layout::{move_axis_to_front, ArrayLayout};
pub use parallel::{dedup_parallel, dedup_view_parallel};
pub use records::RecordView;
pub use unique::{unique, unique_records, Unique, UniqueOptions};
