//! Content-addressed index from record bytes to first-occurrence position
//!
//! The table stores plain positions into the borrowed record buffer. On a
//! hash match the stored position is turned back into its span and compared
//! byte for byte, so two records are only ever considered equal when their
//! full contents are.

use crate::hash::RecordHasher;
use crate::records::RecordView;
use crate::{Error, Result};
use hashbrown::HashTable;
use std::mem::size_of;
use tracing::debug;

/// Hash table of first-occurrence positions, keyed by record content
pub struct IdentityIndex<'a> {
    records: RecordView<'a>,
    table: HashTable<usize>,
    hasher: RecordHasher,
}

impl<'a> IdentityIndex<'a> {
    /// Create an empty index over `records` with a freshly seeded hasher
    pub fn new(records: RecordView<'a>) -> Self {
        Self::with_hasher(records, RecordHasher::new())
    }

    /// Create an empty index that hashes with `hasher`
    pub fn with_hasher(records: RecordView<'a>, hasher: RecordHasher) -> Self {
        Self {
            records,
            table: HashTable::new(),
            hasher,
        }
    }

    /// The hasher used for spans in this index
    pub fn hasher(&self) -> &RecordHasher {
        &self.hasher
    }

    /// Reserve room for at least `additional` more entries
    ///
    /// Once this succeeds, that many inserts are guaranteed not to allocate.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        let records = self.records;
        let hasher = &self.hasher;
        self.table
            .try_reserve(additional, |&pos| hasher.hash_span(records.record(pos)))
            .map_err(|e| {
                Error::AllocationFailed(format!("reserving {} entries: {:?}", additional, e))
            })?;
        debug!(
            "Reserved identity index for {} entries (capacity {})",
            additional,
            self.table.capacity()
        );
        Ok(())
    }

    /// Find the first-occurrence position of a byte-identical span
    pub fn lookup(&self, span: &[u8]) -> Option<usize> {
        self.lookup_hashed(self.hasher.hash_span(span), span)
    }

    /// Same as [`lookup`](Self::lookup) with a hash computed by [`hasher`](Self::hasher)
    #[inline]
    pub fn lookup_hashed(&self, hash: u64, span: &[u8]) -> Option<usize> {
        let records = self.records;
        self.table
            .find(hash, |&pos| records.record(pos) == span)
            .copied()
    }

    /// Register `position` as the first occurrence of `span`
    ///
    /// The caller must have seen [`lookup`](Self::lookup) return `None` for
    /// this span; the index does not check for an existing entry.
    pub fn insert(&mut self, span: &[u8], position: usize) {
        let hash = self.hasher.hash_span(span);
        self.insert_hashed(hash, position);
    }

    /// Same as [`insert`](Self::insert) with a hash computed by [`hasher`](Self::hasher)
    #[inline]
    pub fn insert_hashed(&mut self, hash: u64, position: usize) {
        debug_assert!(position < self.records.len());
        let records = self.records;
        let hasher = &self.hasher;
        self.table
            .insert_unique(hash, position, |&pos| hasher.hash_span(records.record(pos)));
    }

    /// Number of distinct records registered
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Get memory usage estimate in bytes
    pub fn memory_usage(&self) -> usize {
        // One usize slot plus one control byte per bucket
        size_of::<Self>() + self.table.capacity() * (size_of::<usize>() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_after_insert() {
        let data = b"AAAABBBBAAAA";
        let records = RecordView::new(data, 3, 4).unwrap();
        let mut index = IdentityIndex::new(records);

        assert_eq!(index.lookup(records.record(0)), None);
        index.insert(records.record(0), 0);
        assert_eq!(index.lookup(records.record(0)), Some(0));

        assert_eq!(index.lookup(records.record(1)), None);
        index.insert(records.record(1), 1);

        // Position 2 has the same bytes as position 0
        assert_eq!(index.lookup(records.record(2)), Some(0));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_lookup_foreign_span() {
        let records = RecordView::new(b"abcdwxyz", 2, 4).unwrap();
        let mut index = IdentityIndex::new(records);
        index.insert(records.record(1), 1);

        // A span from another buffer matches by content, not address
        let other = b"wxyz".to_vec();
        assert_eq!(index.lookup(&other), Some(1));
        assert_eq!(index.lookup(b"wxyZ"), None);
    }

    #[test]
    fn test_full_comparison_on_colliding_hashes() {
        let records = RecordView::new(b"aaaabbbb", 2, 4).unwrap();
        let mut index = IdentityIndex::new(records);
        // No rehash may happen, or entries would move to their real hashes
        index.try_reserve(2).unwrap();

        // Force both records into the same hash bucket
        index.insert_hashed(7, 0);
        assert_eq!(index.lookup_hashed(7, records.record(1)), None);
        index.insert_hashed(7, 1);
        assert_eq!(index.lookup_hashed(7, records.record(0)), Some(0));
        assert_eq!(index.lookup_hashed(7, records.record(1)), Some(1));
    }

    #[test]
    fn test_reserve_then_insert() {
        let data: Vec<u8> = (0..100u8).collect();
        let records = RecordView::new(&data, 100, 1).unwrap();
        let mut index = IdentityIndex::new(records);
        index.try_reserve(100).unwrap();
        let capacity = index.table.capacity();

        for (i, span) in records.iter().enumerate() {
            index.insert(span, i);
        }
        assert_eq!(index.len(), 100);
        assert_eq!(index.table.capacity(), capacity);
    }

    #[test]
    fn test_reserve_overflow_reported() {
        let records = RecordView::new(&[], 0, 4).unwrap();
        let mut index = IdentityIndex::new(records);
        let err = index.try_reserve(usize::MAX).unwrap_err();
        assert!(matches!(err, Error::AllocationFailed(_)));
    }

    #[test]
    fn test_memory_usage() {
        let records = RecordView::new(&[0u8; 1000], 1000, 1).unwrap();
        let mut index = IdentityIndex::new(records);
        let empty = index.memory_usage();
        index.try_reserve(1000).unwrap();
        assert!(index.memory_usage() > empty);
        assert!(index.memory_usage() < 1_000_000);
    }
}
