//! Borrowed views over contiguous fixed-width records

use crate::{Error, Result};

/// A validated view of `n` records of `stride` bytes each
///
/// Construction checks the buffer once, so `record` can slice without
/// further bounds reasoning on the hot path.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    data: &'a [u8],
    n: usize,
    stride: usize,
}

impl<'a> RecordView<'a> {
    /// Create a view of `n` records of `stride` bytes at the start of `data`
    ///
    /// Bytes past `n * stride` are ignored.
    pub fn new(data: &'a [u8], n: usize, stride: usize) -> Result<Self> {
        let required = n
            .checked_mul(stride)
            .ok_or(Error::SizeOverflow { n, stride })?;

        if data.len() < required {
            return Err(Error::DataTooSmall {
                required,
                actual: data.len(),
            });
        }

        Ok(Self {
            data: &data[..required],
            n,
            stride,
        })
    }

    /// Create a view that covers the whole buffer
    ///
    /// The buffer length must be a multiple of `stride`. A zero stride has no
    /// way to infer a record count and is rejected.
    pub fn from_bytes(data: &'a [u8], stride: usize) -> Result<Self> {
        if stride == 0 {
            return Err(Error::InvalidLayout(
                "cannot infer record count with a zero stride".to_string(),
            ));
        }
        if data.len() % stride != 0 {
            return Err(Error::InvalidLayout(format!(
                "buffer of {} bytes is not a whole number of {}-byte records",
                data.len(),
                stride
            )));
        }
        Self::new(data, data.len() / stride, stride)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.n
    }

    /// Check if the view holds no records
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Byte width of one record
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The bytes covered by the view (exactly `len() * stride()` bytes)
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// The span of record `position`
    ///
    /// # Panics
    ///
    /// Panics if `position >= len()`.
    #[inline]
    pub fn record(&self, position: usize) -> &'a [u8] {
        assert!(position < self.n, "record {} out of range ({})", position, self.n);
        let start = position * self.stride;
        &self.data[start..start + self.stride]
    }

    /// Iterate over records in position order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &'a [u8]> + '_ {
        let data = self.data;
        let stride = self.stride;
        (0..self.n).map(move |i| &data[i * stride..(i + 1) * stride])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_slice_in_order() {
        let data = b"aabbcc";
        let view = RecordView::new(data, 3, 2).unwrap();
        assert_eq!(view.len(), 3);
        assert_eq!(view.record(0), b"aa");
        assert_eq!(view.record(2), b"cc");
        let all: Vec<&[u8]> = view.iter().collect();
        assert_eq!(all, vec![&b"aa"[..], &b"bb"[..], &b"cc"[..]]);
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let view = RecordView::new(b"aabbX", 2, 2).unwrap();
        assert_eq!(view.as_bytes(), b"aabb");
    }

    #[test]
    fn test_short_buffer_rejected() {
        let err = RecordView::new(b"aab", 2, 2).unwrap_err();
        assert_eq!(
            err,
            Error::DataTooSmall {
                required: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_overflow_rejected() {
        let err = RecordView::new(&[], usize::MAX, 2).unwrap_err();
        assert!(matches!(err, Error::SizeOverflow { .. }));
    }

    #[test]
    fn test_zero_stride_view() {
        let view = RecordView::new(&[], 4, 0).unwrap();
        assert_eq!(view.len(), 4);
        assert!(view.record(3).is_empty());
    }

    #[test]
    fn test_from_bytes() {
        let view = RecordView::from_bytes(b"abcdef", 3).unwrap();
        assert_eq!(view.len(), 2);
        assert!(RecordView::from_bytes(b"abcde", 3).is_err());
        assert!(RecordView::from_bytes(b"abc", 0).is_err());
    }

    #[test]
    #[should_panic]
    fn test_record_out_of_range() {
        let view = RecordView::new(b"aabb", 2, 2).unwrap();
        view.record(2);
    }
}
