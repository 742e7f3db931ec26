//! Layout of C-contiguous N-dimensional arrays and axis reordering
//!
//! Deduplication always runs along the leading axis. To deduplicate along
//! another axis the array is rewritten with that axis swapped to the front,
//! and the unique result is swapped back afterwards.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Shape and element size of a C-contiguous array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayLayout {
    /// Length of each dimension, outermost first
    pub shape: Vec<usize>,
    /// Bytes per array item
    pub item_size: usize,
}

impl ArrayLayout {
    /// Create a layout, checking it describes an addressable buffer
    pub fn new(shape: Vec<usize>, item_size: usize) -> Result<Self> {
        let layout = Self { shape, item_size };
        layout.validate()?;
        Ok(layout)
    }

    /// Layout of `n` flat records of `stride` bytes
    pub fn records(n: usize, stride: usize) -> Self {
        Self {
            shape: vec![n, stride],
            item_size: 1,
        }
    }

    /// Check dimensionality, item size and byte length
    pub fn validate(&self) -> Result<()> {
        if self.shape.is_empty() {
            return Err(Error::InvalidLayout(
                "array must have at least one dimension".to_string(),
            ));
        }
        if self.item_size == 0 {
            return Err(Error::InvalidLayout("item size must be non-zero".to_string()));
        }
        self.byte_len()?;
        Ok(())
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of items
    pub fn num_items(&self) -> Result<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| {
                Error::InvalidLayout(format!("shape {:?} overflows the address space", self.shape))
            })
    }

    /// Total size in bytes
    pub fn byte_len(&self) -> Result<usize> {
        self.num_items()?
            .checked_mul(self.item_size)
            .ok_or_else(|| {
                Error::InvalidLayout(format!(
                    "shape {:?} of {}-byte items overflows the address space",
                    self.shape, self.item_size
                ))
            })
    }

    /// Number of records along the leading axis
    pub fn num_records(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    /// Bytes per record along the leading axis
    pub fn record_stride(&self) -> Result<usize> {
        let inner = self.shape.iter().skip(1).try_fold(1usize, |acc, &d| acc.checked_mul(d));
        inner
            .and_then(|items| items.checked_mul(self.item_size))
            .ok_or_else(|| {
                Error::InvalidLayout(format!("record size of shape {:?} overflows", self.shape))
            })
    }

    /// The same layout with the leading axis resized to `len`
    pub fn with_leading(&self, len: usize) -> Self {
        let mut shape = self.shape.clone();
        if let Some(first) = shape.first_mut() {
            *first = len;
        }
        Self {
            shape,
            item_size: self.item_size,
        }
    }

    /// The layout after swapping `axis` with axis 0
    pub fn swap_to_front(&self, axis: usize) -> Result<Self> {
        self.check_axis(axis)?;
        let mut shape = self.shape.clone();
        shape.swap(0, axis);
        Ok(Self {
            shape,
            item_size: self.item_size,
        })
    }

    fn check_axis(&self, axis: usize) -> Result<()> {
        if axis >= self.ndim() {
            return Err(Error::InvalidLayout(format!(
                "axis {} is out of bounds for an array of dimension {}",
                axis,
                self.ndim()
            )));
        }
        Ok(())
    }
}

/// Rewrite `data` so that `axis` becomes the leading axis
///
/// Returns the reordered bytes and their layout. Axis 0 borrows the input.
/// Swapping is its own inverse: applying this again with the returned
/// layout and the same axis restores the original order.
pub fn move_axis_to_front<'a>(
    data: &'a [u8],
    layout: &ArrayLayout,
    axis: usize,
) -> Result<(Cow<'a, [u8]>, ArrayLayout)> {
    layout.validate()?;
    let swapped = layout.swap_to_front(axis)?;
    let byte_len = layout.byte_len()?;
    if data.len() < byte_len {
        return Err(Error::DataTooSmall {
            required: byte_len,
            actual: data.len(),
        });
    }
    let data = &data[..byte_len];

    if axis == 0 {
        return Ok((Cow::Borrowed(data), swapped));
    }

    // View the array as [outer, middle, target, block] where `block` is the
    // contiguous run of bytes behind the target axis.
    let shape = &layout.shape;
    let outer = shape[0];
    let middle: usize = shape[1..axis].iter().product();
    let target = shape[axis];
    let block: usize = shape[axis + 1..].iter().product::<usize>() * layout.item_size;

    let mut out = Vec::with_capacity(byte_len);
    if block > 0 {
        for t in 0..target {
            for m in 0..middle {
                for o in 0..outer {
                    let start = ((o * middle + m) * target + t) * block;
                    out.extend_from_slice(&data[start..start + block]);
                }
            }
        }
    }

    Ok((Cow::Owned(out), swapped))
}
