//! Rectangular block requests

use std::fmt;

/// A rectangular region of the logical matrix packed by one `pack` call
///
/// `row_start`/`col_start` must be multiples of the packer's block extents
/// and the sizes must not exceed them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockType {
    /// First logical row of the block
    pub row_start: usize,
    /// Number of rows in the block
    pub row_size: usize,
    /// First logical column of the block
    pub col_start: usize,
    /// Number of real (unpadded) columns in the block
    pub col_size: usize,
}

impl BlockType {
    /// Create a block request
    #[inline]
    pub const fn new(row_start: usize, row_size: usize, col_start: usize, col_size: usize) -> Self {
        Self {
            row_start,
            row_size,
            col_start,
            col_size,
        }
    }

    /// One past the last row
    #[inline]
    pub const fn row_end(&self) -> usize {
        self.row_start + self.row_size
    }

    /// One past the last real column
    #[inline]
    pub const fn col_end(&self) -> usize {
        self.col_start + self.col_size
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows [{}, {}) cols [{}, {})",
            self.row_start,
            self.row_end(),
            self.col_start,
            self.col_end()
        )
    }
}
