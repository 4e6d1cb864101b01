//! Blocked tile-grid bookkeeping shared by packed matrices

use super::block::BlockType;
use super::buffer::Storage;
use crate::dtype::Element;

/// A packed matrix viewed as a grid of `brow × bcol` tiles
///
/// Holds the tile geometry, the destination storage, and the block that
/// was packed last. The storage holds a single tile and is overwritten by
/// every packing call.
#[derive(Debug)]
pub struct PackMatrix<'a, T> {
    nrows: usize,
    ncols: usize,
    brow: usize,
    bcol: usize,
    buf: Storage<'a, T>,
    zero_pt: i32,
    packed_block: BlockType,
}

impl<'a, T: Element> PackMatrix<'a, T> {
    /// Create the grid over `buf`, which must hold at least `brow * bcol`
    /// elements
    pub(crate) fn new(
        nrows: usize,
        ncols: usize,
        brow: usize,
        bcol: usize,
        buf: Storage<'a, T>,
        zero_pt: i32,
    ) -> Self {
        debug_assert!(buf.len() >= brow * bcol);
        Self {
            nrows,
            ncols,
            brow,
            bcol,
            buf,
            zero_pt,
            packed_block: BlockType::default(),
        }
    }

    /// Rows of the logical matrix
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.nrows
    }

    /// Columns of the logical matrix
    #[inline]
    pub fn num_cols(&self) -> usize {
        self.ncols
    }

    /// Block row extent
    #[inline]
    pub fn block_row_size(&self) -> usize {
        self.brow
    }

    /// Block column extent
    #[inline]
    pub fn block_col_size(&self) -> usize {
        self.bcol
    }

    /// Number of tile rows covering the packed region
    #[inline]
    pub fn block_rows(&self) -> usize {
        self.num_packed_rows().div_ceil(self.brow)
    }

    /// Number of tile columns covering the packed region
    #[inline]
    pub fn block_cols(&self) -> usize {
        self.num_packed_cols().div_ceil(self.bcol)
    }

    /// Record the block that is about to be written
    #[inline]
    pub(crate) fn set_packed_block(&mut self, block: BlockType) {
        self.packed_block = block;
    }

    /// The block written by the last packing call (columns padded)
    #[inline]
    pub fn packed_block(&self) -> BlockType {
        self.packed_block
    }

    /// Rows of the packed region
    #[inline]
    pub fn num_packed_rows(&self) -> usize {
        self.packed_block.row_size
    }

    /// Columns of the packed region, including padding
    #[inline]
    pub fn num_packed_cols(&self) -> usize {
        self.packed_block.col_size
    }

    /// Elements the tile storage must hold
    #[inline]
    pub fn packed_buffer_size(&self) -> usize {
        self.brow * self.bcol
    }

    /// Returns true if `block_id` is the last K block of the logical matrix
    #[inline]
    pub fn is_this_last_k_block(&self, block_id: usize) -> bool {
        (self.ncols.div_ceil(self.bcol)).saturating_sub(1) == block_id
    }

    /// Quantization zero-point, carried for requantization consumers
    #[inline]
    pub fn zero_point(&self) -> i32 {
        self.zero_pt
    }

    /// Returns true if the tile storage is released when the packer drops
    #[inline]
    pub fn is_buffer_owned(&self) -> bool {
        self.buf.is_owned()
    }

    /// The tile storage
    #[inline]
    pub fn buf(&self) -> &[T] {
        &self.buf
    }

    /// The tile storage, writable
    #[inline]
    pub(crate) fn buf_mut(&mut self) -> &mut [T] {
        &mut self.buf
    }
}
