//! Packing of the A (activation) matrix with per-row sums
//!
//! Asymmetric requantization needs, for every row of A, the sum of its
//! quantized values ("row offset"). Computing it while packing avoids a
//! second pass over the source. Row offsets for a row range are reset by
//! the first K block (`col_start == 0`) and accumulated by every later one,
//! so K blocks must be packed in increasing column order.

use std::io::{self, Write};
use std::marker::PhantomData;

use super::block::BlockType;
use super::buffer::Storage;
use super::matrix::PackMatrix;
use super::source::{LogicalMatrix, MatrixOp};
use super::traits::PackingTraits;
use crate::dtype::{Accumulator, Element};
use crate::error::{Error, Result};
use crate::simd::{SimdLevel, detect_simd, try_detect_simd};

/// Construction options for [`PackAWithRowOffset`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PackOptions {
    /// Convolution group count; only 1 is supported
    pub groups: usize,
    /// Quantization zero-point of A; stored, not used by packing
    pub zero_point: i32,
    /// Packing table to use instead of the detected one
    ///
    /// Only selects blocking parameters: the row-sum kernel is always
    /// chosen from the CPU that is running.
    pub simd_level: Option<SimdLevel>,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            groups: 1,
            zero_point: 0,
            simd_level: None,
        }
    }
}

impl PackOptions {
    /// Set the zero-point
    pub fn with_zero_point(mut self, zero_point: i32) -> Self {
        self.zero_point = zero_point;
        self
    }

    /// Pin the packing table to `level`
    pub fn with_simd_level(mut self, level: SimdLevel) -> Self {
        self.simd_level = Some(level);
        self
    }

    /// Set the group count
    pub fn with_groups(mut self, groups: usize) -> Self {
        self.groups = groups;
        self
    }
}

/// Packs `MCB × KCB` tiles of A and keeps one running sum per tile row
///
/// A packer owns a single scratch tile and a row-offset buffer sized from
/// its [`PackingTraits`]; every [`pack`](Self::pack) call overwrites them.
/// Use one packer per thread.
///
/// # Example
///
/// ```
/// use qpack::prelude::*;
///
/// let data: Vec<u8> = (1..=16).collect();
/// let a = LogicalMatrix::new(MatrixOp::NoTranspose, 4, 4, &data, 4)?;
/// let opts = PackOptions::default().with_simd_level(SimdLevel::Avx2);
/// let mut packer = PackAWithRowOffset::<u8, i32>::new(a, None, None, opts)?;
///
/// packer.pack(&BlockType::new(0, 4, 0, 4));
/// assert_eq!(&packer.row_offset_buffer()[..4], &[10, 26, 42, 58]);
/// # Ok::<(), qpack::error::Error>(())
/// ```
#[derive(Debug)]
pub struct PackAWithRowOffset<'a, T: Element, Acc: Accumulator> {
    base: PackMatrix<'a, T>,
    source: LogicalMatrix<'a, T>,
    traits: PackingTraits,
    level: SimdLevel,
    row_offset: Storage<'a, i32>,
    _acc: PhantomData<Acc>,
}

impl<'a, T: Element, Acc: Accumulator> PackAWithRowOffset<'a, T, Acc> {
    /// Create a packer over `source`
    ///
    /// `packed_buf` and `row_offset_buf` are used when given (and never
    /// freed here); otherwise 64-byte aligned buffers are allocated and
    /// released on drop. Caller buffers must hold at least `MCB * KCB` and
    /// `MCB` elements respectively.
    pub fn new(
        source: LogicalMatrix<'a, T>,
        packed_buf: Option<&'a mut [T]>,
        row_offset_buf: Option<&'a mut [i32]>,
        options: PackOptions,
    ) -> Result<Self> {
        if options.groups != 1 {
            return Err(Error::UnsupportedGroups {
                groups: options.groups,
            });
        }

        let level = options.simd_level.unwrap_or_else(detect_simd);
        let traits = PackingTraits::resolve::<Acc>(level)?;

        let tile_len = traits.mcb * traits.kcb;
        if let Some(buf) = packed_buf.as_deref() {
            if buf.len() < tile_len {
                return Err(Error::buffer_too_small("packed", tile_len, buf.len()));
            }
        }
        if let Some(buf) = row_offset_buf.as_deref() {
            if buf.len() < traits.mcb {
                return Err(Error::buffer_too_small("row_offset", traits.mcb, buf.len()));
            }
        }

        let buf = Storage::new_or_borrowed(packed_buf, tile_len);
        let row_offset = Storage::new_or_borrowed(row_offset_buf, traits.mcb);

        log::debug!(
            "PackAWithRowOffset<{}, {}>: {} table, tile {}x{}, row interleave {}, \
             packed buffer {}, row offsets {}",
            T::DTYPE,
            Acc::DTYPE,
            level,
            traits.mcb,
            traits.kcb,
            traits.row_interleave,
            if buf.is_owned() { "owned" } else { "borrowed" },
            if row_offset.is_owned() {
                "owned"
            } else {
                "borrowed"
            },
        );

        Ok(Self {
            base: PackMatrix::new(
                source.rows(),
                source.cols(),
                traits.mcb,
                traits.kcb,
                buf,
                options.zero_point,
            ),
            source,
            traits,
            level,
            row_offset,
            _acc: PhantomData,
        })
    }

    /// Length of the row-offset buffer a caller must provide
    ///
    /// Depends only on the running CPU and the `(T, Acc)` pair. Fails if
    /// CPU features cannot be inspected or no packing table exists.
    pub fn row_offset_buffer_size() -> Result<usize> {
        let level = try_detect_simd()?;
        Ok(PackingTraits::resolve::<Acc>(level)?.mcb)
    }

    /// Pack `block` into the tile and update its row offsets
    ///
    /// # Panics
    /// If `row_start`/`col_start` are not multiples of the block extents,
    /// if `row_size`/`col_size` exceed them, or if the block reaches past
    /// the source matrix.
    pub fn pack(&mut self, block: &BlockType) {
        let brow = self.base.block_row_size();
        let bcol = self.base.block_col_size();
        assert!(
            block.row_start % brow == 0,
            "row_start {} is not a multiple of block row size {brow}",
            block.row_start
        );
        assert!(
            block.col_start % bcol == 0,
            "col_start {} is not a multiple of block col size {bcol}",
            block.col_start
        );
        assert!(
            block.row_size <= brow,
            "row_size {} exceeds block row size {brow}",
            block.row_size
        );
        assert!(
            block.col_size <= bcol,
            "col_size {} exceeds block col size {bcol}",
            block.col_size
        );
        assert!(
            block.row_end() <= self.source.rows() && block.col_end() <= self.source.cols(),
            "block {block} exceeds {}x{} source",
            self.source.rows(),
            self.source.cols()
        );

        let padded_cols = self.traits.padded_cols(block.col_size);
        assert!(padded_cols <= bcol);

        let block_p = BlockType::new(block.row_start, block.row_size, block.col_start, padded_cols);
        self.base.set_packed_block(block_p);

        // Not the first K block for these rows: keep summing
        let accumulate = block.col_start != 0;

        log::trace!(
            "pack tile ({}, {}): {block}, padded cols {padded_cols}, {}",
            block.row_start / brow,
            block.col_start / bcol,
            if accumulate { "accumulate" } else { "reset" }
        );

        let source = &self.source;
        let out = self.base.buf_mut();
        let row_offset = &mut self.row_offset[..block.row_size];

        match source.op() {
            MatrixOp::Transpose => {
                pack_transposed(source, block, padded_cols, bcol, accumulate, out, row_offset)
            }
            MatrixOp::NoTranspose => {
                pack_row_major(source, block, padded_cols, bcol, accumulate, out, row_offset)
            }
        }
    }

    /// Flat offset of logical `(r, c)` in the tile grid
    ///
    /// Tiles are laid out row-major over the grid, and elements row-major
    /// within a tile. Every consumer of the packed buffer must agree on this.
    pub fn addr(&self, r: usize, c: usize) -> usize {
        let brow = self.base.block_row_size();
        let bcol = self.base.block_col_size();
        let tile = brow * bcol;

        let block_row_id = r / brow;
        let brow_offset = block_row_id * self.base.block_cols() * tile;

        let block_col_id = c / bcol;
        let bcol_offset = block_col_id * tile;

        let inblock_offset = (r % brow) * bcol + (c % bcol);

        brow_offset + bcol_offset + inblock_offset
    }

    /// Dump the packed region to `w`
    ///
    /// Values go through i64 so narrow integers print as numbers.
    pub fn write_packed_matrix<W: Write>(&self, w: &mut W, name: &str) -> io::Result<()> {
        let rows = self.base.num_packed_rows();
        let cols = self.base.num_packed_cols();
        let out = self.base.buf();

        writeln!(w, "{name}:[{rows}, {cols}]")?;
        for r in 0..rows {
            for c in 0..cols {
                write!(w, "{:>5} ", out[self.addr(r, c)].to_i64())?;
            }
            writeln!(w)?;
        }
        writeln!(w)
    }

    /// Dump the packed region to stdout
    pub fn print_packed_matrix(&self, name: &str) {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        if let Err(e) = self.write_packed_matrix(&mut lock, name) {
            log::warn!("failed to print packed matrix '{name}': {e}");
        }
    }

    /// Row offsets of the last packed row range
    ///
    /// Holds `block_row_size()` entries; only the first `row_size` of the
    /// last block are meaningful.
    #[inline]
    pub fn row_offset_buffer(&self) -> &[i32] {
        &self.row_offset
    }

    /// Row offsets, writable (e.g. to seed accumulation)
    #[inline]
    pub fn row_offset_buffer_mut(&mut self) -> &mut [i32] {
        &mut self.row_offset
    }

    /// Returns true if the row-offset buffer is released on drop
    #[inline]
    pub fn is_row_offset_owned(&self) -> bool {
        self.row_offset.is_owned()
    }

    /// The packed tile
    #[inline]
    pub fn packed_buf(&self) -> &[T] {
        self.base.buf()
    }

    /// Tile-grid geometry and state
    #[inline]
    pub fn matrix(&self) -> &PackMatrix<'a, T> {
        &self.base
    }

    /// Block row extent (MCB)
    #[inline]
    pub fn block_row_size(&self) -> usize {
        self.base.block_row_size()
    }

    /// Block column extent (KCB)
    #[inline]
    pub fn block_col_size(&self) -> usize {
        self.base.block_col_size()
    }

    /// Column rounding granularity
    #[inline]
    pub fn row_interleave(&self) -> usize {
        self.traits.row_interleave
    }

    /// Resolved blocking parameters
    #[inline]
    pub fn traits(&self) -> &PackingTraits {
        &self.traits
    }

    /// SIMD level the blocking parameters were resolved for
    #[inline]
    pub fn simd_level(&self) -> SimdLevel {
        self.level
    }

    /// Quantization zero-point of A
    #[inline]
    pub fn zero_point(&self) -> i32 {
        self.base.zero_point()
    }

    /// The source view
    #[inline]
    pub fn source(&self) -> &LogicalMatrix<'a, T> {
        &self.source
    }
}

/// Column-major source: gather each logical row element by element
fn pack_transposed<T: Element>(
    source: &LogicalMatrix<'_, T>,
    block: &BlockType,
    padded_cols: usize,
    bcol: usize,
    accumulate: bool,
    out: &mut [T],
    row_offset: &mut [i32],
) {
    for (i, offset) in row_offset.iter_mut().enumerate() {
        let row = block.row_start + i;
        let out_row = &mut out[i * bcol..i * bcol + padded_cols];

        let mut row_sum = if accumulate { *offset } else { 0 };
        for (j, dst) in out_row[..block.col_size].iter_mut().enumerate() {
            let val = source.get(row, block.col_start + j);
            row_sum = row_sum.wrapping_add(val.to_i32());
            *dst = val;
        }
        *offset = row_sum;

        out_row[block.col_size..].fill(T::zero());
    }
}

/// Row-major source: bulk copy each row, then sum it with the SIMD kernel
fn pack_row_major<T: Element>(
    source: &LogicalMatrix<'_, T>,
    block: &BlockType,
    padded_cols: usize,
    bcol: usize,
    accumulate: bool,
    out: &mut [T],
    row_offset: &mut [i32],
) {
    for (i, offset) in row_offset.iter_mut().enumerate() {
        let src = source.row_slice(block.row_start + i, block.col_start, block.col_size);
        let out_row = &mut out[i * bcol..i * bcol + padded_cols];

        out_row[..block.col_size].copy_from_slice(src);
        out_row[block.col_size..].fill(T::zero());

        let base = if accumulate { *offset } else { 0 };
        *offset = base.wrapping_add(T::row_sum(src));
    }
}
