//! Common test utilities
#![allow(dead_code)]

use qpack::prelude::*;

/// Packing tables exercised by every parameterized test
///
/// Both are table lookups, so they run on any host; the row-sum kernel
/// still follows the real CPU.
pub fn packing_levels() -> Vec<SimdLevel> {
    vec![SimdLevel::Avx2, SimdLevel::Avx512]
}

/// Options pinning the packing table to `level`
pub fn opts(level: SimdLevel) -> PackOptions {
    PackOptions::default().with_simd_level(level)
}

/// Deterministic u8 data covering the full byte range
pub fn pattern_u8(len: usize, seed: usize) -> Vec<u8> {
    (0..len)
        .map(|i| ((i * 131 + seed * 17 + 7) % 256) as u8)
        .collect()
}

/// Deterministic i8 data covering the full byte range
pub fn pattern_i8(len: usize, seed: usize) -> Vec<i8> {
    pattern_u8(len, seed).into_iter().map(|b| b as i8).collect()
}

/// Straightforward sum of `a[row, cols]` for every row of `block`
pub fn reference_row_sums<T: Element>(
    a: &LogicalMatrix<'_, T>,
    block: &BlockType,
    cols: std::ops::Range<usize>,
) -> Vec<i32> {
    (block.row_start..block.row_end())
        .map(|r| cols.clone().map(|c| a.get(r, c).to_i32()).sum())
        .collect()
}

/// Pack every K block of the row range starting at `row_start`, in order
///
/// Returns the row offsets after the last block.
pub fn pack_row_range<T: Element, Acc: Accumulator>(
    packer: &mut PackAWithRowOffset<'_, T, Acc>,
    row_start: usize,
) -> Vec<i32> {
    let m = packer.source().rows();
    let k = packer.source().cols();
    let row_size = packer.block_row_size().min(m - row_start);
    let kcb = packer.block_col_size();

    for col_start in (0..k).step_by(kcb) {
        let block = BlockType::new(row_start, row_size, col_start, kcb.min(k - col_start));
        packer.pack(&block);
    }
    packer.row_offset_buffer()[..row_size].to_vec()
}

/// Read the packed region back through `addr`, one Vec per row
pub fn unpack<T: Element, Acc: Accumulator>(packer: &PackAWithRowOffset<'_, T, Acc>) -> Vec<Vec<T>> {
    let rows = packer.matrix().num_packed_rows();
    let cols = packer.matrix().num_packed_cols();
    (0..rows)
        .map(|r| (0..cols).map(|c| packer.packed_buf()[packer.addr(r, c)]).collect())
        .collect()
}
