//! Integration tests for PackAWithRowOffset
//!
//! Packing tables are pinned with `PackOptions::with_simd_level` so these
//! run on any host.

mod common;

use common::{
    opts, pack_row_range, packing_levels, pattern_i8, pattern_u8, reference_row_sums, unpack,
};
use qpack::prelude::*;

// ============================================================================
// Worked examples
// ============================================================================

#[test]
fn test_4x4_row_major_example() {
    let data: Vec<u8> = (1..=16).collect();
    let a = LogicalMatrix::new(MatrixOp::NoTranspose, 4, 4, &data, 4).unwrap();

    for level in packing_levels() {
        let mut packer = PackAWithRowOffset::<u8, i32>::new(a, None, None, opts(level)).unwrap();
        packer.pack(&BlockType::new(0, 4, 0, 4));

        assert_eq!(&packer.row_offset_buffer()[..4], &[10, 26, 42, 58], "{level}");

        let packed: Vec<u8> = unpack(&packer).into_iter().flatten().collect();
        assert_eq!(packed, data, "{level}: packed tile equals source");
    }
}

#[test]
fn test_padding_column_is_zero() {
    // Column 3 holds data in the source but lies outside the block
    let data = vec![9u8; 4 * 8];
    let a = LogicalMatrix::new(MatrixOp::NoTranspose, 4, 8, &data, 8).unwrap();
    let mut packer =
        PackAWithRowOffset::<u8, i32>::new(a, None, None, opts(SimdLevel::Avx2)).unwrap();
    assert_eq!(packer.row_interleave(), 4);

    packer.pack(&BlockType::new(0, 4, 0, 3));

    assert_eq!(packer.matrix().num_packed_cols(), 4);
    for row in unpack(&packer) {
        assert_eq!(row, [9, 9, 9, 0]);
    }
    assert_eq!(&packer.row_offset_buffer()[..4], &[27; 4]);
}

// ============================================================================
// Padding
// ============================================================================

#[test]
fn test_padding_overwrites_stale_tile() {
    let (m, k) = (8, 64);
    let data = vec![0xffu8; m * k];
    let a = LogicalMatrix::new(MatrixOp::NoTranspose, m, k, &data, k).unwrap();

    for level in packing_levels() {
        let mut packer = PackAWithRowOffset::<u8, i32>::new(a, None, None, opts(level)).unwrap();
        let ri = packer.row_interleave();

        for col_size in 1..=k {
            // Dirty the whole row first so padding must be written, not inherited
            packer.pack(&BlockType::new(0, m, 0, k));
            packer.pack(&BlockType::new(0, m, 0, col_size));

            let padded = col_size.div_ceil(ri) * ri;
            assert_eq!(packer.matrix().num_packed_cols(), padded);
            for (r, row) in unpack(&packer).iter().enumerate() {
                assert!(
                    row[col_size..].iter().all(|&v| v == 0),
                    "{level}: row {r}, col_size {col_size}: padding not zero"
                );
                assert!(row[..col_size].iter().all(|&v| v == 0xff));
            }
        }
    }
}

#[test]
fn test_padding_does_not_touch_sums_with_zero_point() {
    let data = pattern_u8(6 * 10, 3);
    let a = LogicalMatrix::new(MatrixOp::NoTranspose, 6, 10, &data, 10).unwrap();
    let options = opts(SimdLevel::Avx2).with_zero_point(128);
    let mut packer = PackAWithRowOffset::<u8, i32>::new(a, None, None, options).unwrap();
    assert_eq!(packer.zero_point(), 128);

    let block = BlockType::new(0, 6, 0, 10);
    packer.pack(&block);

    assert_eq!(
        &packer.row_offset_buffer()[..6],
        reference_row_sums(&a, &block, 0..10).as_slice()
    );
    for row in unpack(&packer) {
        assert_eq!(&row[10..], &[0, 0]);
    }
}

// ============================================================================
// Row sums
// ============================================================================

#[test]
fn test_row_sums_with_and_without_vector_tail() {
    let (m, k) = (5, 200);
    let data = pattern_u8(m * k, 11);
    let a = LogicalMatrix::new(MatrixOp::NoTranspose, m, k, &data, k).unwrap();
    let mut packer =
        PackAWithRowOffset::<u8, i32>::new(a, None, None, opts(SimdLevel::Avx2)).unwrap();

    // 32/64/128/192: vector loop only; others add a scalar tail
    for col_size in [1, 31, 32, 33, 64, 95, 128, 150, 192, 200] {
        let block = BlockType::new(0, m, 0, col_size);
        packer.pack(&block);
        assert_eq!(
            &packer.row_offset_buffer()[..m],
            reference_row_sums(&a, &block, 0..col_size).as_slice(),
            "col_size {col_size}"
        );
    }
}

#[test]
fn test_transposed_matches_row_major() {
    let (m, k) = (7, 45);
    let row_major = pattern_u8(m * k, 5);
    let mut col_major = vec![0u8; m * k];
    for r in 0..m {
        for c in 0..k {
            col_major[c * m + r] = row_major[r * k + c];
        }
    }

    let a = LogicalMatrix::new(MatrixOp::NoTranspose, m, k, &row_major, k).unwrap();
    let at = LogicalMatrix::new(MatrixOp::Transpose, m, k, &col_major, m).unwrap();

    for level in packing_levels() {
        let mut p = PackAWithRowOffset::<u8, i32>::new(a, None, None, opts(level)).unwrap();
        let mut pt = PackAWithRowOffset::<u8, i32>::new(at, None, None, opts(level)).unwrap();

        let block = BlockType::new(0, m, 0, k);
        p.pack(&block);
        pt.pack(&block);

        assert_eq!(unpack(&p), unpack(&pt), "{level}");
        assert_eq!(&p.row_offset_buffer()[..m], &pt.row_offset_buffer()[..m]);
        assert_eq!(
            &pt.row_offset_buffer()[..m],
            reference_row_sums(&at, &block, 0..k).as_slice()
        );
    }
}

#[test]
fn test_i8_row_sums() {
    let (m, k) = (4, 100);
    let data = pattern_i8(m * k, 2);
    for op in [MatrixOp::NoTranspose, MatrixOp::Transpose] {
        let ld = if op == MatrixOp::NoTranspose { k } else { m };
        let a = LogicalMatrix::new(op, m, k, &data, ld).unwrap();
        let mut packer =
            PackAWithRowOffset::<i8, i32>::new(a, None, None, opts(SimdLevel::Avx2)).unwrap();

        let block = BlockType::new(0, m, 0, k);
        packer.pack(&block);
        assert_eq!(
            &packer.row_offset_buffer()[..m],
            reference_row_sums(&a, &block, 0..k).as_slice(),
            "{op:?}"
        );
    }
}

// ============================================================================
// Accumulation across K blocks
// ============================================================================

#[test]
fn test_two_k_blocks_equal_one() {
    // AVX-512/i32 splits 300 columns at 256; AVX2/i32 packs them in one call
    let (m, k) = (40, 300);
    let data = pattern_u8(m * k, 9);
    let a = LogicalMatrix::new(MatrixOp::NoTranspose, m, k, &data, k).unwrap();

    let mut split =
        PackAWithRowOffset::<u8, i32>::new(a, None, None, opts(SimdLevel::Avx512)).unwrap();
    let mut whole =
        PackAWithRowOffset::<u8, i32>::new(a, None, None, opts(SimdLevel::Avx2)).unwrap();
    assert_eq!(split.block_col_size(), 256);
    assert_eq!(whole.block_col_size(), 512);

    split.pack(&BlockType::new(0, m, 0, 256));
    split.pack(&BlockType::new(0, m, 256, 44));
    whole.pack(&BlockType::new(0, m, 0, k));

    assert_eq!(&split.row_offset_buffer()[..m], &whole.row_offset_buffer()[..m]);
    assert_eq!(
        &whole.row_offset_buffer()[..m],
        reference_row_sums(&a, &BlockType::new(0, m, 0, k), 0..k).as_slice()
    );
}

#[test]
fn test_accumulate_over_many_k_blocks_transposed() {
    let (m, k) = (3, 1100);
    let data = pattern_u8(m * k, 4);
    let at = LogicalMatrix::new(MatrixOp::Transpose, m, k, &data, m).unwrap();
    let mut packer =
        PackAWithRowOffset::<u8, i16>::new(at, None, None, opts(SimdLevel::Avx2)).unwrap();
    assert_eq!(packer.block_col_size(), 256);

    let sums = pack_row_range(&mut packer, 0);
    assert_eq!(sums, reference_row_sums(&at, &BlockType::new(0, m, 0, k), 0..k));
}

#[test]
fn test_new_row_range_resets_sums() {
    let (m, k) = (130, 20);
    let data = pattern_u8(m * k, 1);
    let a = LogicalMatrix::new(MatrixOp::NoTranspose, m, k, &data, k).unwrap();
    let mut packer =
        PackAWithRowOffset::<u8, i32>::new(a, None, None, opts(SimdLevel::Avx2)).unwrap();
    assert_eq!(packer.block_row_size(), 120);

    let first = pack_row_range(&mut packer, 0);
    assert_eq!(first.len(), 120);
    let second = pack_row_range(&mut packer, 120);
    assert_eq!(second.len(), 10);
    assert_eq!(
        second,
        reference_row_sums(&a, &BlockType::new(120, 10, 0, k), 0..k)
    );
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_full_tile_is_dense_copy() {
    for level in packing_levels() {
        let t = PackingTraits::resolve::<i32>(level).unwrap();
        let (m, k) = (t.mcb, t.kcb);
        let data = pattern_u8(m * k, 6);
        let a = LogicalMatrix::new(MatrixOp::NoTranspose, m, k, &data, k).unwrap();
        let mut packer = PackAWithRowOffset::<u8, i32>::new(a, None, None, opts(level)).unwrap();

        packer.pack(&BlockType::new(0, m, 0, k));

        assert_eq!(&packer.packed_buf()[..m * k], data.as_slice(), "{level}");
    }
}

#[test]
fn test_addr_reads_back_source() {
    let (m, k, ld) = (50, 700, 710);
    let data = pattern_u8((m - 1) * ld + k, 8);
    let a = LogicalMatrix::new(MatrixOp::NoTranspose, m, k, &data, ld).unwrap();
    let mut packer =
        PackAWithRowOffset::<u8, i32>::new(a, None, None, opts(SimdLevel::Avx2)).unwrap();

    // Second K block: columns 512..700
    let block = BlockType::new(0, m, 512, 188);
    packer.pack(&block);

    let padded = packer.matrix().num_packed_cols();
    assert_eq!(padded, 188);
    for r in 0..m {
        for c in 0..padded {
            let expected = if c < block.col_size {
                a.get(r, block.col_start + c)
            } else {
                0
            };
            assert_eq!(packer.packed_buf()[packer.addr(r, c)], expected, "({r}, {c})");
        }
    }
}

#[test]
fn test_addr_matches_row_major_tile() {
    let data = vec![1u8; 4 * 4];
    let a = LogicalMatrix::new(MatrixOp::NoTranspose, 4, 4, &data, 4).unwrap();
    let mut packer =
        PackAWithRowOffset::<u8, i32>::new(a, None, None, opts(SimdLevel::Avx512)).unwrap();
    packer.pack(&BlockType::new(0, 4, 0, 4));

    let bcol = packer.block_col_size();
    for r in 0..4 {
        for c in 0..4 {
            assert_eq!(packer.addr(r, c), r * bcol + c);
        }
    }
}

// ============================================================================
// Buffers
// ============================================================================

#[test]
fn test_caller_buffers_survive_packer() {
    let data: Vec<u8> = (1..=16).collect();
    let a = LogicalMatrix::new(MatrixOp::NoTranspose, 4, 4, &data, 4).unwrap();
    let t = PackingTraits::resolve::<i32>(SimdLevel::Avx2).unwrap();

    let mut packed = vec![0xaau8; t.mcb * t.kcb];
    let mut offsets = vec![-1i32; t.mcb];
    {
        let mut packer = PackAWithRowOffset::<u8, i32>::new(
            a,
            Some(&mut packed[..]),
            Some(&mut offsets[..]),
            opts(SimdLevel::Avx2),
        )
        .unwrap();
        assert!(!packer.matrix().is_buffer_owned());
        assert!(!packer.is_row_offset_owned());
        packer.pack(&BlockType::new(0, 4, 0, 4));
    }

    assert_eq!(&packed[..4], &[1, 2, 3, 4]);
    assert_eq!(&packed[t.kcb..t.kcb + 4], &[5, 6, 7, 8]);
    // Untouched beyond the padded width
    assert_eq!(packed[4], 0xaa);
    assert_eq!(&offsets[..5], &[10, 26, 42, 58, -1]);
}

#[test]
fn test_row_offset_buffer_size_query() {
    match PackAWithRowOffset::<u8, i32>::row_offset_buffer_size() {
        Ok(size) => {
            let t = PackingTraits::detect::<i32>().unwrap();
            assert_eq!(size, t.mcb);
        }
        Err(e) => assert!(matches!(
            e,
            Error::UnsupportedArchitecture { .. } | Error::CpuInfoUnavailable
        )),
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn test_dump_format() {
    let data: Vec<u8> = vec![0, 255, 7, 100];
    let a = LogicalMatrix::new(MatrixOp::NoTranspose, 2, 2, &data, 2).unwrap();
    let mut packer =
        PackAWithRowOffset::<u8, i16>::new(a, None, None, opts(SimdLevel::Avx2)).unwrap();
    packer.pack(&BlockType::new(0, 2, 0, 2));

    let mut out = Vec::new();
    packer.write_packed_matrix(&mut out, "A_u8").unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "A_u8:[2, 2]\n    0   255 \n    7   100 \n\n"
    );
}

#[test]
fn test_dump_signed_values() {
    let data: Vec<i8> = vec![-128, 127, -1];
    let a = LogicalMatrix::new(MatrixOp::NoTranspose, 1, 3, &data, 3).unwrap();
    let mut packer =
        PackAWithRowOffset::<i8, i32>::new(a, None, None, opts(SimdLevel::Avx2)).unwrap();
    packer.pack(&BlockType::new(0, 1, 0, 3));

    let mut out = Vec::new();
    packer.write_packed_matrix(&mut out, "s").unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "s:[1, 4]\n -128   127    -1     0 \n\n"
    );
}
