//! Packing a small activation matrix
//!
//! Packs a 4×6 u8 matrix in two ways (row-major and transposed storage),
//! prints the packed tiles and the row offsets.
//!
//! Run with:
//! ```sh
//! cargo run --example print_packed
//! ```

use qpack::prelude::*;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Pick a packing table
    // -----------------------------------------------------------------------
    let level = match PackingTraits::detect::<i32>() {
        Ok(_) => detect_simd(),
        Err(e) => {
            println!("{e}; using the AVX2 table for illustration");
            SimdLevel::Avx2
        }
    };
    let options = PackOptions::default().with_simd_level(level);
    let traits = PackingTraits::resolve::<i32>(level)?;
    println!(
        "{level}: tiles of {}x{}, row interleave {}",
        traits.mcb, traits.kcb, traits.row_interleave
    );

    // -----------------------------------------------------------------------
    // 2. Row-major source with a leading dimension wider than the matrix
    // -----------------------------------------------------------------------
    let (m, k, ld) = (4, 6, 8);
    let data: Vec<u8> = (0..m * ld).map(|i| (i % ld * 10 + i / ld) as u8).collect();
    let a = LogicalMatrix::new(MatrixOp::NoTranspose, m, k, &data, ld)?;

    let mut packer = PackAWithRowOffset::<u8, i32>::new(a, None, None, options)?;
    packer.pack(&BlockType::new(0, m, 0, k));
    packer.print_packed_matrix("A (row-major)");
    println!("row offsets: {:?}\n", &packer.row_offset_buffer()[..m]);

    // -----------------------------------------------------------------------
    // 3. The same logical matrix stored column-major
    // -----------------------------------------------------------------------
    let mut col_major = vec![0u8; m * k];
    for r in 0..m {
        for c in 0..k {
            col_major[c * m + r] = a.get(r, c);
        }
    }
    let at = LogicalMatrix::new(MatrixOp::Transpose, m, k, &col_major, m)?;

    let mut packer = PackAWithRowOffset::<u8, i32>::new(at, None, None, options)?;
    packer.pack(&BlockType::new(0, m, 0, k));
    packer.print_packed_matrix("A (transposed)");
    println!("row offsets: {:?}", &packer.row_offset_buffer()[..m]);

    Ok(())
}
