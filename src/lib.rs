//! # qpack
//!
//! **Activation-matrix packing for quantized (u8/i8) integer GEMM.**
//!
//! Low-precision GEMM kernels consume A in cache-sized tiles whose rows are
//! padded to the kernel's K interleave. For asymmetric quantization they
//! also need the sum of every row of A to cancel the zero-point of B.
//! qpack produces both in one pass:
//!
//! - tiles of `MCB × KCB` elements, blocking chosen from the CPU's widest
//!   supported instruction set (AVX-512 or AVX2)
//! - per-row i32 sums, accumulated across the K blocks of a row
//! - row-major or transposed sources with an arbitrary leading dimension
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use qpack::prelude::*;
//!
//! let a = LogicalMatrix::new(MatrixOp::NoTranspose, m, k, &data, k)?;
//! let mut packer = PackAWithRowOffset::<u8, i32>::new(a, None, None, PackOptions::default())?;
//!
//! let (mcb, kcb) = (packer.block_row_size(), packer.block_col_size());
//! for row_start in (0..m).step_by(mcb) {
//!     for col_start in (0..k).step_by(kcb) {
//!         let block = BlockType::new(row_start, mcb.min(m - row_start), col_start, kcb.min(k - col_start));
//!         packer.pack(&block);
//!         // hand packer.packed_buf() to the microkernel
//!     }
//!     // packer.row_offset_buffer() now holds full row sums
//! }
//! ```
//!
//! ## Errors
//!
//! Construction problems (unsupported CPU, group count, undersized caller
//! buffers) are reported as [`error::Error`]. A malformed `pack` request is
//! a caller bug and panics.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dtype;
pub mod error;
pub mod pack;
pub mod simd;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::{Accumulator, DType, Element};
    pub use crate::error::{Error, Result};
    pub use crate::pack::{
        BlockType, LogicalMatrix, MatrixOp, PackAWithRowOffset, PackOptions, PackingTraits,
    };
    pub use crate::simd::{SimdLevel, detect_simd};
}
