//! Blocking parameters for quantized GEMM packing
//!
//! A packed A tile is `MCB × KCB` (block row extent × block column extent).
//! Each tile's effective width is rounded up to a multiple of
//! `ROW_INTERLEAVE`, the number of consecutive K values the microkernel
//! multiplies in one instruction (4 for u8×i8→i32 dot products, 2 for the
//! i16-accumulating variant).
//!
//! | ISA     | accT | MR | NR  | ROW_INTERLEAVE | MCB | NCB | KCB |
//! |---------|------|----|-----|----------------|-----|-----|-----|
//! | AVX2    | i32  | 12 | 8   | 4              | 120 | 8   | 512 |
//! | AVX2    | i16  | 3  | 16  | 2              | 60  | 16  | 256 |
//! | AVX-512 | i32  | 14 | 32  | 4              | 56  | 32  | 256 |
//! | AVX-512 | i16  | 2  | 128 | 2              | 128 | 128 | 256 |
//!
//! There is no scalar table: packing for a CPU without AVX2 is unsupported.

use crate::dtype::{Accumulator, DType};
use crate::error::{Error, Result};
use crate::simd::{SimdLevel, detect_simd};

/// Register and cache blocking for one (ISA, accumulator) pair
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PackingTraits {
    /// Register block for the M dimension
    pub mr: usize,
    /// Register block for the N dimension
    pub nr: usize,
    /// Column rounding granularity of a packed A tile
    pub row_interleave: usize,
    /// Cache block for M (block row extent of A)
    pub mcb: usize,
    /// Cache block for N
    pub ncb: usize,
    /// Cache block for K (block column extent of A)
    pub kcb: usize,
}

const AVX2_I32: PackingTraits = PackingTraits {
    mr: 12,
    nr: 8,
    row_interleave: 4,
    mcb: 120,
    ncb: 8,
    kcb: 512,
};

const AVX2_I16: PackingTraits = PackingTraits {
    mr: 3,
    nr: 16,
    row_interleave: 2,
    mcb: 60,
    ncb: 16,
    kcb: 256,
};

const AVX512_I32: PackingTraits = PackingTraits {
    mr: 14,
    nr: 32,
    row_interleave: 4,
    mcb: 56,
    ncb: 32,
    kcb: 256,
};

const AVX512_I16: PackingTraits = PackingTraits {
    mr: 2,
    nr: 128,
    row_interleave: 2,
    mcb: 128,
    ncb: 128,
    kcb: 256,
};

impl PackingTraits {
    /// Look up the table for `level` and accumulator `Acc`
    ///
    /// Prefers the widest instruction set `level` implies; fails for levels
    /// without a packing table.
    pub fn resolve<Acc: Accumulator>(level: SimdLevel) -> Result<Self> {
        Self::resolve_dtype(level, Acc::DTYPE)
    }

    /// Runtime-typed form of [`PackingTraits::resolve`]
    pub fn resolve_dtype(level: SimdLevel, acc: DType) -> Result<Self> {
        let traits = match (level, acc) {
            (SimdLevel::Avx512, DType::I32) => AVX512_I32,
            (SimdLevel::Avx512, DType::I16) => AVX512_I16,
            (SimdLevel::Avx2, DType::I32) => AVX2_I32,
            (SimdLevel::Avx2, DType::I16) => AVX2_I16,
            (SimdLevel::Avx512 | SimdLevel::Avx2, other) => {
                return Err(Error::invalid_argument(
                    "accT",
                    format!("no packing table for accumulator type {other}"),
                ));
            }
            (level, _) => return Err(Error::UnsupportedArchitecture { level }),
        };
        Ok(traits)
    }

    /// Table for the CPU this process runs on
    pub fn detect<Acc: Accumulator>() -> Result<Self> {
        Self::resolve::<Acc>(detect_simd())
    }

    /// Round `col_size` up to a multiple of the row interleave
    #[inline]
    pub const fn padded_cols(&self, col_size: usize) -> usize {
        col_size.div_ceil(self.row_interleave) * self.row_interleave
    }
}
