//! Element and accumulator traits mapping Rust types to DType

use super::DType;
use crate::simd::rowsum;
use bytemuck::{Pod, Zeroable};
use std::fmt::{Debug, Display};

/// Trait for quantized input elements that can be packed
///
/// # Bounds
/// - `Pod + Zeroable` - tiles are zero-initialized raw memory (bytemuck)
/// - `Display` - used by the packed-matrix dump
pub trait Element: Copy + Send + Sync + Pod + Zeroable + Debug + Display + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Promote to the 32-bit row-offset type
    fn to_i32(self) -> i32;

    /// Promote to i64 for printing (narrow integers would otherwise be
    /// easy to confuse with character codes)
    #[inline]
    fn to_i64(self) -> i64 {
        self.to_i32() as i64
    }

    /// Value written into padding columns
    ///
    /// This is plain zero, never the quantization zero-point: padding must
    /// not contribute to row offsets.
    fn zero() -> Self;

    /// Sum of `values` promoted to i32, using the widest row-sum kernel the
    /// running CPU supports
    fn row_sum(values: &[Self]) -> i32;

    /// Portable scalar reference for [`Element::row_sum`]
    #[inline]
    fn row_sum_scalar(values: &[Self]) -> i32 {
        values
            .iter()
            .fold(0i32, |acc, &v| acc.wrapping_add(v.to_i32()))
    }
}

impl Element for u8 {
    const DTYPE: DType = DType::U8;

    #[inline]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn row_sum(values: &[Self]) -> i32 {
        rowsum::row_sum_u8(values)
    }
}

impl Element for i8 {
    const DTYPE: DType = DType::I8;

    #[inline]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn row_sum(values: &[Self]) -> i32 {
        rowsum::row_sum_i8(values)
    }
}

/// Trait for the accumulator type of the GEMM kernel consuming a packed tile
///
/// The accumulator never appears in the packed data; it only selects the
/// blocking parameters (narrower accumulators use smaller tiles).
pub trait Accumulator: Copy + Send + Sync + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;
}

impl Accumulator for i32 {
    const DTYPE: DType = DType::I32;
}

impl Accumulator for i16 {
    const DTYPE: DType = DType::I16;
}
