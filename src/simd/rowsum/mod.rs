//! Row sums over 8-bit quantized values
//!
//! Row offsets are the exact i32 sum of a row's real (unpadded) elements.
//! The AVX2 kernels widen bytes pairwise to i16, then to i32 lanes, and
//! reduce horizontally once per row; the scalar versions are the portable
//! reference and must agree bit for bit.
//!
//! Dispatch checks the AVX2 feature bit of the CPU actually running, never
//! the packing table a packer was configured with (an AVX-512 table does
//! not by itself guarantee AVX2).

#[cfg(target_arch = "x86_64")]
mod avx2;

/// Number of u8/i8 values per 256-bit vector
pub const AVX2_BYTE_LANES: usize = 32;

/// Sum of unsigned bytes, promoted to i32
#[inline]
pub fn row_sum_u8(values: &[u8]) -> i32 {
    #[cfg(target_arch = "x86_64")]
    if values.len() >= AVX2_BYTE_LANES && is_x86_feature_detected!("avx2") {
        // SAFETY: AVX2 support was verified at runtime.
        return unsafe { avx2::row_sum_u8(values) };
    }

    row_sum_scalar_u8(values)
}

/// Sum of signed bytes, promoted to i32
#[inline]
pub fn row_sum_i8(values: &[i8]) -> i32 {
    #[cfg(target_arch = "x86_64")]
    if values.len() >= AVX2_BYTE_LANES && is_x86_feature_detected!("avx2") {
        // SAFETY: AVX2 support was verified at runtime.
        return unsafe { avx2::row_sum_i8(values) };
    }

    row_sum_scalar_i8(values)
}

/// Scalar reference for [`row_sum_u8`]
#[inline]
pub fn row_sum_scalar_u8(values: &[u8]) -> i32 {
    values
        .iter()
        .fold(0i32, |acc, &v| acc.wrapping_add(v as i32))
}

/// Scalar reference for [`row_sum_i8`]
#[inline]
pub fn row_sum_scalar_i8(values: &[i8]) -> i32 {
    values
        .iter()
        .fold(0i32, |acc, &v| acc.wrapping_add(v as i32))
}
