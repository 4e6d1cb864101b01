//! AVX2 row-sum kernels
//!
//! `_mm256_maddubs_epi16` multiplies unsigned bytes of its first operand with
//! signed bytes of its second and adds adjacent pairs into i16. Multiplying
//! by a vector of ones turns it into a pairwise widening add; the operand
//! order picks whether the source is read as unsigned or signed.
//! `_mm256_madd_epi16` against ones then widens i16 pairs into i32 lanes.
//! Pair sums stay within [-256, 510], so no saturation occurs.

use std::arch::x86_64::*;

use super::AVX2_BYTE_LANES;

/// Horizontal sum of 8 i32 lanes in __m256i
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn hsum_epi32(v: __m256i) -> i32 {
    unsafe {
        let high = _mm256_extracti128_si256(v, 1);
        let low = _mm256_castsi256_si128(v);
        let sum128 = _mm_add_epi32(low, high);
        let hi64 = _mm_srli_si128(sum128, 8);
        let sum64 = _mm_add_epi32(sum128, hi64);
        let hi32 = _mm_srli_si128(sum64, 4);
        let sum32 = _mm_add_epi32(sum64, hi32);
        _mm_cvtsi128_si32(sum32)
    }
}

/// Sum of unsigned bytes
///
/// # Safety
/// The CPU must support AVX2.
#[target_feature(enable = "avx2")]
pub unsafe fn row_sum_u8(values: &[u8]) -> i32 {
    let chunks = values.len() / AVX2_BYTE_LANES;
    let ptr = values.as_ptr();

    let sum = unsafe {
        let one_epi8 = _mm256_set1_epi8(1);
        let one_epi16 = _mm256_set1_epi16(1);
        let mut sum_v = _mm256_setzero_si256();
        for i in 0..chunks {
            let src_v = _mm256_loadu_si256(ptr.add(i * AVX2_BYTE_LANES) as *const __m256i);
            let pairs = _mm256_maddubs_epi16(src_v, one_epi8);
            sum_v = _mm256_add_epi32(sum_v, _mm256_madd_epi16(pairs, one_epi16));
        }
        hsum_epi32(sum_v)
    };

    values[chunks * AVX2_BYTE_LANES..]
        .iter()
        .fold(sum, |acc, &v| acc.wrapping_add(v as i32))
}

/// Sum of signed bytes
///
/// # Safety
/// The CPU must support AVX2.
#[target_feature(enable = "avx2")]
pub unsafe fn row_sum_i8(values: &[i8]) -> i32 {
    let chunks = values.len() / AVX2_BYTE_LANES;
    let ptr = values.as_ptr();

    let sum = unsafe {
        let one_epi8 = _mm256_set1_epi8(1);
        let one_epi16 = _mm256_set1_epi16(1);
        let mut sum_v = _mm256_setzero_si256();
        for i in 0..chunks {
            let src_v = _mm256_loadu_si256(ptr.add(i * AVX2_BYTE_LANES) as *const __m256i);
            // Ones as the unsigned operand so src is read as signed
            let pairs = _mm256_maddubs_epi16(one_epi8, src_v);
            sum_v = _mm256_add_epi32(sum_v, _mm256_madd_epi16(pairs, one_epi16));
        }
        hsum_epi32(sum_v)
    };

    values[chunks * AVX2_BYTE_LANES..]
        .iter()
        .fold(sum, |acc, &v| acc.wrapping_add(v as i32))
}
