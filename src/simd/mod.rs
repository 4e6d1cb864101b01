//! SIMD detection and dispatch for packing kernels
//!
//! This module provides runtime CPU feature detection. The detected level
//! drives two independent decisions:
//!
//! - which [`PackingTraits`](crate::pack::PackingTraits) table a packer uses
//!   (resolved once at construction)
//! - which row-sum kernel runs inside `pack` (see [`rowsum`])
//!
//! # Architecture Support
//!
//! | Architecture | Instruction Set | Vector Width | Packing table | Row-sum kernel |
//! |--------------|-----------------|--------------|---------------|----------------|
//! | x86-64       | AVX-512F        | 512 bits     | AVX-512       | AVX2           |
//! | x86-64       | AVX2            | 256 bits     | AVX2          | AVX2           |
//! | ARM64        | NEON            | 128 bits     | none          | Scalar         |
//! | Any          | Scalar          | N/A          | none          | Scalar         |

pub mod rowsum;

use crate::error::{Error, Result};
use std::sync::OnceLock;

/// SIMD capability level detected at runtime
///
/// Higher values indicate more capable SIMD instruction sets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(dead_code)] // Variants may not be constructed on all architectures
pub enum SimdLevel {
    /// AVX-512F (512-bit vectors)
    Avx512 = 3,
    /// AVX2 (256-bit vectors)
    Avx2 = 2,
    /// NEON baseline for AArch64 (128-bit vectors)
    Neon = 1,
    /// Scalar fallback (no SIMD)
    Scalar = 0,
}

impl SimdLevel {
    /// Returns true if this is an x86-64 SIMD level
    #[inline]
    pub const fn is_x86(self) -> bool {
        matches!(self, Self::Avx512 | Self::Avx2)
    }

    /// Returns true if this level supports 512-bit operations
    #[inline]
    pub const fn has_avx512(self) -> bool {
        matches!(self, Self::Avx512)
    }

    /// Returns true if this level supports 256-bit operations
    #[inline]
    pub const fn has_avx2(self) -> bool {
        matches!(self, Self::Avx512 | Self::Avx2)
    }

    /// Returns the name of this SIMD level as a string
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Avx512 => "AVX-512",
            Self::Avx2 => "AVX2",
            Self::Neon => "NEON",
            Self::Scalar => "Scalar",
        }
    }
}

impl std::fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cached SIMD level detection
static SIMD_LEVEL: OnceLock<SimdLevel> = OnceLock::new();

/// Detect the best available SIMD level for the current CPU
///
/// The first call performs detection, later calls return the cached result.
#[inline]
pub fn detect_simd() -> SimdLevel {
    *SIMD_LEVEL.get_or_init(detect_simd_uncached)
}

/// Detect the SIMD level, failing on targets without runtime feature detection
///
/// Use this where a caller must be able to tell "no packing table for this
/// CPU" apart from "cannot inspect the CPU at all".
pub fn try_detect_simd() -> Result<SimdLevel> {
    if cfg!(any(
        target_arch = "x86",
        target_arch = "x86_64",
        target_arch = "aarch64"
    )) {
        Ok(detect_simd())
    } else {
        Err(Error::CpuInfoUnavailable)
    }
}

/// Perform actual CPU feature detection (called once)
#[cold]
fn detect_simd_uncached() -> SimdLevel {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if is_x86_feature_detected!("avx512f") {
            return SimdLevel::Avx512;
        }

        if is_x86_feature_detected!("avx2") {
            return SimdLevel::Avx2;
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        // NEON is mandatory for AArch64
        return SimdLevel::Neon;
    }

    SimdLevel::Scalar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simd_detection_is_cached() {
        let level1 = detect_simd();
        let level2 = detect_simd();
        assert_eq!(level1, level2);
    }

    #[test]
    fn test_try_detect_matches_cached() {
        if let Ok(level) = try_detect_simd() {
            assert_eq!(level, detect_simd());
        }
    }

    #[test]
    fn test_simd_level_ordering() {
        assert!(SimdLevel::Avx512 > SimdLevel::Avx2);
        assert!(SimdLevel::Avx2 > SimdLevel::Neon);
        assert!(SimdLevel::Neon > SimdLevel::Scalar);
    }

    #[test]
    fn test_simd_level_capabilities() {
        assert!(SimdLevel::Avx512.has_avx512());
        assert!(SimdLevel::Avx512.has_avx2());
        assert!(!SimdLevel::Avx2.has_avx512());
        assert!(SimdLevel::Avx2.has_avx2());
        assert!(!SimdLevel::Neon.has_avx2());
        assert!(!SimdLevel::Scalar.has_avx2());

        assert!(SimdLevel::Avx2.is_x86());
        assert!(!SimdLevel::Neon.is_x86());
    }

    #[test]
    fn test_display() {
        assert_eq!(SimdLevel::Avx512.to_string(), "AVX-512");
        assert_eq!(SimdLevel::Scalar.to_string(), "Scalar");
    }
}
