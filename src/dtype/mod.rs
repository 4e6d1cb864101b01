//! Data types for packed quantized matrices
//!
//! Packing is parameterized by two types: the quantized input element `T`
//! (see [`Element`]) and the accumulator `accT` the consuming GEMM kernel
//! widens products into (see [`Accumulator`]). The pair selects the packing
//! table, so both map onto a runtime [`DType`] tag.

mod element;

pub use element::{Accumulator, Element};

use std::fmt;

/// Runtime tag for the integer types that take part in packing
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    /// Unsigned 8-bit (asymmetric activations)
    U8,
    /// Signed 8-bit (symmetric activations)
    I8,
    /// Signed 16-bit accumulator
    I16,
    /// Signed 32-bit accumulator / row offsets
    I32,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::I16 => 2,
            Self::I32 => 4,
        }
    }

    /// Returns true for signed types
    #[inline]
    pub const fn is_signed(self) -> bool {
        !matches!(self, Self::U8)
    }

    /// Short lowercase name, as used in log output
    #[inline]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
