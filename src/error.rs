//! Error types for qpack

use crate::simd::SimdLevel;
use thiserror::Error;

/// Result type alias using qpack's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while setting up a packer
///
/// Malformed `pack` requests are not represented here: they are contract
/// violations and panic.
#[derive(Error, Debug)]
pub enum Error {
    /// No packing table exists for the detected (or requested) instruction set
    #[error("Unsupported architecture: no packing parameters for {level}")]
    UnsupportedArchitecture {
        /// The SIMD level that was resolved
        level: SimdLevel,
    },

    /// Grouped packing was requested
    #[error("Unsupported group count {groups}: only groups == 1 is supported")]
    UnsupportedGroups {
        /// The requested group count
        groups: usize,
    },

    /// Runtime CPU feature detection is not available on this target
    #[error("Failed to initialize CPU feature detection")]
    CpuInfoUnavailable,

    /// A caller-supplied buffer cannot hold one tile
    #[error("Buffer '{what}' too small: need {required} elements, got {got}")]
    BufferTooSmall {
        /// Which buffer was rejected
        what: &'static str,
        /// Required element count
        required: usize,
        /// Supplied element count
        got: usize,
    },

    /// Invalid argument provided to a constructor
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },
}

impl Error {
    /// Create a buffer-too-small error
    pub fn buffer_too_small(what: &'static str, required: usize, got: usize) -> Self {
        Self::BufferTooSmall {
            what,
            required,
            got,
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }
}
