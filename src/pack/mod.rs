//! Packing of quantized activation matrices for integer GEMM
//!
//! # Layout
//!
//! The logical `M × K` matrix A is cut into `MCB × KCB` tiles. A packer
//! materializes one tile at a time into a scratch buffer, row-major within
//! the tile, with each row's width rounded up to `ROW_INTERLEAVE` and the
//! tail zero-filled:
//!
//! ```text
//!            col_size      padded    KCB
//!        ┌───────────────┬───┬───────────┐
//!  row 0 │ a a a a a a a │ 0 │ untouched │
//!  row 1 │ a a a a a a a │ 0 │           │
//!   ...  │               │   │           │
//!        └───────────────┴───┴───────────┘
//!   MCB
//! ```
//!
//! # Module Structure
//!
//! - `block.rs`: block requests
//! - `source.rs`: borrowed source views and orientation
//! - `traits.rs`: blocking parameters per ISA and accumulator
//! - `buffer.rs`: aligned owned / borrowed tile storage
//! - `matrix.rs`: tile-grid bookkeeping
//! - `row_offset.rs`: the packer with row-offset accumulation

mod block;
mod buffer;
mod matrix;
mod row_offset;
mod source;
mod traits;

pub use block::BlockType;
pub use buffer::{AlignedBuffer, BUFFER_ALIGN, Storage};
pub use matrix::PackMatrix;
pub use row_offset::{PackAWithRowOffset, PackOptions};
pub use source::{LogicalMatrix, MatrixOp};
pub use traits::PackingTraits;
