//! Read-only views over caller-owned source matrices

use crate::error::{Error, Result};

/// Orientation of the stored source data
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum MatrixOp {
    /// Logical row `i` is stored contiguously at `data[i * ld..]`
    #[default]
    NoTranspose,
    /// Logical column `j` is stored contiguously at `data[j * ld..]`
    Transpose,
}

/// A logical `rows × cols` matrix over borrowed storage
///
/// `ld` is the stride between the stored lines (rows for
/// [`MatrixOp::NoTranspose`], columns for [`MatrixOp::Transpose`]), so the
/// source need not be densely packed.
#[derive(Copy, Clone, Debug)]
pub struct LogicalMatrix<'a, T> {
    data: &'a [T],
    rows: usize,
    cols: usize,
    ld: usize,
    op: MatrixOp,
}

impl<'a, T: Copy> LogicalMatrix<'a, T> {
    /// Create a view, checking that `data` covers every addressed element
    pub fn new(op: MatrixOp, rows: usize, cols: usize, data: &'a [T], ld: usize) -> Result<Self> {
        let (lines, line_len) = match op {
            MatrixOp::NoTranspose => (rows, cols),
            MatrixOp::Transpose => (cols, rows),
        };

        if ld < line_len {
            return Err(Error::invalid_argument(
                "ld",
                format!("leading dimension {ld} is smaller than the stored line length {line_len}"),
            ));
        }

        let required = if lines == 0 || line_len == 0 {
            0
        } else {
            (lines - 1) * ld + line_len
        };
        if data.len() < required {
            return Err(Error::invalid_argument(
                "data",
                format!(
                    "{rows}x{cols} matrix with ld {ld} needs {required} elements, got {}",
                    data.len()
                ),
            ));
        }

        Ok(Self {
            data,
            rows,
            cols,
            ld,
            op,
        })
    }

    /// Number of logical rows
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of logical columns
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Leading dimension of the stored data
    #[inline]
    pub fn ld(&self) -> usize {
        self.ld
    }

    /// Storage orientation
    #[inline]
    pub fn op(&self) -> MatrixOp {
        self.op
    }

    /// The borrowed storage
    #[inline]
    pub fn data(&self) -> &'a [T] {
        self.data
    }

    /// Element at logical `(row, col)`
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        match self.op {
            MatrixOp::NoTranspose => self.data[row * self.ld + col],
            MatrixOp::Transpose => self.data[row + self.ld * col],
        }
    }

    /// `len` contiguous elements of logical row `row` starting at `col`
    ///
    /// Only available for [`MatrixOp::NoTranspose`] data.
    #[inline]
    pub(crate) fn row_slice(&self, row: usize, col: usize, len: usize) -> &'a [T] {
        debug_assert_eq!(self.op, MatrixOp::NoTranspose);
        let start = row * self.ld + col;
        &self.data[start..start + len]
    }
}
