use std::cell::Cell;
use std::fmt;

use crate::config::LinalgConfig;
use crate::error::{LinalgError, ReleaseError, Result};
use crate::math::vector::{write_cells, Vector};
use crate::storage::Storage;

/// A 2-D matrix of `f64` in row-major layout.
///
/// Element `(i, j)` lives at offset `i * ncols + j`. Rows are contiguous and
/// can be viewed without copying through [`Matrix::row_view`]; columns are
/// strided and are only available as copies.
#[derive(Debug)]
pub struct Matrix {
    storage: Storage,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Returns a new zero-filled matrix.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let len = rows
            .checked_mul(cols)
            .ok_or(LinalgError::Allocation { len: usize::MAX })?;
        Ok(Self {
            storage: Storage::allocate(len)?,
            rows,
            cols,
        })
    }

    /// Returns a matrix initialized from row-major `data`.
    pub fn from_slice(rows: usize, cols: usize, data: &[f64]) -> Result<Self> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(LinalgError::ShapeMismatch {
                expected: (rows, cols),
                found: (data.len(), 1),
            });
        }
        Ok(Self {
            storage: Storage::from_slice(data)?,
            rows,
            cols,
        })
    }

    /// Returns a matrix initialized from a slice of rows.
    ///
    /// All rows must have the same length.
    pub fn from_rows<R>(data: &[R]) -> Result<Self>
    where
        R: AsRef<[f64]>,
    {
        let rows = data.len();
        let cols = data.first().map_or(0, |row| row.as_ref().len());
        let m = Self::new(rows, cols)?;
        for (i, row) in data.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(LinalgError::ShapeMismatch {
                    expected: (1, cols),
                    found: (1, row.len()),
                });
            }
            for (cell, &value) in m.row_cells(i).iter().zip(row) {
                cell.set(value);
            }
        }
        Ok(m)
    }

    pub fn constant(rows: usize, cols: usize, c: f64) -> Result<Self> {
        let m = Self::new(rows, cols)?;
        m.storage.fill(c);
        Ok(m)
    }

    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Self::constant(rows, cols, 0.0)
    }

    pub fn ones(rows: usize, cols: usize) -> Result<Self> {
        Self::constant(rows, cols, 1.0)
    }

    /// Returns the `n x n` identity matrix.
    pub fn identity(n: usize) -> Result<Self> {
        let m = Self::zeros(n, n)?;
        for i in 0..n {
            m.storage.cells()[i * n + i].set(1.0);
        }
        Ok(m)
    }

    /// Returns an owning copy of the matrix.
    pub fn copy(&self) -> Result<Matrix> {
        Ok(Self {
            storage: self.storage.snapshot()?,
            rows: self.rows,
            cols: self.cols,
        })
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of live row views into this matrix.
    pub fn live_view_count(&self) -> usize {
        self.storage.live_view_count().unwrap_or(0)
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            self.storage.get(self.offset(row, col))
        } else {
            None
        }
    }

    pub fn set(&self, row: usize, col: usize, value: f64) -> Result<()> {
        self.check_row(row)?;
        self.check_col(col)?;
        self.storage.set(self.offset(row, col), value)
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.storage.to_vec()
    }

    /// Release the matrix. Fails while row views are live.
    pub fn release(self) -> std::result::Result<(), ReleaseError<Self>> {
        let (rows, cols) = (self.rows, self.cols);
        self.storage
            .release()
            .map_err(|err| err.map(|storage| Matrix { storage, rows, cols }))
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.rows {
            return Err(LinalgError::Index {
                index: row,
                bound: self.rows,
            });
        }
        Ok(())
    }

    fn check_col(&self, col: usize) -> Result<()> {
        if col >= self.cols {
            return Err(LinalgError::Index {
                index: col,
                bound: self.cols,
            });
        }
        Ok(())
    }

    #[inline]
    fn row_cells(&self, row: usize) -> &[Cell<f64>] {
        let start = self.offset(row, 0);
        &self.storage.cells()[start..start + self.cols]
    }

    /// Returns a vector view into a matrix row.
    ///
    /// The view shares memory with the matrix and counts against it until
    /// released.
    pub fn row_view(&self, row: usize) -> Result<Vector> {
        self.check_row(row)?;
        Vector::view_of(&self.storage, self.offset(row, 0), self.cols)
    }

    pub fn row_copy(&self, row: usize) -> Result<Vector> {
        self.check_row(row)?;
        Vector::from_iter_exact(self.cols, self.row_cells(row).iter().map(Cell::get))
    }

    // No column view, columns are not contiguous memory.
    pub fn col_copy(&self, col: usize) -> Result<Vector> {
        self.check_col(col)?;
        let values = self
            .storage
            .cells()
            .iter()
            .skip(col)
            .step_by(self.cols)
            .map(Cell::get);
        Vector::from_iter_exact(self.rows, values)
    }

    /// Copy a vector's values into a matrix row, in place.
    pub fn copy_vector_into_row(&self, v: &Vector, row: usize) -> Result<()> {
        self.check_row(row)?;
        if v.len() != self.cols {
            return Err(LinalgError::ShapeMismatch {
                expected: (1, self.cols),
                found: (1, v.len()),
            });
        }
        let staged = self.stage(v)?;
        let src = staged.as_ref().map_or(v.cells(), Storage::cells);
        for (d, s) in self.row_cells(row).iter().zip(src) {
            d.set(s.get());
        }
        Ok(())
    }

    /// Copy a vector's values into a matrix column, in place.
    pub fn copy_vector_into_col(&self, v: &Vector, col: usize) -> Result<()> {
        self.check_col(col)?;
        if v.len() != self.rows {
            return Err(LinalgError::ShapeMismatch {
                expected: (self.rows, 1),
                found: (v.len(), 1),
            });
        }
        let staged = self.stage(v)?;
        let src = staged.as_ref().map_or(v.cells(), Storage::cells);
        let column = self.storage.cells().iter().skip(col).step_by(self.cols);
        for (d, s) in column.zip(src) {
            d.set(s.get());
        }
        Ok(())
    }

    /// Copy of `v` if it is a view into this matrix, so writes into the
    /// matrix cannot clobber values of `v` not yet read.
    fn stage(&self, v: &Vector) -> Result<Option<Storage>> {
        if v.storage().shares_block_with(&self.storage) {
            return v.storage().snapshot().map(Some);
        }
        Ok(None)
    }

    /// Returns a copy of the main diagonal, `min(nrows, ncols)` values long.
    pub fn diagonal(&self) -> Result<Vector> {
        let n = self.rows.min(self.cols);
        let cells = self.storage.cells();
        Vector::from_iter_exact(n, (0..n).map(|i| cells[self.offset(i, i)].get()))
    }

    /// Transposes the matrix in place.
    ///
    /// The buffer is rewritten, so a row view taken before the transpose
    /// would no longer describe a row. Transposing is refused while any row
    /// view is live.
    pub fn transpose(&mut self) -> Result<()> {
        let live_views = self.live_view_count();
        if live_views != 0 {
            return Err(LinalgError::LiveViews { live_views });
        }

        let (rows, cols) = (self.rows, self.cols);
        let scratch = self.storage.snapshot()?;
        let (src, cells) = (scratch.cells(), self.storage.cells());
        for i in 0..rows {
            for j in 0..cols {
                cells[j * rows + i].set(src[i * cols + j].get());
            }
        }
        self.rows = cols;
        self.cols = rows;
        Ok(())
    }

    /// Compute the matrix product of two aligned matrices.
    pub fn mul(&self, other: &Matrix) -> Result<Matrix> {
        check_inner(self, other)?;
        let out = Matrix::new(self.rows, other.cols)?;
        out.mul_into(self, other)?;
        Ok(out)
    }

    /// Writes the matrix product `m1 * m2` into `self`.
    ///
    /// Iteration order is i-k-j: for each output row `i` and each `k`, row
    /// `k` of `m2` is scaled by `m1[i, k]` and accumulated into row `i` of
    /// the output. The innermost loop walks contiguous memory in both `m2`
    /// and the output.
    ///
    /// # Errors
    ///
    /// [`LinalgError::Aliased`] if `self` shares memory with `m1` or `m2`,
    /// [`LinalgError::ShapeMismatch`] if the shapes are not aligned.
    pub fn mul_into(&self, m1: &Matrix, m2: &Matrix) -> Result<()> {
        check_inner(m1, m2)?;
        if self.shape() != (m1.rows, m2.cols) {
            return Err(LinalgError::ShapeMismatch {
                expected: (m1.rows, m2.cols),
                found: self.shape(),
            });
        }
        if self.storage.overlaps(&m1.storage) || self.storage.overlaps(&m2.storage) {
            return Err(LinalgError::Aliased);
        }

        let lhs = m1.storage.cells();
        for i in 0..m1.rows {
            let out_row = self.row_cells(i);
            out_row.iter().for_each(|c| c.set(0.0));
            for k in 0..m1.cols {
                let scale = lhs[m1.offset(i, k)].get();
                for (o, b) in out_row.iter().zip(m2.row_cells(k)) {
                    o.set(o.get() + scale * b.get());
                }
            }
        }
        Ok(())
    }

    /// Returns the product of an aligned matrix vector pair.
    pub fn vector_mul(&self, v: &Vector) -> Result<Vector> {
        if self.cols != v.len() {
            return Err(LinalgError::ShapeMismatch {
                expected: (self.cols, 1),
                found: (v.len(), 1),
            });
        }
        let out = Vector::new(self.rows)?;
        for i in 0..self.rows {
            let row = self.row_view(i)?;
            out.set(i, row.dot(v)?)?;
        }
        Ok(out)
    }

    /// Returns true if every value strictly below the diagonal is within `tol` of 0.
    pub fn is_upper_triangular(&self, tol: f64) -> bool {
        (1..self.rows).all(|i| {
            self.row_cells(i)
                .iter()
                .take(i)
                .all(|c| c.get().abs() <= tol)
        })
    }

    /// Returns true if both matrices have the same shape and every pair of
    /// values differs by at most `tol`.
    pub fn equal(&self, other: &Matrix, tol: f64) -> bool {
        self.shape() == other.shape()
            && self
                .storage
                .iter()
                .zip(other.storage.iter())
                .all(|(a, b)| (a - b).abs() <= tol)
    }

    pub fn approx_eq(&self, other: &Matrix, config: &LinalgConfig) -> bool {
        self.equal(other, config.tolerance)
    }

    /// Render with `precision` fractional digits, one row per line.
    pub fn render(&self, precision: usize) -> String {
        RowsDisplay {
            matrix: self,
            precision,
        }
        .to_string()
    }

    pub fn render_with(&self, config: &LinalgConfig) -> String {
        self.render(config.precision)
    }

    fn write_rows(&self, f: &mut fmt::Formatter<'_>, precision: usize) -> fmt::Result {
        write!(f, "[")?;
        for i in 0..self.rows {
            if i > 0 {
                write!(f, ",\n ")?;
            }
            write_cells(f, self.row_cells(i), precision)?;
        }
        write!(f, "]")
    }
}

fn check_inner(m1: &Matrix, m2: &Matrix) -> Result<()> {
    if m1.cols != m2.rows {
        return Err(LinalgError::ShapeMismatch {
            expected: (m1.cols, m2.cols),
            found: m2.shape(),
        });
    }
    Ok(())
}

struct RowsDisplay<'a> {
    matrix: &'a Matrix,
    precision: usize,
}

impl fmt::Display for RowsDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.matrix.write_rows(f, self.precision)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_rows(f, LinalgConfig::DEFAULT_PRECISION)
    }
}
