use std::cell::Cell;
use std::fmt;

use crate::config::LinalgConfig;
use crate::error::{LinalgError, ReleaseError, Result};
use crate::storage::Storage;

/// A 1-D sequence of `f64`, either owning its buffer or viewing another's.
///
/// Mutating operations take `&self`: the buffer may be shared with other
/// vectors, and a destination may alias one of its own inputs.
#[derive(Debug)]
pub struct Vector {
    storage: Storage,
}

impl Vector {
    /// Returns a new zero-filled vector.
    pub fn new(len: usize) -> Result<Self> {
        Ok(Self {
            storage: Storage::allocate(len)?,
        })
    }

    pub fn from_slice(data: &[f64]) -> Result<Self> {
        Ok(Self {
            storage: Storage::from_slice(data)?,
        })
    }

    pub fn from_vec(data: Vec<f64>) -> Result<Self> {
        Self::from_slice(&data)
    }

    /// Vector view over `len` values of `parent` starting at `offset`.
    pub(crate) fn view_of(parent: &Storage, offset: usize, len: usize) -> Result<Self> {
        Ok(Self {
            storage: parent.view(offset, len)?,
        })
    }

    /// Allocate `len` values and fill them from `values`.
    pub(crate) fn from_iter_exact<I>(len: usize, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let v = Self::new(len)?;
        for (cell, value) in v.cells().iter().zip(values) {
            cell.set(value);
        }
        Ok(v)
    }

    pub fn constant(len: usize, c: f64) -> Result<Self> {
        let v = Self::new(len)?;
        v.storage.fill(c);
        Ok(v)
    }

    pub fn zeros(len: usize) -> Result<Self> {
        Self::constant(len, 0.0)
    }

    pub fn ones(len: usize) -> Result<Self> {
        Self::constant(len, 1.0)
    }

    /// Returns `len` values equally spaced over the closed interval `[min, max]`.
    ///
    /// A single-element linspace is `[min]`.
    pub fn linspace(len: usize, min: f64, max: f64) -> Result<Self> {
        let v = Self::new(len)?;
        match len {
            0 => {}
            1 => v.cells()[0].set(min),
            _ => {
                let intervals = (len - 1) as f64;
                for (i, cell) in v.cells().iter().enumerate() {
                    cell.set(min + (i as f64) * (max - min) / intervals);
                }
            }
        }
        Ok(v)
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn is_view(&self) -> bool {
        self.storage.is_view()
    }

    /// Live views on this vector's buffer, `None` if this vector is itself a view.
    pub fn live_view_count(&self) -> Option<usize> {
        self.storage.live_view_count()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.storage.get(index)
    }

    pub fn set(&self, index: usize, value: f64) -> Result<()> {
        self.storage.set(index, value)
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.storage.iter()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.storage.to_vec()
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[inline]
    pub(crate) fn cells(&self) -> &[Cell<f64>] {
        self.storage.cells()
    }

    /// Release the vector. See [`Storage::release`].
    pub fn release(self) -> std::result::Result<(), ReleaseError<Self>> {
        self.storage
            .release()
            .map_err(|err| err.map(|storage| Vector { storage }))
    }

    /// Returns a view of the values in `start..end`.
    ///
    /// The view shares memory with `self`; writes through either are visible
    /// through both.
    pub fn slice(&self, start: usize, end: usize) -> Result<Vector> {
        if start > end {
            return Err(LinalgError::Index {
                index: start,
                bound: end,
            });
        }
        if end > self.len() {
            return Err(LinalgError::Index {
                index: end,
                bound: self.len(),
            });
        }
        Self::view_of(&self.storage, start, end - start)
    }

    /// Returns an owning copy of the vector.
    pub fn copy(&self) -> Result<Vector> {
        Ok(Vector {
            storage: self.storage.snapshot()?,
        })
    }

    /// Copies this vector's values into `dst` without reallocating `dst`.
    ///
    /// `dst` may be a view overlapping `self` at another offset; the source
    /// is then staged through a temporary copy.
    pub fn copy_into(&self, dst: &Vector) -> Result<()> {
        dst.map_into(self, |x| x)
    }

    pub fn add(&self, other: &Vector) -> Result<Vector> {
        check_len(self.len(), other.len())?;
        let out = Vector::new(self.len())?;
        out.add_into(self, other)?;
        Ok(out)
    }

    /// Writes `v1 + v2` into `self`. `self` may alias either input.
    pub fn add_into(&self, v1: &Vector, v2: &Vector) -> Result<()> {
        self.zip_into(v1, v2, |a, b| a + b)
    }

    pub fn sub(&self, other: &Vector) -> Result<Vector> {
        check_len(self.len(), other.len())?;
        let out = Vector::new(self.len())?;
        out.sub_into(self, other)?;
        Ok(out)
    }

    /// Writes `v1 - v2` into `self`.
    pub fn sub_into(&self, v1: &Vector, v2: &Vector) -> Result<()> {
        self.zip_into(v1, v2, |a, b| a - b)
    }

    pub fn scalar_mul(&self, s: f64) -> Result<Vector> {
        let out = Vector::new(self.len())?;
        out.scalar_mul_into(self, s)?;
        Ok(out)
    }

    /// Writes `v * s` into `self`.
    pub fn scalar_mul_into(&self, v: &Vector, s: f64) -> Result<()> {
        self.map_into(v, |x| x * s)
    }

    /// Returns the vector divided by its L2 norm.
    ///
    /// A zero vector has norm 0 and normalizes to NaN values.
    pub fn normalize(&self) -> Result<Vector> {
        let out = Vector::new(self.len())?;
        out.normalize_into(self)?;
        Ok(out)
    }

    /// Writes `v / |v|` into `self`.
    pub fn normalize_into(&self, v: &Vector) -> Result<()> {
        let norm = v.norm();
        self.map_into(v, |x| x / norm)
    }

    pub fn dot(&self, other: &Vector) -> Result<f64> {
        check_len(self.len(), other.len())?;
        Ok(dot_cells(self.cells(), other.cells()))
    }

    pub fn norm(&self) -> f64 {
        dot_cells(self.cells(), self.cells()).sqrt()
    }

    /// Returns true if both vectors have the same length and every pair of
    /// values differs by at most `tol`.
    pub fn equal(&self, other: &Vector, tol: f64) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| (a - b).abs() <= tol)
    }

    pub fn approx_eq(&self, other: &Vector, config: &LinalgConfig) -> bool {
        self.equal(other, config.tolerance)
    }

    /// Render with `precision` fractional digits, e.g. `[1.00, 2.50]`.
    pub fn render(&self, precision: usize) -> String {
        CellsDisplay {
            cells: self.cells(),
            precision,
        }
        .to_string()
    }

    pub fn render_with(&self, config: &LinalgConfig) -> String {
        self.render(config.precision)
    }

    fn zip_into<F>(&self, v1: &Vector, v2: &Vector, op: F) -> Result<()>
    where
        F: Fn(f64, f64) -> f64,
    {
        check_len(v1.len(), v2.len())?;
        check_len(self.len(), v1.len())?;
        // Output i reads only input i, so an identical window is safe in one
        // pass; a shifted overlap is read from a snapshot.
        let staged1 = v1.storage.snapshot_if_shifted(&self.storage)?;
        let staged2 = v2.storage.snapshot_if_shifted(&self.storage)?;
        let lhs = staged1.as_ref().map_or(v1.cells(), Storage::cells);
        let rhs = staged2.as_ref().map_or(v2.cells(), Storage::cells);
        for ((d, a), b) in self.cells().iter().zip(lhs).zip(rhs) {
            d.set(op(a.get(), b.get()));
        }
        Ok(())
    }

    fn map_into<F>(&self, v: &Vector, op: F) -> Result<()>
    where
        F: Fn(f64) -> f64,
    {
        check_len(self.len(), v.len())?;
        let staged = v.storage.snapshot_if_shifted(&self.storage)?;
        let src = staged.as_ref().map_or(v.cells(), Storage::cells);
        for (d, a) in self.cells().iter().zip(src) {
            d.set(op(a.get()));
        }
        Ok(())
    }
}

fn check_len(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(LinalgError::length(expected, found));
    }
    Ok(())
}

pub(crate) fn dot_cells(lhs: &[Cell<f64>], rhs: &[Cell<f64>]) -> f64 {
    lhs.iter().zip(rhs).map(|(a, b)| a.get() * b.get()).sum()
}

pub(crate) fn write_cells(
    f: &mut fmt::Formatter<'_>,
    cells: &[Cell<f64>],
    precision: usize,
) -> fmt::Result {
    write!(f, "[")?;
    for (idx, cell) in cells.iter().enumerate() {
        write!(f, "{:.*}", precision, cell.get())?;
        if idx + 1 != cells.len() {
            write!(f, ", ")?;
        }
    }
    write!(f, "]")
}

/// Displays a run of cells in vector format at a given precision.
struct CellsDisplay<'a> {
    cells: &'a [Cell<f64>],
    precision: usize,
}

impl fmt::Display for CellsDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_cells(f, self.cells, self.precision)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_cells(f, self.cells(), LinalgConfig::DEFAULT_PRECISION)
    }
}

impl TryFrom<Vec<f64>> for Vector {
    type Error = LinalgError;

    fn try_from(value: Vec<f64>) -> Result<Self> {
        Vector::from_vec(value)
    }
}

impl TryFrom<&[f64]> for Vector {
    type Error = LinalgError;

    fn try_from(value: &[f64]) -> Result<Self> {
        Vector::from_slice(value)
    }
}
