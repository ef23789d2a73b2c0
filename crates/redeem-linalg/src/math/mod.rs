//! Dense vector and matrix types.
//!
//! Provides `Vector` (1D) and `Matrix` (2D, row-major) built on the shared
//! buffers of [`crate::storage`]. Matrix rows can be borrowed as vector
//! views without copying.
pub mod matrix;
pub mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
