//! redeem-linalg: dense f64 vectors and matrices with tracked views.
//!
//! This crate provides owning and view containers over shared buffers
//! (`storage`), a vector engine and a row-major matrix engine (`math`),
//! and the error and configuration types they share.
//!
//! Views alias their owner's memory without copying. Each owner tracks how
//! many views are alive and refuses to be released until they are gone.
pub mod config;
pub mod error;
pub mod math;
pub mod storage;

pub use config::LinalgConfig;
pub use error::{LinalgError, ReleaseError, Result};
pub use math::{Matrix, Vector};
pub use storage::Storage;
