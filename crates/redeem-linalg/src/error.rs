use std::error::Error;
use std::fmt;

/// Errors raised by storage, vector and matrix operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinalgError {
    #[error("memory allocation error: could not allocate {len} values")]
    Allocation { len: usize },

    #[error("cannot free memory with non-zero reference count ({live_views} live views)")]
    NonZeroReference { live_views: usize },

    #[error("index {index} out of bounds for length {bound}")]
    Index { index: usize, bound: usize },

    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("operation would invalidate {live_views} live views")]
    LiveViews { live_views: usize },

    #[error("destination shares memory with an operand")]
    Aliased,
}

pub type Result<T> = std::result::Result<T, LinalgError>;

impl LinalgError {
    /// Shape mismatch between two 1-D lengths.
    pub(crate) fn length(expected: usize, found: usize) -> Self {
        LinalgError::ShapeMismatch {
            expected: (expected, 1),
            found: (found, 1),
        }
    }
}

/// A failed release. The container is handed back so the caller can
/// release its views and try again.
pub struct ReleaseError<T> {
    container: T,
    error: LinalgError,
}

impl<T> ReleaseError<T> {
    pub(crate) fn new(container: T, error: LinalgError) -> Self {
        Self { container, error }
    }

    pub fn error(&self) -> &LinalgError {
        &self.error
    }

    pub fn into_inner(self) -> T {
        self.container
    }

    pub(crate) fn map<U, F>(self, f: F) -> ReleaseError<U>
    where
        F: FnOnce(T) -> U,
    {
        ReleaseError {
            container: f(self.container),
            error: self.error,
        }
    }
}

impl<T> fmt::Debug for ReleaseError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for ReleaseError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "release failed: {}", self.error)
    }
}

impl<T> Error for ReleaseError<T> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

impl<T> From<ReleaseError<T>> for LinalgError {
    fn from(value: ReleaseError<T>) -> Self {
        value.error
    }
}
