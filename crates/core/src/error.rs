//! Error types for krige

use thiserror::Error;

/// Main error type for krige operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("shape mismatch: {locations} locations vs {values} values")]
    ShapeMismatch { locations: usize, values: usize },

    #[error("dimension mismatch: fitted on {expected} features, query has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("number of neighbors must be > 0")]
    InvalidNeighborCount,

    #[error("search radius must be > 0, got {radius}")]
    InvalidRadius { radius: f64 },

    #[error("predict called before fit")]
    NotFitted,

    #[error("singular kriging system at query point {query}")]
    SingularSystem { query: usize },

    #[error("algorithm error: {0}")]
    Algorithm(String),
}

/// Result type alias for krige operations
pub type Result<T> = std::result::Result<T, Error>;
