//! # Krige Core
//!
//! Core types for the krige geostatistics library.
//!
//! This crate provides:
//! - `ObservationSet`: fitted sample locations and values
//! - `DistanceMetric`: Euclidean / Manhattan distances
//! - The shared error taxonomy and `Result` alias

pub mod distance;
pub mod error;
pub mod observations;

pub use distance::DistanceMetric;
pub use error::{Error, Result};
pub use observations::ObservationSet;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::distance::DistanceMetric;
    pub use crate::error::{Error, Result};
    pub use crate::observations::ObservationSet;
}
