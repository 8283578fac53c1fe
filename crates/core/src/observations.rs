//! Fitted observation data for the kriging predictor
//!
//! An [`ObservationSet`] pairs an N×F location matrix with an N-vector of
//! observed values. It is built once per fit, is immutable afterwards, and
//! is replaced wholesale by a subsequent fit.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{Error, Result};

/// Observed sample locations and their scalar values.
#[derive(Debug, Clone)]
pub struct ObservationSet {
    locations: Array2<f64>,
    values: Array1<f64>,
}

impl ObservationSet {
    /// Pair locations (N×F) with values (N).
    ///
    /// # Errors
    /// [`Error::ShapeMismatch`] if the row count of `locations` differs
    /// from the length of `values`.
    pub fn new(locations: Array2<f64>, values: Array1<f64>) -> Result<Self> {
        if locations.nrows() != values.len() {
            return Err(Error::ShapeMismatch {
                locations: locations.nrows(),
                values: values.len(),
            });
        }
        Ok(Self { locations, values })
    }

    /// Number of observations N.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set holds no observations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Feature dimensionality F, frozen for the lifetime of the set.
    pub fn n_features(&self) -> usize {
        self.locations.ncols()
    }

    /// All locations as an N×F view.
    pub fn locations(&self) -> ArrayView2<f64> {
        self.locations.view()
    }

    /// The i-th location row.
    pub fn location(&self, i: usize) -> ArrayView1<f64> {
        self.locations.row(i)
    }

    /// All observed values.
    pub fn values(&self) -> ArrayView1<f64> {
        self.values.view()
    }

    /// The i-th observed value.
    pub fn value(&self, i: usize) -> f64 {
        self.values[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};

    #[test]
    fn test_new_valid() {
        let obs = ObservationSet::new(array![[0.0, 0.0], [1.0, 1.0]], array![10.0, 20.0]).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs.n_features(), 2);
        assert_eq!(obs.value(1), 20.0);
        assert!(!obs.is_empty());
    }

    #[test]
    fn test_shape_mismatch() {
        let err = ObservationSet::new(array![[0.0], [1.0], [2.0]], array![1.0, 2.0]).unwrap_err();
        match err {
            Error::ShapeMismatch { locations, values } => {
                assert_eq!(locations, 3);
                assert_eq!(values, 2);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_empty() {
        let obs =
            ObservationSet::new(Array2::zeros((0, 2)), Array1::zeros(0)).unwrap();
        assert!(obs.is_empty());
        assert_eq!(obs.n_features(), 2);
    }
}
