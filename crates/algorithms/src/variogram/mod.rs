//! Variogram modeling
//!
//! - `models`: the parametric semivariance model family
//! - `fitting`: empirical variogram computation and weighted least-squares
//!   model fitting
//!
//! A [`VariogramBinding`] ties a model family to a fixed parameter vector
//! and is the only thing the kriging predictor consumes: it supplies
//! distances and reads back semivariances.

pub mod fitting;
pub mod models;

pub use fitting::{
    empirical_variogram, fit_variogram, EmpiricalVariogram, FittedVariogram, VariogramFitParams,
};
pub use models::VariogramModel;

use krige_core::{Error, Result};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// A semivariance function bound to a fixed parameter vector.
///
/// Already fitted; the predictor never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariogramBinding {
    model: VariogramModel,
    params: Vec<f64>,
}

impl VariogramBinding {
    /// Bind `model` to `params`.
    ///
    /// # Errors
    /// [`Error::Algorithm`] if the parameter vector length does not match
    /// the model family.
    pub fn new(model: VariogramModel, params: Vec<f64>) -> Result<Self> {
        if params.len() != model.param_count() {
            return Err(Error::Algorithm(format!(
                "{} model expects {} parameters, got {}",
                model.name(),
                model.param_count(),
                params.len()
            )));
        }
        Ok(Self { model, params })
    }

    /// The bound model family.
    pub fn model(&self) -> VariogramModel {
        self.model
    }

    /// The bound parameter vector.
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Nugget of the bound model.
    pub fn nugget(&self) -> f64 {
        self.model.nugget(&self.params)
    }

    /// Semivariance at distance `d`.
    #[inline]
    pub fn predict(&self, d: f64) -> f64 {
        self.model.evaluate(&self.params, d)
    }

    /// Semivariances for an array of distances, same shape as the input.
    pub fn predict_batch(&self, d: ArrayView1<f64>) -> Array1<f64> {
        self.model.evaluate_batch(&self.params, d)
    }
}
