//! # Krige Algorithms
//!
//! Ordinary-kriging spatial interpolation for the krige library.
//!
//! ## Modules
//!
//! - **variogram**: parametric semivariance models, empirical variogram
//!   computation, weighted least-squares fitting
//! - **search**: k-d tree and brute-force neighbor-search backends behind
//!   one query contract
//! - **kriging**: the local ordinary-kriging predictor
//! - **snapshot**: flat serializable record of a fitted predictor

pub mod kriging;
pub mod maybe_rayon;
pub mod search;
pub mod snapshot;
pub mod variogram;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::kriging::{
        KrigingConfig, NuggetMode, OrdinaryKriging, PredictParams, Prediction,
    };
    pub use crate::search::SearchBackend;
    pub use crate::snapshot::KrigingSnapshot;
    pub use crate::variogram::{
        empirical_variogram, fit_variogram, EmpiricalVariogram, FittedVariogram,
        VariogramBinding, VariogramFitParams, VariogramModel,
    };
    pub use krige_core::prelude::*;
}
