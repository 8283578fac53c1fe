//! Ordinary Kriging prediction
//!
//! Best Linear Unbiased Estimator (BLUE) for spatial data. For each query
//! point a local neighborhood is selected, the constrained kriging system
//! is assembled from the variogram's semivariances, and the solved weights
//! give the estimate and its estimation variance.
//!
//! The kriging system for n neighbors:
//! ```text
//! [γ(x₁,x₁) ... γ(x₁,xₙ) 1] [w₁]   [γ(x₁,x₀)]
//! [   ...     ...    ...    .]  [. ] = [   ...    ]
//! [γ(xₙ,x₁) ... γ(xₙ,xₙ) 1] [wₙ]   [γ(xₙ,x₀)]
//! [  1       ...    1       0] [μ ]   [    1     ]
//! ```
//! where γ is the semivariance from the variogram binding, x₀ is the query
//! location, and μ is the Lagrange multiplier enforcing Σwᵢ = 1.
//!
//! Reference:
//! Matheron, G. (1963). Principles of geostatistics. Economic Geology.
//! Kitanidis, P.K. (1997). Introduction to Geostatistics. Cambridge.

use krige_core::{DistanceMetric, Error, ObservationSet, Result};
use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::maybe_rayon::*;
use crate::search::{build_backend, NeighborSearch, SearchBackend, NO_NEIGHBOR};
use crate::variogram::{
    empirical_variogram, fit_variogram, EmpiricalVariogram, VariogramBinding, VariogramFitParams,
    VariogramModel,
};

/// Pivot threshold below which the kriging system is treated as singular.
const PIVOT_EPS: f64 = 1e-14;

/// How the nugget effect enters the kriging system.
///
/// The two branches are mutually exclusive and touch both sides of the
/// system: the matrix diagonal and the right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NuggetMode {
    /// Keep the system as assembled: the diagonal carries γ(0) (the
    /// nugget), and a zero-distance neighbor keeps its modeled
    /// semivariance in the right-hand side.
    Included,
    /// Zero the matrix diagonal and force the right-hand-side entry of
    /// any neighbor at exactly zero distance to 0, so an exact-match
    /// neighbor is treated as perfectly known and the predictor
    /// interpolates it exactly.
    #[default]
    ExcludedWithExactMatch,
}

/// Immutable predictor configuration, fixed at construction.
///
/// There are no setters; derive a changed configuration with the `with_*`
/// helpers before building the predictor.
#[derive(Debug, Clone, Default)]
pub struct KrigingConfig {
    /// Metric for neighbor search, pairwise distances and variogram binning
    pub metric: DistanceMetric,
    /// Nugget policy applied during system assembly
    pub nugget: NuggetMode,
    /// Neighbor-search data structure built at fit time
    pub backend: SearchBackend,
    /// Model family fitted when no binding is supplied
    pub model: VariogramModel,
    /// Lag controls for the in-repo variogram fit
    pub fit: VariogramFitParams,
}

impl KrigingConfig {
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_nugget(mut self, nugget: NuggetMode) -> Self {
        self.nugget = nugget;
        self
    }

    pub fn with_backend(mut self, backend: SearchBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_model(mut self, model: VariogramModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_fit_params(mut self, fit: VariogramFitParams) -> Self {
        self.fit = fit;
        self
    }
}

/// Per-call prediction parameters.
#[derive(Debug, Clone)]
pub struct PredictParams {
    /// Maximum number of nearest observations per query point
    pub n_neighbors: usize,
    /// Search radius; neighbors at distance >= radius are dropped
    pub radius: f64,
    /// Whether to compute the kriging estimation variance
    pub compute_variance: bool,
}

impl Default for PredictParams {
    fn default() -> Self {
        Self {
            n_neighbors: 16,
            radius: f64::INFINITY,
            compute_variance: false,
        }
    }
}

/// Result of a prediction batch, index-aligned to the query batch.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Interpolated values; 0.0 where the neighborhood was empty, NaN
    /// where the local system was singular
    pub estimate: Array1<f64>,
    /// Kriging estimation variance, present when requested; same defaults
    /// as `estimate`
    pub variance: Option<Array1<f64>>,
    /// Query indices whose local kriging system was singular. The rest of
    /// the batch is unaffected.
    pub singular: Vec<usize>,
}

struct FittedState {
    observations: ObservationSet,
    backend: Box<dyn NeighborSearch>,
    variogram: VariogramBinding,
    /// Binned data behind an in-repo fit, exposed for external plotting
    empirical: Option<EmpiricalVariogram>,
}

/// Ordinary-kriging predictor.
///
/// Starts unfitted; [`OrdinaryKriging::fit`] stores the observations,
/// builds the search backend and calibrates a variogram (unless one was
/// supplied up front). A later fit replaces the stored data wholesale.
pub struct OrdinaryKriging {
    config: KrigingConfig,
    supplied: Option<VariogramBinding>,
    state: Option<FittedState>,
}

impl OrdinaryKriging {
    /// Create an unfitted predictor with the given configuration.
    pub fn new(config: KrigingConfig) -> Self {
        Self {
            config,
            supplied: None,
            state: None,
        }
    }

    /// Supply a pre-fitted variogram binding; the in-repo fitting step is
    /// skipped at every subsequent [`OrdinaryKriging::fit`].
    pub fn with_variogram(mut self, binding: VariogramBinding) -> Self {
        self.supplied = Some(binding);
        self
    }

    pub fn config(&self) -> &KrigingConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// The active variogram binding, once fitted.
    pub fn variogram(&self) -> Option<&VariogramBinding> {
        self.state.as_ref().map(|s| &s.variogram)
    }

    /// The fitted observation set.
    pub fn observations(&self) -> Option<&ObservationSet> {
        self.state.as_ref().map(|s| &s.observations)
    }

    /// Binned empirical variogram behind an in-repo fit, for external
    /// rendering of the model curve against the data. `None` when the
    /// binding was supplied by the caller.
    pub fn empirical_variogram(&self) -> Option<&EmpiricalVariogram> {
        self.state.as_ref().and_then(|s| s.empirical.as_ref())
    }

    /// Fit the predictor on observed locations (N×F) and values (N).
    ///
    /// Stores the observation set, freezes the feature dimensionality,
    /// builds the configured neighbor-search backend, and calibrates a
    /// variogram from the data unless a binding was supplied.
    ///
    /// # Errors
    /// - [`Error::ShapeMismatch`] if N differs between the inputs
    /// - [`Error::Algorithm`] if the in-repo variogram fit fails
    pub fn fit(&mut self, locations: Array2<f64>, values: Array1<f64>) -> Result<()> {
        let observations = ObservationSet::new(locations, values)?;

        let (variogram, empirical) = match &self.supplied {
            Some(binding) => (binding.clone(), None),
            None => {
                let emp = empirical_variogram(
                    observations.locations(),
                    observations.values(),
                    self.config.metric,
                    &self.config.fit,
                )?;
                let fitted = fit_variogram(&emp, self.config.model)?;
                (fitted.binding, Some(emp))
            }
        };

        let backend = build_backend(
            self.config.backend,
            observations.locations(),
            self.config.metric,
        );

        debug!(
            n = observations.len(),
            features = observations.n_features(),
            model = variogram.model().name(),
            "fitted kriging predictor"
        );

        self.state = Some(FittedState {
            observations,
            backend,
            variogram,
            empirical,
        });
        Ok(())
    }

    /// Predict at a batch of query locations (M×F).
    ///
    /// Invalid input aborts the whole batch before any search or solve;
    /// a singular local system only marks its own query index in
    /// [`Prediction::singular`].
    ///
    /// # Errors
    /// - [`Error::NotFitted`] before any successful fit
    /// - [`Error::DimensionMismatch`] if the query feature count differs
    ///   from the fitted one
    /// - [`Error::InvalidNeighborCount`] if `n_neighbors` is 0
    /// - [`Error::InvalidRadius`] if `radius` is not positive
    pub fn predict(&self, query: ArrayView2<f64>, params: &PredictParams) -> Result<Prediction> {
        let state = self.state.as_ref().ok_or(Error::NotFitted)?;

        let n_features = state.observations.n_features();
        if query.ncols() != n_features {
            return Err(Error::DimensionMismatch {
                expected: n_features,
                actual: query.ncols(),
            });
        }
        if params.n_neighbors == 0 {
            return Err(Error::InvalidNeighborCount);
        }
        if !(params.radius > 0.0) {
            return Err(Error::InvalidRadius {
                radius: params.radius,
            });
        }

        let m = query.nrows();
        let k = params.n_neighbors.min(state.observations.len().max(1));
        let neighbors = state.backend.query(query, k);

        debug!(m, k, "solving local kriging systems");

        // Each query point is independent; only the fitted state is shared,
        // read-only. Collecting by index keeps the output order identical
        // to a sequential run.
        let solved: Vec<(f64, f64, bool)> = (0..m)
            .into_par_iter()
            .map(|i| {
                solve_point(
                    state,
                    self.config.nugget,
                    self.config.metric,
                    neighbors.distances.row(i).as_slice().unwrap_or(&[]),
                    neighbors.indices.row(i).as_slice().unwrap_or(&[]),
                    params.radius,
                )
            })
            .collect();

        let mut estimate = Array1::zeros(m);
        let mut variance = Array1::zeros(m);
        let mut singular = Vec::new();
        for (i, &(est, var, bad)) in solved.iter().enumerate() {
            estimate[i] = est;
            variance[i] = var;
            if bad {
                singular.push(i);
            }
        }

        Ok(Prediction {
            estimate,
            variance: params.compute_variance.then_some(variance),
            singular,
        })
    }

    /// Predict at a single query location, returning (estimate, variance).
    ///
    /// This is the scalar form: with F == 1 a one-element slice stands in
    /// for a scalar query. A singular system here surfaces as
    /// [`Error::SingularSystem`].
    pub fn predict_one(&self, point: &[f64], params: &PredictParams) -> Result<(f64, f64)> {
        let query = ArrayView2::from_shape((1, point.len()), point)
            .map_err(|e| Error::Algorithm(e.to_string()))?;
        let one = PredictParams {
            compute_variance: true,
            ..params.clone()
        };
        let out = self.predict(query, &one)?;
        if !out.singular.is_empty() {
            return Err(Error::SingularSystem { query: 0 });
        }
        let variance = out.variance.as_ref().map(|v| v[0]).unwrap_or(0.0);
        Ok((out.estimate[0], variance))
    }
}

/// Select the neighborhood and solve one local kriging system.
///
/// Returns (estimate, variance, singular). An empty neighborhood is the
/// defined default-output case (0, 0, false), not a failure.
fn solve_point(
    state: &FittedState,
    nugget: NuggetMode,
    metric: DistanceMetric,
    dist_row: &[f64],
    idx_row: &[usize],
    radius: f64,
) -> (f64, f64, bool) {
    // Radius filter is strict: kept neighbors satisfy d < radius. Padded
    // sentinel slots carry infinite distance and drop out here too.
    let mut dist = Vec::with_capacity(dist_row.len());
    let mut idx = Vec::with_capacity(idx_row.len());
    for (&d, &j) in dist_row.iter().zip(idx_row.iter()) {
        if j != NO_NEIGHBOR && d < radius {
            dist.push(d);
            idx.push(j);
        }
    }

    let n = idx.len();
    if n == 0 {
        return (0.0, 0.0, false);
    }

    let vario = &state.variogram;
    let mut a = Array2::zeros((n + 1, n + 1));
    let mut b = Array1::ones(n + 1);

    // γ(xᵢ, xⱼ) block, including the γ(0) diagonal
    let self_semivariance = vario.predict(0.0);
    for i in 0..n {
        a[[i, i]] = self_semivariance;
        for j in (i + 1)..n {
            let d = metric.distance(
                state.observations.location(idx[i]),
                state.observations.location(idx[j]),
            );
            let g = vario.predict(d);
            a[[i, j]] = g;
            a[[j, i]] = g;
        }
        // Unbiasedness constraint border
        a[[i, n]] = 1.0;
        a[[n, i]] = 1.0;
        b[i] = vario.predict(dist[i]);
    }
    // a[[n, n]] stays 0; b[n] stays 1

    if nugget == NuggetMode::ExcludedWithExactMatch {
        for i in 0..n {
            a[[i, i]] = 0.0;
            if dist[i] == 0.0 {
                b[i] = 0.0;
            }
        }
    }

    let weights = match solve_system(a, &b) {
        Some(w) => w,
        None => return (f64::NAN, f64::NAN, true),
    };

    let mut estimate = 0.0;
    for i in 0..n {
        estimate += weights[i] * state.observations.value(idx[i]);
    }
    // σ² = w · b includes the Lagrange term μ
    let variance = weights.dot(&b).max(0.0);

    (estimate, variance, false)
}

/// Solve Ax = b by Gaussian elimination with partial pivoting.
///
/// The Lagrange border makes the system indefinite, so no Cholesky here.
/// Sized for the small systems kriging produces (typically 5–20 unknowns).
/// Returns `None` when a pivot falls below [`PIVOT_EPS`].
fn solve_system(mut a: Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    let mut rhs = b.clone();

    for col in 0..n {
        let mut max_val = a[[col, col]].abs();
        let mut max_row = col;
        for row in (col + 1)..n {
            let val = a[[row, col]].abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if max_val < PIVOT_EPS {
            return None;
        }

        if max_row != col {
            for j in 0..n {
                a.swap([col, j], [max_row, j]);
            }
            rhs.swap(col, max_row);
        }

        let pivot = a[[col, col]];
        for row in (col + 1)..n {
            let factor = a[[row, col]] / pivot;
            if factor != 0.0 {
                a[[row, col]] = 0.0;
                for j in (col + 1)..n {
                    let head = a[[col, j]];
                    a[[row, j]] -= factor * head;
                }
                rhs[row] -= factor * rhs[col];
            }
        }
    }

    let mut x = Array1::zeros(n);
    for col in (0..n).rev() {
        let mut sum = rhs[col];
        for j in (col + 1)..n {
            sum -= a[[col, j]] * x[j];
        }
        x[col] = sum / a[[col, col]];
    }

    Some(x)
}
