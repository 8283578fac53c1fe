//! Empirical variogram computation and model fitting
//!
//! Computes the experimental variogram from observed locations and values,
//! then calibrates a parametric model against it by pair-count-weighted
//! least squares. This is the fitting collaborator the kriging predictor
//! delegates to when no pre-fitted binding is supplied.
//!
//! The semivariance γ(h) measures spatial dissimilarity as a function of
//! separation distance h:
//! ```text
//! γ(h) = (1/2N(h)) Σ [z(xᵢ) - z(xⱼ)]²   for all pairs in the lag bin of h
//! ```
//!
//! Reference:
//! Matheron, G. (1963). Principles of geostatistics. Economic Geology.
//! Cressie, N. (1985). Fitting variogram models by weighted least squares.

use krige_core::{DistanceMetric, Error, Result};
use ndarray::{ArrayView1, ArrayView2};
use tracing::debug;

use super::models::VariogramModel;
use super::VariogramBinding;

/// Controls for empirical variogram binning.
#[derive(Debug, Clone)]
pub struct VariogramFitParams {
    /// Number of lag bins when `lag_width` is not given (default 15)
    pub n_lags: usize,
    /// Maximum lag distance. `None` auto-computes half the maximum
    /// pairwise distance.
    pub max_lag: Option<f64>,
    /// Explicit lag bin width. Overrides `n_lags` when set.
    pub lag_width: Option<f64>,
}

impl Default for VariogramFitParams {
    fn default() -> Self {
        Self {
            n_lags: 15,
            max_lag: None,
            lag_width: None,
        }
    }
}

/// Empirical variogram: semivariance values at discrete lag distances.
///
/// Exposed by the fitted predictor so the model curve can be drawn
/// externally against the binned data.
#[derive(Debug, Clone)]
pub struct EmpiricalVariogram {
    /// Lag distances (bin centers)
    pub lags: Vec<f64>,
    /// Semivariance γ(h) per lag; NaN for bins with no pairs
    pub semivariance: Vec<f64>,
    /// Number of point pairs contributing to each lag bin
    pub pair_counts: Vec<usize>,
}

/// A model calibrated against an empirical variogram.
#[derive(Debug, Clone)]
pub struct FittedVariogram {
    /// The calibrated semivariance function
    pub binding: VariogramBinding,
    /// Weighted residual sum of squares from fitting (lower = better)
    pub rss: f64,
}

/// Compute the empirical variogram from observations.
///
/// Pairwise distances use `metric`, the same metric the kriging predictor
/// applies at query time.
///
/// # Errors
/// - Fewer than 2 observations
/// - Non-positive maximum lag (coincident data with no `max_lag` override)
pub fn empirical_variogram(
    locations: ArrayView2<f64>,
    values: ArrayView1<f64>,
    metric: DistanceMetric,
    params: &VariogramFitParams,
) -> Result<EmpiricalVariogram> {
    let n = locations.nrows();
    if n < 2 {
        return Err(Error::Algorithm(
            "need at least 2 observations for a variogram".into(),
        ));
    }

    let max_lag = match params.max_lag {
        Some(m) => m,
        None => {
            let mut max_dist = 0.0_f64;
            for i in 0..n {
                for j in (i + 1)..n {
                    let d = metric.distance(locations.row(i), locations.row(j));
                    if d > max_dist {
                        max_dist = d;
                    }
                }
            }
            // Convention: max lag = half of max pairwise distance
            max_dist / 2.0
        }
    };

    if max_lag <= 0.0 {
        return Err(Error::Algorithm("max lag must be positive".into()));
    }

    let (bin_width, n_bins) = match params.lag_width {
        Some(w) if w > 0.0 => (w, (max_lag / w).ceil() as usize),
        Some(_) => return Err(Error::Algorithm("lag width must be positive".into())),
        None => (max_lag / params.n_lags as f64, params.n_lags),
    };
    if n_bins == 0 {
        return Err(Error::Algorithm("lag width exceeds max lag".into()));
    }

    let lags: Vec<f64> = (0..n_bins).map(|k| (k as f64 + 0.5) * bin_width).collect();
    let mut semivariance = vec![0.0_f64; n_bins];
    let mut pair_counts = vec![0_usize; n_bins];

    for i in 0..n {
        for j in (i + 1)..n {
            let d = metric.distance(locations.row(i), locations.row(j));
            if d > max_lag {
                continue;
            }
            let bin = ((d / bin_width) as usize).min(n_bins - 1);
            let dz = values[i] - values[j];
            semivariance[bin] += dz * dz;
            pair_counts[bin] += 1;
        }
    }

    // Average: γ(h) = (1/2N) Σ (zᵢ - zⱼ)²
    for k in 0..n_bins {
        if pair_counts[k] > 0 {
            semivariance[k] /= 2.0 * pair_counts[k] as f64;
        } else {
            semivariance[k] = f64::NAN;
        }
    }

    Ok(EmpiricalVariogram {
        lags,
        semivariance,
        pair_counts,
    })
}

/// Fit a parametric model to an empirical variogram.
///
/// Uses pair-count-weighted least squares. The linear model has a closed
/// form; the other families are calibrated by a grid search over their
/// parameter space, which is robust on the small, noisy bin counts this
/// sees in practice.
///
/// # Errors
/// - Fewer than 3 valid lag bins
/// - All semivariance values zero (constant field)
pub fn fit_variogram(
    empirical: &EmpiricalVariogram,
    model: VariogramModel,
) -> Result<FittedVariogram> {
    let valid: Vec<(f64, f64, f64)> = empirical
        .lags
        .iter()
        .zip(empirical.semivariance.iter())
        .zip(empirical.pair_counts.iter())
        .filter(|((_, sv), cnt)| !sv.is_nan() && **cnt > 0)
        .map(|((&lag, &sv), &cnt)| (lag, sv, cnt as f64))
        .collect();

    if valid.len() < 3 {
        return Err(Error::Algorithm(
            "need at least 3 valid lag bins to fit a variogram".into(),
        ));
    }

    let max_lag = valid.last().map(|(l, _, _)| *l).unwrap_or(1.0);
    let max_sv = valid.iter().map(|(_, sv, _)| *sv).fold(0.0_f64, f64::max);
    if max_sv <= 0.0 {
        return Err(Error::Algorithm("all semivariance values are zero".into()));
    }

    let (params, rss) = match model {
        VariogramModel::Linear => fit_linear_wls(&valid),
        VariogramModel::Power => fit_power_grid(&valid, max_lag, max_sv, model),
        _ => fit_sill_grid(&valid, max_lag, max_sv, model),
    };

    debug!(
        model = model.name(),
        rss,
        "fitted variogram model"
    );

    Ok(FittedVariogram {
        binding: VariogramBinding::new(model, params)?,
        rss,
    })
}

fn weighted_rss(valid: &[(f64, f64, f64)], model: VariogramModel, params: &[f64]) -> f64 {
    valid
        .iter()
        .map(|&(lag, sv, w)| {
            let residual = sv - model.evaluate(params, lag);
            w * residual * residual
        })
        .sum()
}

/// Closed-form weighted least squares for γ(h) = slope·h + nugget.
fn fit_linear_wls(valid: &[(f64, f64, f64)]) -> (Vec<f64>, f64) {
    let (mut sw, mut swl, mut swll, mut swv, mut swlv) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for &(lag, sv, w) in valid {
        sw += w;
        swl += w * lag;
        swll += w * lag * lag;
        swv += w * sv;
        swlv += w * lag * sv;
    }

    let det = sw * swll - swl * swl;
    let (mut slope, mut nugget) = if det.abs() > 1e-30 {
        (
            (sw * swlv - swl * swv) / det,
            (swll * swv - swl * swlv) / det,
        )
    } else {
        (0.0, swv / sw)
    };

    // A negative nugget is not meaningful; pin it and re-solve the slope.
    if nugget < 0.0 {
        nugget = 0.0;
        slope = if swll > 0.0 { swlv / swll } else { 0.0 };
    }
    if slope < 0.0 {
        slope = 0.0;
        nugget = swv / sw;
    }

    let params = vec![slope, nugget];
    let rss = weighted_rss(valid, VariogramModel::Linear, &params);
    (params, rss)
}

/// Grid search over (psill, range, nugget) for the sill-bounded families.
fn fit_sill_grid(
    valid: &[(f64, f64, f64)],
    max_lag: f64,
    max_sv: f64,
    model: VariogramModel,
) -> (Vec<f64>, f64) {
    let n_nugget = 10;
    let n_sill = 10;
    let n_range = 20;

    let mut best_rss = f64::MAX;
    let mut best = vec![max_sv, max_lag, 0.0];

    for in_ in 0..=n_nugget {
        let nugget = max_sv * in_ as f64 / (2.0 * n_nugget as f64);
        for is in 1..=n_sill {
            let sill = max_sv * is as f64 / n_sill as f64;
            if sill <= nugget {
                continue;
            }
            for ir in 1..=n_range {
                let range = max_lag * 2.0 * ir as f64 / n_range as f64;
                let trial = [sill - nugget, range, nugget];
                let rss = weighted_rss(valid, model, &trial);
                if rss < best_rss {
                    best_rss = rss;
                    best = trial.to_vec();
                }
            }
        }
    }

    (best, best_rss)
}

/// Grid search over (scale, exponent, nugget) for the power model.
fn fit_power_grid(
    valid: &[(f64, f64, f64)],
    max_lag: f64,
    max_sv: f64,
    model: VariogramModel,
) -> (Vec<f64>, f64) {
    let n_nugget = 10;
    let n_scale = 20;

    let mut best_rss = f64::MAX;
    let mut best = vec![max_sv / max_lag, 1.0, 0.0];

    for ie in 1..20 {
        // Exponent constrained to (0, 2): the power variogram is only
        // conditionally negative definite on that interval.
        let exponent = ie as f64 * 0.1;
        let reach = max_lag.powf(exponent);
        for in_ in 0..=n_nugget {
            let nugget = max_sv * in_ as f64 / (2.0 * n_nugget as f64);
            for isc in 1..=n_scale {
                let scale = 2.0 * max_sv * isc as f64 / (n_scale as f64 * reach);
                let trial = [scale, exponent, nugget];
                let rss = weighted_rss(valid, model, &trial);
                if rss < best_rss {
                    best_rss = rss;
                    best = trial.to_vec();
                }
            }
        }
    }

    (best, best_rss)
}
