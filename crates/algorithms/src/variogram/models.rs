//! Parametric variogram model family
//!
//! Pure semivariance functions of a parameter vector `m` and a separation
//! distance `d`. Every model is continuous where defined, non-decreasing
//! in `d` over its intended use range, and returns the nugget at `d = 0`.
//! Parameters are not validated here; a negative range or exponent is the
//! caller's responsibility.
//!
//! Reference:
//! Kitanidis, P.K. (1997). Introduction to Geostatistics: Applications in
//! Hydrogeology. Cambridge University Press.
//! Cressie, N. (1993). Statistics for Spatial Data. Wiley.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Theoretical variogram model family.
///
/// Parameter vector layout per model:
/// - `Linear`: `[slope, nugget]`
/// - `Power`: `[scale, exponent, nugget]`
/// - all others: `[psill, range, nugget]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VariogramModel {
    /// γ(d) = slope·d + nugget
    Linear,
    /// γ(d) = scale·d^exponent + nugget
    Power,
    /// γ(d) = psill·(1 - exp(-d²/((4/7)·range)²)) + nugget
    Gaussian,
    /// γ(d) = psill·(1 - exp(-d/range)) + nugget
    Exponential,
    /// γ(d) = psill·(3d/(2a) - d³/(2a³)) + nugget for d ≤ a; psill + nugget beyond
    #[default]
    Spherical,
    /// γ(d) = psill·(1 - (1 - d/(a/3))·exp(-d/(a/3))) + nugget
    HoleEffect,
    /// γ(d) = psill·(1 - (2/π)(acos(r) - r·√(1-r²))) + nugget, r = d/a ≤ 1
    Circular,
}

impl VariogramModel {
    /// Stable name used in serialized snapshots.
    pub fn name(&self) -> &'static str {
        match self {
            VariogramModel::Linear => "linear",
            VariogramModel::Power => "power",
            VariogramModel::Gaussian => "gaussian",
            VariogramModel::Exponential => "exponential",
            VariogramModel::Spherical => "spherical",
            VariogramModel::HoleEffect => "hole_effect",
            VariogramModel::Circular => "circular",
        }
    }

    /// Inverse of [`VariogramModel::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "linear" => Some(VariogramModel::Linear),
            "power" => Some(VariogramModel::Power),
            "gaussian" => Some(VariogramModel::Gaussian),
            "exponential" => Some(VariogramModel::Exponential),
            "spherical" => Some(VariogramModel::Spherical),
            "hole_effect" => Some(VariogramModel::HoleEffect),
            "circular" => Some(VariogramModel::Circular),
            _ => None,
        }
    }

    /// Length of the parameter vector this model expects.
    pub fn param_count(&self) -> usize {
        match self {
            VariogramModel::Linear => 2,
            _ => 3,
        }
    }

    /// The nugget is always the last parameter.
    pub fn nugget(&self, m: &[f64]) -> f64 {
        m[self.param_count() - 1]
    }

    /// Modeled semivariance at distance `d` for parameter vector `m`.
    pub fn evaluate(&self, m: &[f64], d: f64) -> f64 {
        match self {
            VariogramModel::Linear => m[0] * d + m[1],
            VariogramModel::Power => m[0] * d.powf(m[1]) + m[2],
            VariogramModel::Gaussian => {
                let scaled = m[1] * 4.0 / 7.0;
                m[0] * (1.0 - (-(d * d) / (scaled * scaled)).exp()) + m[2]
            }
            VariogramModel::Exponential => m[0] * (1.0 - (-d / m[1]).exp()) + m[2],
            VariogramModel::Spherical => {
                let (psill, range, nugget) = (m[0], m[1], m[2]);
                if d > range {
                    psill + nugget
                } else {
                    psill * ((3.0 * d) / (2.0 * range) - d.powi(3) / (2.0 * range.powi(3)))
                        + nugget
                }
            }
            VariogramModel::HoleEffect => {
                let third = m[1] / 3.0;
                m[0] * (1.0 - (1.0 - d / third) * (-d / third).exp()) + m[2]
            }
            VariogramModel::Circular => {
                let (psill, range, nugget) = (m[0], m[1], m[2]);
                if d > range {
                    psill + nugget
                } else {
                    // Clamp keeps acos/sqrt in-domain when d/range rounds
                    // just past 1.
                    let r = (d / range).clamp(0.0, 1.0);
                    let ramp = std::f64::consts::FRAC_2_PI
                        * (r.acos() - r * (1.0 - r * r).sqrt());
                    psill * (1.0 - ramp) + nugget
                }
            }
        }
    }

    /// Vectorized [`VariogramModel::evaluate`] over an array of distances.
    pub fn evaluate_batch(&self, m: &[f64], d: ArrayView1<f64>) -> Array1<f64> {
        d.mapv(|h| self.evaluate(m, h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const SILL_MODELS: [VariogramModel; 5] = [
        VariogramModel::Gaussian,
        VariogramModel::Exponential,
        VariogramModel::Spherical,
        VariogramModel::HoleEffect,
        VariogramModel::Circular,
    ];

    #[test]
    fn test_nugget_at_zero_distance() {
        for model in SILL_MODELS {
            let m = [10.0, 5.0, 1.5];
            let at_zero = model.evaluate(&m, 0.0);
            assert!(
                (at_zero - 1.5).abs() < 1e-12,
                "{}: γ(0) should equal nugget, got {at_zero}",
                model.name()
            );
        }
        assert!((VariogramModel::Linear.evaluate(&[2.0, 0.7], 0.0) - 0.7).abs() < 1e-12);
        assert!((VariogramModel::Power.evaluate(&[2.0, 1.5, 0.7], 0.0) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_sill_plateau() {
        // Spherical and circular hit psill + nugget exactly at the range;
        // gaussian and exponential approach it asymptotically.
        let m = [10.0, 5.0, 1.5];
        for model in [VariogramModel::Spherical, VariogramModel::Circular] {
            for d in [5.0, 7.5, 100.0] {
                let v = model.evaluate(&m, d);
                assert!(
                    (v - 11.5).abs() < 1e-10,
                    "{} at d={d}: expected sill 11.5, got {v}",
                    model.name()
                );
            }
        }
        for model in [VariogramModel::Gaussian, VariogramModel::Exponential] {
            let far = model.evaluate(&m, 500.0);
            assert!(
                (far - 11.5).abs() < 1e-6,
                "{} far field: expected ~11.5, got {far}",
                model.name()
            );
        }
    }

    #[test]
    fn test_monotone_non_decreasing() {
        // Hole effect is excluded: it overshoots the sill and dips back by
        // construction.
        let m = [10.0, 5.0, 0.0];
        for model in [
            VariogramModel::Gaussian,
            VariogramModel::Exponential,
            VariogramModel::Spherical,
            VariogramModel::Circular,
        ] {
            let mut prev = model.evaluate(&m, 0.0);
            let mut d = 0.0;
            while d < 10.0 {
                d += 0.05;
                let v = model.evaluate(&m, d);
                assert!(
                    v >= prev - 1e-9,
                    "{} not monotone at d={d}: {v} < {prev}",
                    model.name()
                );
                prev = v;
            }
        }
    }

    #[test]
    fn test_hole_effect_rises_from_nugget() {
        let m = [10.0, 6.0, 0.5];
        let near = VariogramModel::HoleEffect.evaluate(&m, 0.1);
        assert!(near > 0.5, "should rise above the nugget, got {near}");
        // Far field settles back toward psill + nugget
        let far = VariogramModel::HoleEffect.evaluate(&m, 600.0);
        assert!((far - 10.5).abs() < 1e-6, "far field: {far}");
    }

    #[test]
    fn test_linear_model() {
        let m = [2.0, 1.0];
        assert!((VariogramModel::Linear.evaluate(&m, 3.0) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_power_model() {
        let m = [3.0, 2.0, 1.0];
        assert!((VariogramModel::Power.evaluate(&m, 2.0) - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_circular_in_domain_near_range() {
        // The ratio d/range may land a ULP above 1.0; the result must stay
        // finite and at the sill.
        let m = [10.0, 3.0, 0.0];
        let v = VariogramModel::Circular.evaluate(&m, 3.0 * (1.0 - 1e-16));
        assert!(v.is_finite());
        assert!((v - 10.0).abs() < 1e-6, "at range: {v}");
    }

    #[test]
    fn test_evaluate_batch_matches_scalar() {
        let m = [4.0, 2.0, 0.5];
        let d = array![0.0, 0.5, 1.0, 2.0, 4.0];
        for model in SILL_MODELS {
            let batch = model.evaluate_batch(&m, d.view());
            assert_eq!(batch.len(), d.len());
            for (i, &h) in d.iter().enumerate() {
                assert_eq!(batch[i], model.evaluate(&m, h));
            }
        }
    }

    #[test]
    fn test_name_round_trip() {
        for model in [
            VariogramModel::Linear,
            VariogramModel::Power,
            VariogramModel::Gaussian,
            VariogramModel::Exponential,
            VariogramModel::Spherical,
            VariogramModel::HoleEffect,
            VariogramModel::Circular,
        ] {
            assert_eq!(VariogramModel::from_name(model.name()), Some(model));
        }
        assert_eq!(VariogramModel::from_name("matern"), None);
    }
}
