//! Flat serializable record of a fitted predictor
//!
//! Everything a fitted predictor needs to be rebuilt elsewhere: the
//! observation set, the calibrated variogram parameters, the metric and
//! the nugget policy. The record is plain data with serde derives; the
//! wire format is the caller's choice.

use krige_core::{DistanceMetric, Error, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::kriging::{KrigingConfig, NuggetMode, OrdinaryKriging};
use crate::variogram::{VariogramBinding, VariogramModel};

/// Persisted state of a fitted [`OrdinaryKriging`] predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrigingSnapshot {
    /// Observation locations, row per sample
    pub locations: Vec<Vec<f64>>,
    /// Observed values, index-aligned with `locations`
    pub values: Vec<f64>,
    /// Variogram model family name (see `VariogramModel::name`)
    pub model_name: String,
    /// Bound variogram parameter vector
    pub model_params: Vec<f64>,
    /// Distance metric in effect
    pub metric: DistanceMetric,
    /// Whether the nugget entered the kriging system
    pub nugget_enabled: bool,
}

impl KrigingSnapshot {
    /// Capture a fitted predictor's state.
    ///
    /// # Errors
    /// [`Error::NotFitted`] if the predictor has no fitted state.
    pub fn capture(predictor: &OrdinaryKriging) -> Result<Self> {
        let variogram = predictor.variogram().ok_or(Error::NotFitted)?;
        let observations = predictor.observations().ok_or(Error::NotFitted)?;

        Ok(Self {
            locations: observations
                .locations()
                .outer_iter()
                .map(|row| row.to_vec())
                .collect(),
            values: observations.values().to_vec(),
            model_name: variogram.model().name().to_string(),
            model_params: variogram.params().to_vec(),
            metric: predictor.config().metric,
            nugget_enabled: predictor.config().nugget == NuggetMode::Included,
        })
    }

    /// Rebuild a fitted predictor from this record.
    ///
    /// The search backend is not part of the record; the default is used
    /// unless `config` overrides come in through [`KrigingSnapshot::restore_with`].
    pub fn restore(self) -> Result<OrdinaryKriging> {
        let config = KrigingConfig::default();
        self.restore_with(config)
    }

    /// Rebuild with an explicit base configuration; the metric and nugget
    /// policy recorded in the snapshot always win.
    pub fn restore_with(self, config: KrigingConfig) -> Result<OrdinaryKriging> {
        let model = VariogramModel::from_name(&self.model_name).ok_or_else(|| {
            Error::Algorithm(format!("unknown variogram model '{}'", self.model_name))
        })?;
        let binding = VariogramBinding::new(model, self.model_params)?;

        let nugget = if self.nugget_enabled {
            NuggetMode::Included
        } else {
            NuggetMode::ExcludedWithExactMatch
        };
        let config = config.with_metric(self.metric).with_nugget(nugget);

        let n = self.locations.len();
        let f = self.locations.first().map(Vec::len).unwrap_or(0);
        let mut flat = Vec::with_capacity(n * f);
        for row in &self.locations {
            if row.len() != f {
                return Err(Error::Algorithm(
                    "ragged location rows in snapshot".into(),
                ));
            }
            flat.extend_from_slice(row);
        }
        let locations = Array2::from_shape_vec((n, f), flat)
            .map_err(|e| Error::Algorithm(e.to_string()))?;
        let values = Array1::from_vec(self.values);

        let mut predictor = OrdinaryKriging::new(config).with_variogram(binding);
        predictor.fit(locations, values)?;
        Ok(predictor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kriging::PredictParams;
    use ndarray::array;

    fn fitted() -> OrdinaryKriging {
        let binding =
            VariogramBinding::new(VariogramModel::Spherical, vec![4.0, 2.0, 0.0]).unwrap();
        let mut ok = OrdinaryKriging::new(KrigingConfig::default()).with_variogram(binding);
        ok.fit(
            array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
            array![1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();
        ok
    }

    #[test]
    fn test_capture_requires_fit() {
        let ok = OrdinaryKriging::new(KrigingConfig::default());
        assert!(matches!(
            KrigingSnapshot::capture(&ok).unwrap_err(),
            Error::NotFitted
        ));
    }

    #[test]
    fn test_round_trip_preserves_predictions() {
        let original = fitted();
        let snap = KrigingSnapshot::capture(&original).unwrap();

        // Through a serde wire format and back
        let json = serde_json::to_string(&snap).unwrap();
        let decoded: KrigingSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, snap);

        let restored = decoded.restore().unwrap();
        let params = PredictParams {
            n_neighbors: 4,
            radius: f64::INFINITY,
            compute_variance: true,
        };
        let q = array![[0.5, 0.5], [0.2, 0.8]];
        let a = original.predict(q.view(), &params).unwrap();
        let b = restored.predict(q.view(), &params).unwrap();
        for i in 0..2 {
            assert!((a.estimate[i] - b.estimate[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_restore_rejects_unknown_model() {
        let mut snap = KrigingSnapshot::capture(&fitted()).unwrap();
        snap.model_name = "matern".into();
        assert!(snap.restore().is_err());
    }

    #[test]
    fn test_restore_rejects_ragged_rows() {
        let mut snap = KrigingSnapshot::capture(&fitted()).unwrap();
        snap.locations[1] = vec![1.0];
        assert!(snap.restore().is_err());
    }
}
