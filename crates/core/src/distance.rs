//! Distance metrics for neighbor search and variogram computation
//!
//! The same metric must be applied to neighbor search, intra-neighborhood
//! pairwise distances, and empirical variogram binning, otherwise the
//! semivariances fed into the kriging system are inconsistent with the
//! neighborhood that produced them.

use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Distance metric applied consistently across the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Straight-line (L2) distance
    #[default]
    Euclidean,
    /// City-block (L1) distance
    Manhattan,
}

impl DistanceMetric {
    /// Distance between two feature vectors.
    ///
    /// Both vectors must have the same length; mismatched lengths are a
    /// caller bug and are not checked here.
    #[inline]
    pub fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match self {
            DistanceMetric::Euclidean => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt(),
            DistanceMetric::Manhattan => {
                a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
            }
        }
    }

    /// Symmetric pairwise distance matrix between the rows of `points`.
    pub fn pairwise(&self, points: ArrayView2<f64>) -> Array2<f64> {
        let n = points.nrows();
        let mut out = Array2::zeros((n, n));
        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.distance(points.row(i), points.row(j));
                out[[i, j]] = d;
                out[[j, i]] = d;
            }
        }
        out
    }
}
