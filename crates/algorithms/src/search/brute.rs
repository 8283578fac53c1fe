//! Brute-force neighbor search
//!
//! Exhaustive O(n) scan per query. Serves as the reference implementation
//! the k-d tree is checked against, and wins for very small observation
//! sets where tree construction is not worth it.

use krige_core::DistanceMetric;
use ndarray::{Array2, ArrayView1, ArrayView2};

use super::{fill_row, NeighborSearch, Neighbors};

/// Exhaustive-scan backend over a copy of the observation locations.
#[derive(Debug)]
pub struct BruteForce {
    points: Array2<f64>,
    metric: DistanceMetric,
}

impl BruteForce {
    pub fn new(points: ArrayView2<f64>, metric: DistanceMetric) -> Self {
        Self {
            points: points.to_owned(),
            metric,
        }
    }

    /// k nearest points to `query`, ascending by distance.
    pub fn k_nearest(&self, query: ArrayView1<f64>, k: usize) -> Vec<(f64, usize)> {
        let n = self.points.nrows();
        if n == 0 || k == 0 {
            return Vec::new();
        }

        let mut all: Vec<(f64, usize)> = (0..n)
            .map(|i| (self.metric.distance(self.points.row(i), query), i))
            .collect();

        let keep = k.min(n);
        if keep < n {
            all.select_nth_unstable_by(keep - 1, |a, b| {
                a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal)
            });
            all.truncate(keep);
        }
        all.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        all
    }
}

impl NeighborSearch for BruteForce {
    fn query(&self, query: ArrayView2<f64>, k: usize) -> Neighbors {
        let m = query.nrows();
        let mut distances = Array2::zeros((m, k));
        let mut indices = Array2::zeros((m, k));
        for row in 0..m {
            let found = self.k_nearest(query.row(row), k);
            fill_row(&found, &mut distances, &mut indices, row, k);
        }
        Neighbors { distances, indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_k_nearest_order() {
        let pts = array![[0.0], [10.0], [3.0], [7.0]];
        let brute = BruteForce::new(pts.view(), DistanceMetric::Euclidean);
        let found = brute.k_nearest(array![2.0].view(), 3);
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].1, 2); // 3.0 at distance 1
        assert_eq!(found[1].1, 0); // 0.0 at distance 2
        assert_eq!(found[2].1, 3); // 7.0 at distance 5
    }

    #[test]
    fn test_empty() {
        let brute = BruteForce::new(Array2::zeros((0, 1)).view(), DistanceMetric::Euclidean);
        assert!(brute.k_nearest(array![0.0].view(), 3).is_empty());
    }
}
