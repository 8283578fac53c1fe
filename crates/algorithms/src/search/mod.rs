//! Neighbor-search backends
//!
//! Both backends answer the same query contract: for M query points,
//! return the up-to-k nearest observation indices and their distances
//! under the configured metric, as M×k matrices. Rows with fewer than k
//! matches are padded with [`NO_NEIGHBOR`] / `f64::INFINITY`; the caller
//! must tolerate partially filled rows.
//!
//! The concrete backend is selected at construction via [`SearchBackend`],
//! not by string keys threaded through the predictor.

pub mod brute;
pub mod kdtree;

pub use brute::BruteForce;
pub use kdtree::KdTree;

use krige_core::DistanceMetric;
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Sentinel index for an unmatched neighbor slot.
pub const NO_NEIGHBOR: usize = usize::MAX;

/// Which neighbor-search data structure the predictor builds at fit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchBackend {
    /// Median-split k-d tree, O(log n) queries
    #[default]
    KdTree,
    /// Exhaustive scan, O(n) queries; useful as a reference and for tiny N
    BruteForce,
}

/// Result of a k-nearest query batch.
#[derive(Debug, Clone)]
pub struct Neighbors {
    /// M×k distances, ascending per row, `f64::INFINITY` in padded slots
    pub distances: Array2<f64>,
    /// M×k observation indices, [`NO_NEIGHBOR`] in padded slots
    pub indices: Array2<usize>,
}

/// Common query contract for the search backends.
pub trait NeighborSearch: Send + Sync {
    /// k-nearest observations for each row of `query`.
    fn query(&self, query: ArrayView2<f64>, k: usize) -> Neighbors;
}

/// Build the configured backend over a copy of the observation locations.
pub fn build_backend(
    kind: SearchBackend,
    locations: ArrayView2<f64>,
    metric: DistanceMetric,
) -> Box<dyn NeighborSearch> {
    match kind {
        SearchBackend::KdTree => Box::new(KdTree::build(locations, metric)),
        SearchBackend::BruteForce => Box::new(BruteForce::new(locations, metric)),
    }
}

/// Gather (distance, index) pairs into padded output rows.
pub(crate) fn fill_row(
    neighbors: &[(f64, usize)],
    distances: &mut Array2<f64>,
    indices: &mut Array2<usize>,
    row: usize,
    k: usize,
) {
    for slot in 0..k {
        if let Some(&(d, i)) = neighbors.get(slot) {
            distances[[row, slot]] = d;
            indices[[row, slot]] = i;
        } else {
            distances[[row, slot]] = f64::INFINITY;
            indices[[row, slot]] = NO_NEIGHBOR;
        }
    }
}
