//! F-dimensional k-d tree for neighbor search
//!
//! Median-split binary tree cycling the split axis by depth. Queries prune
//! a subtree when the per-axis distance to its splitting plane already
//! exceeds the current k-th best distance; that bound is valid for both
//! Euclidean and Manhattan metrics, since a single-axis difference never
//! exceeds either full distance.
//!
//! Reference:
//! Bentley, J.L. (1975). Multidimensional binary search trees used for
//! associative searching. CACM, 18(9).

use krige_core::DistanceMetric;
use ndarray::{Array2, ArrayView1, ArrayView2};

use super::{fill_row, NeighborSearch, Neighbors};

/// A k-d tree over N observation locations of F features each.
#[derive(Debug)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    points: Array2<f64>,
    metric: DistanceMetric,
}

#[derive(Debug)]
struct KdNode {
    /// Row index into `points`
    point_idx: usize,
    /// Split axis, cycles 0..F by depth
    split_dim: usize,
    left: Option<usize>,
    right: Option<usize>,
}

impl KdTree {
    /// Build a tree over a copy of `points`. O(n log² n) construction.
    pub fn build(points: ArrayView2<f64>, metric: DistanceMetric) -> Self {
        let stored = points.to_owned();
        let mut nodes = Vec::with_capacity(stored.nrows());
        if stored.nrows() > 0 {
            let mut indices: Vec<usize> = (0..stored.nrows()).collect();
            build_recursive(&stored, &mut indices, 0, &mut nodes);
        }
        Self {
            nodes,
            points: stored,
            metric,
        }
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    /// Whether the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    /// k nearest points to `query`, ascending by distance.
    pub fn k_nearest(&self, query: ArrayView1<f64>, k: usize) -> Vec<(f64, usize)> {
        if self.nodes.is_empty() || k == 0 {
            return Vec::new();
        }

        // Bounded worst-first list: kept sorted descending, so the entry
        // at index 0 is the current k-th best.
        let mut heap: Vec<(f64, usize)> = Vec::with_capacity(k + 1);
        self.knn_recursive(0, query, k, &mut heap);

        heap.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        heap
    }

    fn knn_recursive(
        &self,
        node_idx: usize,
        query: ArrayView1<f64>,
        k: usize,
        heap: &mut Vec<(f64, usize)>,
    ) {
        let node = &self.nodes[node_idx];
        let point = self.points.row(node.point_idx);
        let dist = self.metric.distance(point, query);

        let worst = if heap.len() >= k { heap[0].0 } else { f64::MAX };
        if dist < worst || heap.len() < k {
            if heap.len() >= k {
                heap.remove(0);
            }
            let pos = heap
                .binary_search_by(|probe| {
                    probe
                        .0
                        .partial_cmp(&dist)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .reverse()
                })
                .unwrap_or_else(|e| e);
            heap.insert(pos, (dist, node.point_idx));
        }

        let diff = query[node.split_dim] - point[node.split_dim];
        let (first, second) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(child) = first {
            self.knn_recursive(child, query, k, heap);
        }

        let threshold = if heap.len() >= k { heap[0].0 } else { f64::MAX };
        if diff.abs() < threshold {
            if let Some(child) = second {
                self.knn_recursive(child, query, k, heap);
            }
        }
    }
}

impl NeighborSearch for KdTree {
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

fn build_recursive(
    points: &Array2<f64>,
    indices: &mut [usize],
    depth: usize,
    nodes: &mut Vec<KdNode>,
) -> usize {
    let n = indices.len();
    let split_dim = depth % points.ncols().max(1);

    indices.sort_by(|&a, &b| {
        points[[a, split_dim]]
            .partial_cmp(&points[[b, split_dim]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let median = n / 2;
    let point_idx = indices[median];

    let node_idx = nodes.len();
    nodes.push(KdNode {
        point_idx,
        split_dim,
        left: None,
        right: None,
    });

    if median > 0 {
        let mut left_indices = indices[..median].to_vec();
        let left_idx = build_recursive(points, &mut left_indices, depth + 1, nodes);
        nodes[node_idx].left = Some(left_idx);
    }

    if median + 1 < n {
        let mut right_indices = indices[median + 1..].to_vec();
        let right_idx = build_recursive(points, &mut right_indices, depth + 1, nodes);
        nodes[node_idx].right = Some(right_idx);
    }

    node_idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn grid_points(n: usize) -> Array2<f64> {
        let mut pts = Array2::zeros((n, 3));
        for i in 0..n {
            pts[[i, 0]] = ((i * 7 + 13) % 100) as f64;
            pts[[i, 1]] = ((i * 11 + 37) % 100) as f64;
            pts[[i, 2]] = ((i * 5 + 3) % 50) as f64;
        }
        pts
    }

    fn brute_k_nearest(
        pts: &Array2<f64>,
        query: ArrayView1<f64>,
        k: usize,
        metric: DistanceMetric,
    ) -> Vec<(f64, usize)> {
        let mut all: Vec<(f64, usize)> = (0..pts.nrows())
            .map(|i| (metric.distance(pts.row(i), query), i))
            .collect();
        all.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        all.truncate(k);
        all
    }

    #[test]
    fn test_empty_tree() {
        let tree = KdTree::build(Array2::zeros((0, 2)).view(), DistanceMetric::Euclidean);
        assert!(tree.is_empty());
        assert!(tree.k_nearest(array![0.0, 0.0].view(), 3).is_empty());
    }

    #[test]
    fn test_single_point() {
        let pts = array![[3.0, 4.0]];
        let tree = KdTree::build(pts.view(), DistanceMetric::Euclidean);
        assert_eq!(tree.len(), 1);
        let found = tree.k_nearest(array![0.0, 0.0].view(), 5);
        assert_eq!(found.len(), 1);
        assert!((found[0].0 - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_exact_hit_has_zero_distance() {
        let pts = array![[2.0, 3.0], [5.0, 4.0], [9.0, 6.0]];
        let tree = KdTree::build(pts.view(), DistanceMetric::Euclidean);
        let found = tree.k_nearest(array![5.0, 4.0].view(), 1);
        assert_eq!(found[0].1, 1);
        assert!(found[0].0 < 1e-12);
    }

    #[test]
    fn test_matches_brute_force_3d() {
        let pts = grid_points(300);
        for metric in [DistanceMetric::Euclidean, DistanceMetric::Manhattan] {
            let tree = KdTree::build(pts.view(), metric);
            for q in 0..20 {
                let query = array![(q * 13 % 100) as f64, (q * 29 % 100) as f64, (q * 3 % 50) as f64];
                let got = tree.k_nearest(query.view(), 7);
                let want = brute_k_nearest(&pts, query.view(), 7, metric);
                assert_eq!(got.len(), 7);
                for (slot, (g, w)) in got.iter().zip(want.iter()).enumerate() {
                    assert!(
                        (g.0 - w.0).abs() < 1e-10,
                        "{metric:?} q={q} slot={slot}: {} vs {}",
                        g.0,
                        w.0
                    );
                }
            }
        }
    }

    #[test]
    fn test_results_sorted_ascending() {
        let pts = grid_points(100);
        let tree = KdTree::build(pts.view(), DistanceMetric::Manhattan);
        let found = tree.k_nearest(array![50.0, 50.0, 25.0].view(), 10);
        for pair in found.windows(2) {
            assert!(pair[0].0 <= pair[1].0);
        }
    }

    #[test]
    fn test_duplicate_points() {
        let pts = array![[1.0, 1.0], [1.0, 1.0], [2.0, 2.0]];
        let tree = KdTree::build(pts.view(), DistanceMetric::Euclidean);
        let found = tree.k_nearest(array![1.0, 1.0].view(), 2);
        assert_eq!(found.len(), 2);
        assert!(found[0].0 < 1e-12);
        assert!(found[1].0 < 1e-12);
    }
}
