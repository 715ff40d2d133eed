//! Merging coincident nodes of independently generated blocks
//!
//! Nodes are compared in index order. A boundary node becomes a duplicate of the
//! **first** earlier boundary node closer than the tolerance, and interior nodes are never
//! merged. Both strategies give the same map; the spatial hash only avoids comparing
//! every pair of boundary nodes.

use crate::prelude::*;

use std::collections::HashMap;

/// How candidate pairs of coincident nodes are found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeldStrategy {
    /// compare every boundary node with every earlier one, O(B^2) for B boundary nodes
    Exhaustive,
    /// bucket the boundary nodes on a grid with the tolerance as edge length and only
    /// compare against the 27 surrounding buckets
    #[default]
    SpatialHash,
}

/// Distance below which two nodes are the same node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeldTolerance {
    /// `factor * max(outer_radius, 1)`
    ///
    /// Welding happens on the unit sphere, where block nodes that should coincide are
    /// only a few ulps apart whatever the outer radius. Below an outer radius of 1 the
    /// distance is therefore not scaled down further, so a small shell still welds.
    Relative(f64),
    /// a fixed distance on the unit sphere
    Absolute(f64),
}

impl Default for WeldTolerance {
    fn default() -> Self {
        Self::Relative(1e-12)
    }
}

impl WeldTolerance {
    /// the weld distance for a shell with the given outer radius
    pub fn resolve(&self, outer_radius: f64) -> Result<f64, MeshError> {
        let eps = match *self {
            Self::Relative(factor) => factor * outer_radius.max(1.),
            Self::Absolute(eps) => eps,
        };

        if eps.is_finite() && eps > 0. {
            Ok(eps)
        } else {
            Err(MeshError::WeldTolerance(eps))
        }
    }
}

/// Result of welding a node set
#[derive(Debug, Clone, PartialEq)]
pub struct WeldMap {
    points_to: Vec<usize>,
    compact: Vec<Option<usize>>,
    resolved: Vec<usize>,
    num_unique: usize,
}

impl WeldMap {
    fn from_points_to(points_to: Vec<usize>) -> Self {
        let mut compact = Vec::with_capacity(points_to.len());
        let mut resolved = Vec::with_capacity(points_to.len());
        let mut num_unique = 0;

        for (node, &target) in points_to.iter().enumerate() {
            if target == node {
                compact.push(Some(num_unique));
                resolved.push(num_unique);
                num_unique += 1;
            } else {
                debug_assert!(target < node);
                compact.push(None);
                // targets are always earlier, so they are resolved already
                resolved.push(resolved[target]);
            }
        }

        Self {
            points_to,
            compact,
            resolved,
            num_unique,
        }
    }

    /// index of the earlier node each node was merged into (itself if it was kept)
    pub fn points_to(&self) -> &[usize] {
        &self.points_to
    }

    /// dense index of every kept node, `None` for duplicates
    pub fn compact(&self) -> &[Option<usize>] {
        &self.compact
    }

    /// the final index of `node` after welding
    pub fn resolve(&self, node: usize) -> usize {
        self.resolved[node]
    }

    pub fn num_unique(&self) -> usize {
        self.num_unique
    }

    pub fn num_duplicates(&self) -> usize {
        self.points_to.len() - self.num_unique
    }

    /// true if nothing was merged
    pub fn is_identity(&self) -> bool {
        self.num_duplicates() == 0
    }

    /// the rows of `points` that survive welding, in order
    pub fn compact_points(&self, points: ArrayView2<f64>) -> Array2<f64> {
        let kept: Vec<usize> = self
            .compact
            .iter()
            .enumerate()
            .filter_map(|(node, slot)| slot.map(|_| node))
            .collect();

        points.select(Axis(0), &kept)
    }

    /// rewrite every cell of `connectivity` to final node indices
    pub fn rewrite(&self, connectivity: ArrayView2<usize>) -> Array2<usize> {
        connectivity.mapv(|node| self.resolve(node))
    }
}

/// Weld the nodes in the rows of `points`
///
/// Only nodes flagged in `boundary` are considered for merging.
#[tracing::instrument(level = "debug", skip(points, boundary))]
pub fn weld(
    points: ArrayView2<f64>,
    boundary: &[bool],
    eps: f64,
    strategy: WeldStrategy,
) -> WeldMap {
    debug_assert_eq!(points.nrows(), boundary.len());

    let strategy = match strategy {
        WeldStrategy::SpatialHash if !bucket_indices_fit(points, eps) => {
            tracing::debug!(eps, "tolerance too fine for bucketing, comparing all pairs");
            WeldStrategy::Exhaustive
        }
        other => other,
    };

    let points_to = match strategy {
        WeldStrategy::Exhaustive => exhaustive(points, boundary, eps),
        WeldStrategy::SpatialHash => spatial_hash(points, boundary, eps),
    };

    let map = WeldMap::from_points_to(points_to);

    tracing::debug!(
        nodes = points.nrows(),
        duplicates = map.num_duplicates(),
        "welded nodes"
    );

    map
}

/// euclidean distance between two rows of `points`
fn gap(points: ArrayView2<f64>, a: usize, b: usize) -> f64 {
    points
        .row(a)
        .iter()
        .zip(points.row(b))
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

fn exhaustive(points: ArrayView2<f64>, boundary: &[bool], eps: f64) -> Vec<usize> {
    let mut points_to: Vec<usize> = (0..points.nrows()).collect();
    let mut earlier: Vec<usize> = Vec::new();

    for node in (0..points.nrows()).filter(|&node| boundary[node]) {
        let first_match = earlier
            .iter()
            .copied()
            .find(|&other| gap(points, node, other) < eps);

        if let Some(other) = first_match {
            points_to[node] = other;
        }

        earlier.push(node);
    }

    points_to
}

type Bucket = [i64; 3];

/// largest `|coordinate| / eps` for which bucket indices are exact integers and their
/// neighbours stay inside `i64`
const MAX_BUCKET_INDEX: f64 = 4_503_599_627_370_496.; // 2^52

fn bucket_indices_fit(points: ArrayView2<f64>, eps: f64) -> bool {
    let largest = points.iter().fold(0f64, |acc, x| acc.max(x.abs()));
    largest / eps < MAX_BUCKET_INDEX
}

fn bucket_of(point: ArrayView1<f64>, eps: f64) -> Bucket {
    let mut bucket = [0; 3];
    bucket
        .iter_mut()
        .zip(point)
        .for_each(|(slot, x)| *slot = (x / eps).floor() as i64);
    bucket
}

fn spatial_hash(points: ArrayView2<f64>, boundary: &[bool], eps: f64) -> Vec<usize> {
    let mut points_to: Vec<usize> = (0..points.nrows()).collect();
    let mut buckets: HashMap<Bucket, Vec<usize>> = HashMap::new();

    for node in (0..points.nrows()).filter(|&node| boundary[node]) {
        let home = bucket_of(points.row(node), eps);

        let mut first_match: Option<usize> = None;

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let key = [home[0] + dx, home[1] + dy, home[2] + dz];

                    let Some(candidates) = buckets.get(&key) else {
                        continue;
                    };

                    let closest = candidates
                        .iter()
                        .copied()
                        .filter(|&other| gap(points, node, other) < eps)
                        .min();

                    first_match = match (first_match, closest) {
                        (Some(a), Some(b)) => Some(a.min(b)),
                        (a, b) => a.or(b),
                    };
                }
            }
        }

        if let Some(other) = first_match {
            points_to[node] = other;
        }

        buckets.entry(home).or_default().push(node);
    }

    points_to
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, concatenate};
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;

    #[test]
    fn first_earlier_match_wins() {
        let points = array![
            [0., 0., 0.],
            [1., 0., 0.],
            [0., 0., 0.],
            [1., 0., 0.],
            [0., 0., 0.],
        ];
        let boundary = vec![true; 5];

        for strategy in [WeldStrategy::Exhaustive, WeldStrategy::SpatialHash] {
            let map = weld(points.view(), &boundary, 1e-9, strategy);

            assert_eq!(map.points_to(), &[0, 1, 0, 1, 0]);
            assert_eq!(map.compact(), &[Some(0), Some(1), None, None, None]);
            assert_eq!(map.num_unique(), 2);
            assert_eq!(map.resolve(4), 0);
            assert_eq!(map.resolve(3), 1);
        }
    }

    #[test]
    fn adjacent_duplicates_are_found() {
        // a duplicate directly after the node it repeats
        let points = array![[0., 0., 0.], [0., 0., 0.]];
        let map = weld(points.view(), &[true, true], 1e-9, WeldStrategy::Exhaustive);

        assert_eq!(map.points_to(), &[0, 0]);
    }

    #[test]
    fn interior_nodes_are_never_merged() {
        let points = array![[0., 0., 0.], [0., 0., 0.], [0., 0., 0.]];
        let map = weld(
            points.view(),
            &[true, false, true],
            1e-9,
            WeldStrategy::SpatialHash,
        );

        assert_eq!(map.points_to(), &[0, 1, 0]);
        assert_eq!(map.num_duplicates(), 1);
    }

    #[test]
    fn compaction_rewrites_cells() {
        let points = array![[0., 0., 0.], [1., 0., 0.], [1., 0., 0.], [2., 0., 0.]];
        let map = weld(points.view(), &[true; 4], 1e-9, WeldStrategy::Exhaustive);

        let cells = array![[0usize, 1], [2, 3]];
        assert_eq!(map.rewrite(cells.view()), array![[0usize, 1], [1, 2]]);
        assert_eq!(
            map.compact_points(points.view()),
            array![[0., 0., 0.], [1., 0., 0.], [2., 0., 0.]]
        );
    }

    #[test]
    fn strategies_agree_on_random_clouds() {
        let eps = 1e-3;
        let cloud = Array2::random((300, 3), Uniform::new(-1., 1.));
        // jittered copies well inside the tolerance
        let jitter = Array2::random((300, 3), Uniform::new(-1e-5, 1e-5));
        let copies = &cloud + &jitter;
        let points = concatenate![Axis(0), cloud, copies, cloud];

        let boundary: Vec<bool> = (0..points.nrows()).map(|node| node % 7 != 3).collect();

        let exhaustive = weld(points.view(), &boundary, eps, WeldStrategy::Exhaustive);
        let hashed = weld(points.view(), &boundary, eps, WeldStrategy::SpatialHash);

        assert_eq!(exhaustive, hashed);
        assert!(exhaustive.num_duplicates() > 0);
    }

    #[test]
    fn welding_twice_is_identity() {
        let cloud = Array2::random((200, 3), Uniform::new(-1., 1.));
        let points = concatenate![Axis(0), cloud, cloud];
        let boundary = vec![true; points.nrows()];

        let first = weld(points.view(), &boundary, 1e-6, WeldStrategy::SpatialHash);
        let welded = first.compact_points(points.view());

        let boundary = &boundary[..welded.nrows()];
        let second = weld(welded.view(), boundary, 1e-6, WeldStrategy::SpatialHash);
        assert!(second.is_identity());
    }

    #[test]
    fn tiny_tolerance_on_large_coordinates() {
        let points = array![
            [1e10, -1e10, 0.],
            [1e10, -1e10, 0.],
            [-1e10, 1e10, 1.],
        ];
        let boundary = vec![true; 3];

        for eps in [1e-20, f64::MIN_POSITIVE] {
            let hashed = weld(points.view(), &boundary, eps, WeldStrategy::SpatialHash);
            let exhaustive = weld(points.view(), &boundary, eps, WeldStrategy::Exhaustive);

            assert_eq!(hashed.points_to(), &[0, 0, 2]);
            assert_eq!(hashed, exhaustive);
        }
    }

    #[test]
    fn tolerance() {
        assert_eq!(WeldTolerance::default().resolve(1e-6), Ok(1e-12));
        assert_relative_eq!(WeldTolerance::Relative(1e-12).resolve(1e6).unwrap(), 1e-6);
        assert_eq!(WeldTolerance::Absolute(1e-3).resolve(1e6), Ok(1e-3));
        assert!(matches!(
            WeldTolerance::Absolute(0.).resolve(1.),
            Err(MeshError::WeldTolerance(_))
        ));
        assert!(WeldTolerance::Relative(f64::NAN).resolve(1.).is_err());
    }
}
