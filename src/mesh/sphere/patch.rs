use crate::geometry::{project_on_sphere, Point3};
use crate::mesh::lattice::Lattice;
use crate::prelude::*;

use std::f64::consts::FRAC_PI_4;

/// One curved quadrilateral block of the cubed sphere
///
/// The `(level + 1)^2` nodes are blended from four corners with bilinear shape functions
/// evaluated at equiangular parameters, so that cells near the block edges are not
/// squeezed when the nodes are projected onto the sphere.
#[derive(Debug, Clone)]
pub struct Patch {
    nodes: Array2<f64>,
    boundary: Vec<bool>,
    connectivity: Array2<usize>,
}

/// parametric coordinate of the `index`-th of `level + 1` nodes, in `[-1, 1]`
fn equiangular(index: usize, level: usize) -> f64 {
    (-FRAC_PI_4 + index as f64 * 2. * FRAC_PI_4 / level as f64).tan()
}

impl Patch {
    /// lay out a patch between `corners`, given counter clockwise seen from outside
    pub fn new(corners: [Point3; 4], level: usize) -> Self {
        debug_assert!(level >= 1);

        let lattice = Lattice::new([level, level]);
        let mut boundary = Vec::with_capacity(lattice.num_nodes());

        let arrays = lattice.build(|[i, j]| {
            let r = equiangular(i, level);
            let s = equiangular(j, level);

            let weights = [
                0.25 * (1. - r) * (1. - s),
                0.25 * (1. + r) * (1. - s),
                0.25 * (1. + r) * (1. + s),
                0.25 * (1. - r) * (1. + s),
            ];

            let mut node = [0.; 3];
            for (weight, corner) in weights.iter().zip(&corners) {
                node.iter_mut()
                    .zip(corner)
                    .for_each(|(x, c)| *x += weight * c);
            }

            boundary.push(lattice.is_boundary([i, j]));

            (node, 0.)
        });

        Self {
            nodes: arrays.points,
            boundary,
            connectivity: arrays.connectivity,
        }
    }

    /// move every node radially onto the sphere of `radius`
    pub fn project(&mut self, radius: f64) {
        for mut row in self.nodes.rows_mut() {
            let projected = project_on_sphere(radius, [row[0], row[1], row[2]]);
            row.iter_mut()
                .zip(projected)
                .for_each(|(x, p)| *x = p);
        }
    }

    pub fn nodes(&self) -> ArrayView2<'_, f64> {
        self.nodes.view()
    }

    pub fn boundary(&self) -> &[bool] {
        &self.boundary
    }

    pub fn connectivity(&self) -> ArrayView2<'_, usize> {
        self.connectivity.view()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.nrows()
    }
}
