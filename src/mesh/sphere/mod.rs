//! # Spherical shell
//!
//! The shell is built in three steps:
//!
//! 1. **blocks**: twelve curved quadrilateral [`Patch`]es tile the unit sphere. Their
//!    corners are the vertices, edge midpoints and face centroids of a regular
//!    tetrahedron, projected onto the sphere. Each tetrahedron face is split into three
//!    blocks, one per vertex of the face.
//! 2. **welding**: the blocks are generated independently, so nodes on shared block edges
//!    exist several times. They are merged by [`weld`](weld::weld()) into a single
//!    [`Shell`] of `12 n^2 + 2` nodes and `12 n^2` quads at subdivision level `n`.
//! 3. **extrusion**: the shell is copied onto `layers + 1` concentric spheres and
//!    consecutive copies are joined with hexahedra.
//!
//! ```
//! use earthgrid::mesh::SphereGrid;
//!
//! let grid = SphereGrid::new(0.5, 1.0, 2, 3);
//!
//! let shell = grid.shell().unwrap();
//! assert_eq!(shell.num_points(), 12 * 2 * 2 + 2);
//!
//! let mesh = grid.build().unwrap();
//! assert_eq!(mesh.num_cells(), 12 * 2 * 2 * 3);
//! ```

mod extrude;
pub mod patch;
pub mod weld;

pub use patch::Patch;
pub use weld::{WeldMap, WeldStrategy, WeldTolerance};

use crate::geometry::{centroid, midpoint, project_on_sphere, Point3};
use crate::prelude::*;

use ndarray::s;
use std::f64::consts::FRAC_1_SQRT_2;

// indices into `reference_points`
const A: usize = 0;
const B: usize = 1;
const C: usize = 2;
const D: usize = 3;
const M: usize = 4;
const N: usize = 5;
const P: usize = 6;
const Q: usize = 7;
const E: usize = 8;
const F: usize = 9;
const G: usize = 10;
const H: usize = 11;
const J: usize = 12;
const K: usize = 13;

/// corners of the twelve blocks, counter clockwise seen from outside the sphere
const BLOCKS: [[usize; 4]; 12] = [
    [M, G, A, E],
    [F, M, E, B],
    [C, G, M, F],
    [G, N, J, A],
    [C, H, N, G],
    [H, D, J, N],
    [A, J, P, E],
    [J, D, K, P],
    [P, K, B, E],
    [Q, K, D, H],
    [Q, H, C, F],
    [Q, F, B, K],
];

/// tetrahedron vertices `A B C D`, face centroids `M N P Q` and edge midpoints
/// `E F G H J K`, all on the unit sphere
fn reference_points() -> [Point3; 14] {
    let a = [-1., 0., -FRAC_1_SQRT_2];
    let b = [1., 0., -FRAC_1_SQRT_2];
    let c = [0., -1., FRAC_1_SQRT_2];
    let d = [0., 1., FRAC_1_SQRT_2];

    [
        a,
        b,
        c,
        d,
        centroid(a, b, c),
        centroid(a, d, c),
        centroid(a, d, b),
        centroid(c, d, b),
        midpoint(a, b),
        midpoint(b, c),
        midpoint(a, c),
        midpoint(c, d),
        midpoint(a, d),
        midpoint(b, d),
    ]
    .map(|point| project_on_sphere(1., point))
}

/// the twelve blocks at subdivision `level`, with every node on the unit sphere
pub fn blocks(level: usize) -> Vec<Patch> {
    let reference = reference_points();

    BLOCKS
        .iter()
        .map(|corners| {
            let mut patch = Patch::new(corners.map(|corner| reference[corner]), level);
            patch.project(1.);
            patch
        })
        .collect()
}

/// A welded quad mesh of the unit sphere
#[derive(Debug, Clone, PartialEq)]
pub struct Shell {
    points: Array2<f64>,
    connectivity: Array2<usize>,
    welded: usize,
}

impl Shell {
    /// concatenate the nodes and cells of `patches` and merge coincident boundary nodes
    pub fn weld(patches: &[Patch], eps: f64, strategy: WeldStrategy) -> Self {
        let total_nodes: usize = patches.iter().map(Patch::num_nodes).sum();
        let total_cells: usize = patches.iter().map(|p| p.connectivity().nrows()).sum();

        let mut points = Array2::zeros((total_nodes, 3));
        let mut cells = Array2::zeros((total_cells, 4));
        let mut boundary = Vec::with_capacity(total_nodes);

        let mut node_offset = 0;
        let mut cell_offset = 0;

        for patch in patches {
            let nodes = patch.num_nodes();
            let quads = patch.connectivity().nrows();

            points
                .slice_mut(s![node_offset..node_offset + nodes, ..])
                .assign(&patch.nodes());
            cells
                .slice_mut(s![cell_offset..cell_offset + quads, ..])
                .assign(&patch.connectivity().mapv(|node| node + node_offset));
            boundary.extend_from_slice(patch.boundary());

            node_offset += nodes;
            cell_offset += quads;
        }

        let map = weld::weld(points.view(), &boundary, eps, strategy);

        Self {
            points: map.compact_points(points.view()),
            connectivity: map.rewrite(cells.view()),
            welded: map.num_duplicates(),
        }
    }

    pub fn num_points(&self) -> usize {
        self.points.nrows()
    }

    pub fn num_cells(&self) -> usize {
        self.connectivity.nrows()
    }

    pub fn points(&self) -> ArrayView2<'_, f64> {
        self.points.view()
    }

    pub fn point(&self, index: usize) -> ArrayView1<'_, f64> {
        self.points.row(index)
    }

    pub fn connectivity(&self) -> ArrayView2<'_, usize> {
        self.connectivity.view()
    }

    pub fn cell(&self, index: usize) -> ArrayView1<'_, usize> {
        self.connectivity.row(index)
    }

    /// number of block nodes that were merged away
    pub fn welded(&self) -> usize {
        self.welded
    }
}

/// A full spherical shell between two radii
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereGrid {
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// subdivision of every block edge
    pub level: usize,
    /// number of radial cells
    pub layers: usize,
    pub tolerance: WeldTolerance,
    pub strategy: WeldStrategy,
}

impl SphereGrid {
    pub fn new(inner_radius: f64, outer_radius: f64, level: usize, layers: usize) -> Self {
        Self {
            inner_radius,
            outer_radius,
            level,
            layers,
            tolerance: WeldTolerance::default(),
            strategy: WeldStrategy::default(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: WeldTolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_strategy(mut self, strategy: WeldStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    fn validate(&self) -> Result<f64, MeshError> {
        if self.level == 0 {
            return Err(MeshError::NoCells { axis: "surface" });
        }

        if self.layers == 0 {
            return Err(MeshError::NoCells { axis: "radius" });
        }

        if !(self.inner_radius > 0.) {
            return Err(MeshError::InvalidRadius {
                name: "inner_radius",
                value: self.inner_radius,
            });
        }

        if !(self.inner_radius < self.outer_radius) {
            return Err(MeshError::InvertedBounds {
                axis: "radius",
                min: self.inner_radius,
                max: self.outer_radius,
            });
        }

        self.tolerance.resolve(self.outer_radius)
    }

    /// the welded surface mesh on the unit sphere
    #[tracing::instrument(level = "debug")]
    pub fn shell(&self) -> Result<Shell, MeshError> {
        let eps = self.validate()?;
        let shell = Shell::weld(&blocks(self.level), eps, self.strategy);

        tracing::debug!(
            nodes = shell.num_points(),
            cells = shell.num_cells(),
            welded = shell.welded(),
            eps,
            "welded sphere shell"
        );

        Ok(shell)
    }

    #[tracing::instrument(level = "debug")]
    pub fn build(&self) -> Result<Mesh, MeshError> {
        let shell = self.shell()?;
        let mesh = extrude::extrude(&shell, self.inner_radius, self.outer_radius, self.layers)?;

        tracing::info!(
            points = mesh.num_points(),
            cells = mesh.num_cells(),
            "built sphere mesh"
        );

        Ok(mesh)
    }
}
