use super::lattice::{Lattice, Winding};
use crate::prelude::*;

use std::f64::consts::PI;

/// A 2D ring between two radii
///
/// The radial direction is split into `radial_cells` cells of width
/// `dr = (outer - inner) / radial_cells`, and the angular direction into as many cells as
/// fit along the outer circumference at that width. The angular direction wraps: the
/// last column of cells connects back to the first column of nodes.
#[derive(Debug, Clone, Copy, PartialEq, Constructor)]
pub struct AnnulusGrid {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub radial_cells: usize,
}

impl AnnulusGrid {
    pub fn radial_spacing(&self) -> f64 {
        (self.outer_radius - self.inner_radius) / self.radial_cells as f64
    }

    /// number of cells around the ring
    pub fn angular_cells(&self) -> usize {
        (2. * PI * self.outer_radius / self.radial_spacing()).floor() as usize
    }

    fn validate(&self) -> Result<(), MeshError> {
        if self.radial_cells == 0 {
            return Err(MeshError::NoCells { axis: "r" });
        }

        if !(self.inner_radius >= 0.) {
            return Err(MeshError::InvalidRadius {
                name: "inner_radius",
                value: self.inner_radius,
            });
        }

        if !(self.inner_radius < self.outer_radius) {
            return Err(MeshError::InvertedBounds {
                axis: "r",
                min: self.inner_radius,
                max: self.outer_radius,
            });
        }

        Ok(())
    }

    #[tracing::instrument(level = "debug")]
    pub fn build(&self) -> Result<Mesh, MeshError> {
        self.validate()?;

        let dr = self.radial_spacing();
        let n_t = self.angular_cells();
        let inner = self.inner_radius;
        let outer = self.outer_radius;

        // nodes run around the ring first, then outwards. The angular axis is mirrored so
        // that each quad starts at the node with the larger angle.
        let mesh = Lattice::new([n_t, self.radial_cells])
            .periodic(0)
            .winding(Winding::Mirrored)
            .build(|[i, j]| {
                let theta = 2. * PI * i as f64 / n_t as f64;
                let radius = inner + j as f64 * dr;
                let point = [theta.cos() * radius, theta.sin() * radius];

                (point, outer - crate::geometry::norm(&point))
            })
            .into_mesh()?;

        tracing::info!(
            points = mesh.num_points(),
            cells = mesh.num_cells(),
            angular_cells = n_t,
            "built annulus mesh"
        );

        Ok(mesh)
    }
}
