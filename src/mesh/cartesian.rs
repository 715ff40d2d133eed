use super::lattice::Lattice;
use super::AxisSpan;
use crate::prelude::*;

/// An axis aligned box
///
/// The last axis (`z`) is vertical. Depth is measured from the top of the box, so it is
/// `z_max - z_min` on the bottom layer and zero on the top layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoxGrid {
    /// a vertical 2D slice in the `x`-`z` plane, meshed with quads
    Plane { x: AxisSpan, z: AxisSpan },
    /// a 3D box, meshed with hexahedra
    Volume { x: AxisSpan, y: AxisSpan, z: AxisSpan },
}

impl BoxGrid {
    pub fn plane(x: AxisSpan, z: AxisSpan) -> Self {
        Self::Plane { x, z }
    }

    pub fn volume(x: AxisSpan, y: AxisSpan, z: AxisSpan) -> Self {
        Self::Volume { x, y, z }
    }

    pub fn dim(&self) -> usize {
        match self {
            Self::Plane { .. } => 2,
            Self::Volume { .. } => 3,
        }
    }

    #[tracing::instrument(level = "debug")]
    pub fn build(&self) -> Result<Mesh, MeshError> {
        let mesh = match *self {
            Self::Plane { x, z } => {
                x.validate("x")?;
                z.validate("z")?;

                // nodes run along x first, then z
                Lattice::new([x.cells, z.cells])
                    .build(|[i, k]| ([x.at(i), z.at(k)], z.length() - k as f64 * z.spacing()))
                    .into_mesh()?
            }
            Self::Volume { x, y, z } => {
                x.validate("x")?;
                y.validate("y")?;
                z.validate("z")?;

                // nodes run along z first, then y, then x
                Lattice::new([x.cells, y.cells, z.cells])
                    .storage_order([2, 1, 0])
                    .build(|[i, j, k]| {
                        (
                            [x.at(i), y.at(j), z.at(k)],
                            z.length() - k as f64 * z.spacing(),
                        )
                    })
                    .into_mesh()?
            }
        };

        tracing::info!(
            points = mesh.num_points(),
            cells = mesh.num_cells(),
            "built box mesh"
        );

        Ok(mesh)
    }
}
