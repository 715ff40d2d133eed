//! # Mesh generation
//!
//! Every topology has its own builder type:
//!
//! * [`BoxGrid`]: an axis aligned box in 2D (x, z) or 3D (x, y, z)
//! * [`AnnulusGrid`]: a 2D ring
//! * [`ChunkGrid`]: a 3D sector of a spherical shell bounded by longitude, latitude and radius
//! * [`SphereGrid`]: a full 3D spherical shell built from a cubed sphere
//!
//! and [`Topology`] selects one of them at runtime (usually from a
//! [`GridConfig`](crate::GridConfig)). Each builder checks its parameters and returns a
//! [`Mesh`], which implements [`Domain`](crate::Domain) and can therefore be written with
//! [`write_vtk`](crate::write_vtk()).
//!
//! ```
//! use earthgrid::mesh::{AxisSpan, ChunkGrid};
//!
//! let chunk = ChunkGrid::new(
//!     AxisSpan::new(0., 0.5, 4),
//!     AxisSpan::new(-0.25, 0.25, 2),
//!     AxisSpan::new(3.0e6, 6.0e6, 3),
//! );
//! let mesh = chunk.build().unwrap();
//!
//! assert_eq!(mesh.num_points(), 5 * 3 * 4);
//! assert_eq!(mesh.num_cells(), 4 * 2 * 3);
//! ```

mod annulus;
mod cartesian;
mod chunk;
mod error;
pub(crate) mod lattice;
pub mod sphere;

pub use annulus::AnnulusGrid;
pub use cartesian::BoxGrid;
pub use chunk::ChunkGrid;
pub use error::MeshError;
pub use sphere::{Shell, SphereGrid, WeldStrategy, WeldTolerance};

use crate::array::CellRows;
use crate::prelude::*;

/// The kind of every cell in a [`Mesh`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellType {
    /// `VTK_QUAD`
    Quad,
    /// `VTK_HEXAHEDRON`
    Hexahedron,
}

impl CellType {
    /// the cell type of a mesh with `dim` spatial dimensions
    pub fn for_dim(dim: usize) -> Result<Self, MeshError> {
        match dim {
            2 => Ok(Self::Quad),
            3 => Ok(Self::Hexahedron),
            other => Err(MeshError::UnsupportedDimension(other)),
        }
    }

    pub fn num_nodes(&self) -> usize {
        match self {
            Self::Quad => 4,
            Self::Hexahedron => 8,
        }
    }

    /// the type code written to the `types` array
    pub fn vtk_id(&self) -> u8 {
        match self {
            Self::Quad => 9,
            Self::Hexahedron => 12,
        }
    }
}

/// Bounds and cell count along one axis of a structured grid
#[derive(Debug, Clone, Copy, PartialEq, Constructor)]
pub struct AxisSpan {
    pub min: f64,
    pub max: f64,
    pub cells: usize,
}

impl AxisSpan {
    pub(crate) fn validate(&self, axis: &'static str) -> Result<(), MeshError> {
        if self.cells == 0 {
            return Err(MeshError::NoCells { axis });
        }

        if !(self.min < self.max) {
            return Err(MeshError::InvertedBounds {
                axis,
                min: self.min,
                max: self.max,
            });
        }

        Ok(())
    }

    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// distance between two neighbouring nodes
    pub fn spacing(&self) -> f64 {
        self.length() / self.cells as f64
    }

    /// coordinate of the `index`-th node
    pub fn at(&self, index: usize) -> f64 {
        self.min + index as f64 * self.spacing()
    }
}

/// A mesh shape chosen at runtime
#[derive(Debug, Clone, PartialEq)]
pub enum Topology {
    Cartesian(BoxGrid),
    Annulus(AnnulusGrid),
    Chunk(ChunkGrid),
    Sphere(SphereGrid),
}

impl Topology {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cartesian(_) => "cartesian",
            Self::Annulus(_) => "annulus",
            Self::Chunk(_) => "chunk",
            Self::Sphere(_) => "sphere",
        }
    }

    pub fn build(&self) -> Result<Mesh, MeshError> {
        match self {
            Self::Cartesian(grid) => grid.build(),
            Self::Annulus(grid) => grid.build(),
            Self::Chunk(grid) => grid.build(),
            Self::Sphere(grid) => grid.build(),
        }
    }
}

/// Nodes, per node depth and cell connectivity of a finished grid
///
/// A `Mesh` can only be created through [`Mesh::new`] (or one of the builders), which
/// checks that
///
/// * the points have 2 or 3 coordinates, with quads in 2D and hexahedra in 3D,
/// * every cell references an existing node,
/// * there is one depth value per node.
///
/// After construction it is read only.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    points: Array2<f64>,
    depth: Vec<f64>,
    connectivity: Array2<usize>,
    cell_type: CellType,
}

impl Mesh {
    pub fn new(
        points: Array2<f64>,
        depth: Vec<f64>,
        connectivity: Array2<usize>,
    ) -> Result<Self, MeshError> {
        let cell_type = CellType::for_dim(points.ncols())?;
        let num_points = points.nrows();

        if connectivity.ncols() != cell_type.num_nodes() {
            return Err(MeshError::CellWidth {
                expected: cell_type.num_nodes(),
                actual: connectivity.ncols(),
            });
        }

        if depth.len() != num_points {
            return Err(MeshError::DepthLength {
                expected: num_points,
                actual: depth.len(),
            });
        }

        for (cell, row) in connectivity.rows().into_iter().enumerate() {
            if let Some(&node) = row.iter().find(|&&node| node >= num_points) {
                return Err(MeshError::DanglingNode {
                    cell,
                    node,
                    num_points,
                });
            }
        }

        Ok(Self {
            points,
            depth,
            connectivity,
            cell_type,
        })
    }

    /// number of spatial dimensions (2 or 3)
    pub fn dim(&self) -> usize {
        self.points.ncols()
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

    pub fn depth(&self) -> &[f64] {
        &self.depth
    }

    pub fn connectivity(&self) -> ArrayView2<'_, usize> {
        self.connectivity.view()
    }

    pub fn cell(&self, index: usize) -> ArrayView1<'_, usize> {
        self.connectivity.row(index)
    }

    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    /// running total of the node count of every cell, as written to the `offsets` array
    pub fn offsets(&self) -> Vec<usize> {
        let width = self.cell_type.num_nodes();
        (1..=self.num_cells()).map(|cell| cell * width).collect()
    }

    /// the points with three coordinates each, `z = 0` for 2D meshes
    pub fn padded_points(&self) -> Array2<f64> {
        let mut padded = Array2::zeros((self.num_points(), 3));

        padded
            .columns_mut()
            .into_iter()
            .zip(self.points.columns())
            .for_each(|(mut target, source)| target.assign(&source));

        padded
    }
}

impl Domain for Mesh {
    fn num_points(&self) -> usize {
        Mesh::num_points(self)
    }

    fn num_cells(&self) -> usize {
        Mesh::num_cells(self)
    }

    fn write_points<W: Write>(
        &self,
        writer: &mut Writer<W>,
        encoding: Encoding,
    ) -> Result<(), Error> {
        write_vtk::write_inline_dataarray(writer, &self.padded_points(), "Points", encoding)
    }

    fn write_cells<W: Write>(
        &self,
        writer: &mut Writer<W>,
        encoding: Encoding,
    ) -> Result<(), Error> {
        let connectivity = CellRows::new(self.connectivity.mapv(|node| node as i64));
        let offsets: Vec<i64> = self.offsets().into_iter().map(|x| x as i64).collect();
        let types = vec![self.cell_type.vtk_id(); self.num_cells()];

        write_vtk::write_inline_dataarray(writer, &connectivity, "connectivity", encoding)?;
        write_vtk::write_inline_dataarray(writer, &offsets, "offsets", encoding)?;
        write_vtk::write_inline_dataarray(writer, &types, "types", encoding)?;

        Ok(())
    }
}
