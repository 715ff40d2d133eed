//! # earthgrid
//!
//! Build structured visualization meshes for earth models and write them as VTK XML
//! unstructured grids (`.vtu`).
//!
//! Four domain shapes are supported: a cartesian box (2D or 3D), a 2D annulus, a 3D
//! spherical chunk, and a full 3D spherical shell built from a tetrahedron based cubed
//! sphere. Every builder returns a [`Mesh`] holding node coordinates, per-node depth and
//! cell connectivity. A [`ScalarModel`] is sampled once per node while writing.
//!
//! ```
//! use earthgrid::prelude::*;
//! use earthgrid::mesh::{AxisSpan, BoxGrid};
//!
//! let grid = BoxGrid::plane(AxisSpan::new(0., 2., 2), AxisSpan::new(0., 1., 1));
//! let mesh = grid.build().unwrap();
//!
//! let model = |_point: &[f64], depth: f64, _gravity: f64| 1600. + depth;
//!
//! let mut file = Vec::new();
//! earthgrid::export(&mut file, &mesh, &model, 10., 0, Encoding::Ascii).unwrap();
//! ```

pub mod array;
pub mod config;
mod data;
pub mod geometry;
pub mod mesh;
pub mod model;
pub mod parse;
pub mod prelude;
mod traits;
mod utils;
mod write_vtk;

pub use traits::{Array, DataArray, Domain, Numeric, Precision};

pub use data::VtkData;

pub use config::{ConfigError, GridConfig};
pub use mesh::{CellType, Mesh, MeshError, Topology};
pub use model::{PointField, PointFields, ScalarModel};

pub use write_vtk::{export, write_vtk};
pub use write_vtk::{close_inline_array_header, write_inline_array_header, write_inline_dataarray};
pub use write_vtk::Encoding;

pub use parse::{read_and_parse, read_vtu, VtuFile};

pub use ndarray;

pub use quick_xml::Reader;
pub use quick_xml::Writer;

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("Error while parsing VTK xml: {0}")]
    Parse(#[from] parse::ParseError),
    #[error("Could not write XML data to file: `{0}`")]
    XmlWrite(#[from] quick_xml::Error),
    #[error("Could not build the mesh: {0}")]
    Mesh(#[from] mesh::MeshError),
    #[error("Invalid grid configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("point field `{name}` holds {actual} values, but the mesh has {expected} points")]
    FieldLength {
        name: String,
        expected: usize,
        actual: usize,
    },
}
