//! Common traits and types that are useful for working with `earthgrid`
#![allow(unused_imports)]

pub use crate::data::VtkData;
pub use crate::mesh::{CellType, Mesh, Topology};
pub use crate::model::{PointFields, ScalarModel};
pub use crate::traits::{Array, DataArray, Domain, Numeric, Precision};
pub use crate::write_vtk::Encoding;
pub use crate::Writer;

pub(crate) use crate::mesh::MeshError;
pub(crate) use crate::Error;
pub(crate) use crate::{traits, write_vtk};

pub(crate) use std::io::Write;

pub(crate) use derive_more::{Constructor, Deref, Display, From};

pub(crate) use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
