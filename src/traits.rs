//! # Traits
//!
//! These are the seams between building a mesh and writing it out. A [`Domain`] knows
//! how to write its points and cells, a [`DataArray`] knows how to write the arrays that
//! live in the `<PointData>` section, and an [`Array`] is a single `<DataArray>` element.
//!
//! For most uses [`Mesh`](crate::Mesh) and [`PointFields`](crate::PointFields) are the
//! only implementors you need. Implement the traits yourself if you want to write some
//! other kind of unstructured domain or a custom set of point arrays.

use crate::prelude::*;

use std::fmt;

/// The value of the `type` attribute of a VTK `DataArray` element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Precision {
    Float32,
    Float64,
    Int32,
    Int64,
    UInt8,
}

impl Precision {
    /// parse the `type` attribute of a `DataArray` element
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "Float32" => Some(Self::Float32),
            "Float64" => Some(Self::Float64),
            "Int32" => Some(Self::Int32),
            "Int64" => Some(Self::Int64),
            "UInt8" => Some(Self::UInt8),
            _ => None,
        }
    }

    /// number of bytes a single value of this type occupies in binary form
    pub fn size(&self) -> usize {
        match self {
            Self::Float32 | Self::Int32 => 4,
            Self::Float64 | Self::Int64 => 8,
            Self::UInt8 => 1,
        }
    }
}

/// Scalar types that can be stored in a VTK `DataArray`
pub trait Numeric: Copy + PartialEq + fmt::Debug + num_traits::Zero + num_traits::NumCast {
    const SIZE: usize;

    fn as_precision() -> Precision;

    /// append the little endian bytes of this value to `buffer`
    fn extend_le_bytes(&self, buffer: &mut Vec<u8>);

    /// read a value back from exactly `SIZE` little endian bytes
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// append the ascii form of this value to `buffer`
    fn push_ascii(&self, buffer: &mut String);
}

macro_rules! numeric_float {
    ($type:ty, $precision:ident) => {
        impl Numeric for $type {
            const SIZE: usize = std::mem::size_of::<$type>();

            fn as_precision() -> Precision {
                Precision::$precision
            }

            fn extend_le_bytes(&self, buffer: &mut Vec<u8>) {
                buffer.extend_from_slice(&self.to_le_bytes());
            }

            fn from_le_slice(bytes: &[u8]) -> Self {
                let mut array = [0; std::mem::size_of::<$type>()];
                array.copy_from_slice(bytes);
                <$type>::from_le_bytes(array)
            }

            fn push_ascii(&self, buffer: &mut String) {
                let mut ryu_buffer = ryu::Buffer::new();
                buffer.push_str(ryu_buffer.format(*self));
            }
        }
    };
}

macro_rules! numeric_integer {
    ($type:ty, $precision:ident) => {
        impl Numeric for $type {
            const SIZE: usize = std::mem::size_of::<$type>();

            fn as_precision() -> Precision {
                Precision::$precision
            }

            fn extend_le_bytes(&self, buffer: &mut Vec<u8>) {
                buffer.extend_from_slice(&self.to_le_bytes());
            }

            fn from_le_slice(bytes: &[u8]) -> Self {
                let mut array = [0; std::mem::size_of::<$type>()];
                array.copy_from_slice(bytes);
                <$type>::from_le_bytes(array)
            }

            fn push_ascii(&self, buffer: &mut String) {
                use std::fmt::Write as _;
                // writing into a `String` cannot fail
                let _ = write!(buffer, "{}", self);
            }
        }
    };
}

numeric_float!(f32, Float32);
numeric_float!(f64, Float64);
numeric_integer!(i32, Int32);
numeric_integer!(i64, Int64);
numeric_integer!(u8, UInt8);

/// A single `<DataArray>` element that can be written inline
pub trait Array {
    /// write the array as whitespace separated ascii text
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error>;

    /// write the array as base64 encoded little endian bytes, prefixed by a `UInt64`
    /// header holding the number of payload bytes
    fn write_base64<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error>;

    /// total number of scalar values in the array
    fn length(&self) -> usize;

    fn components(&self) -> usize {
        1
    }

    fn precision(&self) -> Precision;
}

/// Describes the geometry of an unstructured grid
pub trait Domain {
    fn num_points(&self) -> usize;

    fn num_cells(&self) -> usize;

    /// Write the single 3 component `DataArray` inside of the `<Points>` element
    fn write_points<W: Write>(&self, writer: &mut Writer<W>, encoding: Encoding)
        -> Result<(), Error>;

    /// Write the `connectivity`, `offsets` and `types` arrays inside of the `<Cells>` element
    fn write_cells<W: Write>(&self, writer: &mut Writer<W>, encoding: Encoding)
        -> Result<(), Error>;
}

impl<T> Domain for &T
where
    T: Domain + ?Sized,
{
    fn num_points(&self) -> usize {
        (**self).num_points()
    }

    fn num_cells(&self) -> usize {
        (**self).num_cells()
    }

    fn write_points<W: Write>(
        &self,
        writer: &mut Writer<W>,
        encoding: Encoding,
    ) -> Result<(), Error> {
        (**self).write_points(writer, encoding)
    }

    fn write_cells<W: Write>(
        &self,
        writer: &mut Writer<W>,
        encoding: Encoding,
    ) -> Result<(), Error> {
        (**self).write_cells(writer, encoding)
    }
}

/// Describes how to write the per-point arrays of a file
///
/// Every array written by `write_arrays` is placed in the `<PointData>` section and must
/// hold exactly one tuple per point of the domain it is written with.
///
/// ```
/// use earthgrid::prelude::*;
///
/// struct Temperature {
///     t: Vec<f64>,
/// }
///
/// impl DataArray for Temperature {
///     fn active_scalars(&self) -> Option<&str> {
///         Some("T")
///     }
///
///     fn write_arrays<W: std::io::Write>(
///         &self,
///         writer: &mut Writer<W>,
///         encoding: Encoding,
///     ) -> Result<(), earthgrid::Error> {
///         earthgrid::write_inline_dataarray(writer, &self.t, "T", encoding)
///     }
/// }
/// ```
pub trait DataArray {
    /// name of the array a viewer should color by (the `Scalars` attribute of `<PointData>`)
    fn active_scalars(&self) -> Option<&str> {
        None
    }

    /// check that every array holds one value per point before anything is written
    fn check_lengths(&self, _num_points: usize) -> Result<(), Error> {
        Ok(())
    }

    fn write_arrays<W: Write>(&self, writer: &mut Writer<W>, encoding: Encoding)
        -> Result<(), Error>;
}

/// write a mesh with no point data at all
impl DataArray for () {
    fn write_arrays<W: Write>(&self, _: &mut Writer<W>, _: Encoding) -> Result<(), Error> {
        Ok(())
    }
}
