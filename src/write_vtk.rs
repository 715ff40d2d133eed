use crate::data::VtkData;
use crate::mesh::Mesh;
use crate::model::{PointFields, ScalarModel};
use crate::traits::{Array, DataArray, Domain, Precision};
use crate::Error;

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

/// the encoding to use when writing an inline dataarray
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Ascii,
    Base64,
}

impl Encoding {
    fn to_str(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Base64 => "binary",
        }
    }
}

/// Write a given vtk file to a `Writer`
///
/// The whole domain and all of its point data must be available before the first byte
/// is written. The point data is checked against the number of points in the domain first,
/// so a mismatch never produces a partial file.
pub fn write_vtk<W, DOMAIN, D>(
    writer: W,
    data: &VtkData<DOMAIN, D>,
    encoding: Encoding,
) -> Result<(), Error>
where
    W: Write,
    DOMAIN: Domain,
    D: DataArray,
{
    let num_points = data.domain.num_points();
    let num_cells = data.domain.num_cells();

    data.data.check_lengths(num_points)?;

    let mut writer = Writer::new_with_indent(writer, b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;

    let vtk_file = BytesStart::new("VTKFile").with_attributes([
        ("type", "UnstructuredGrid"),
        ("version", "1.0"),
        ("byte_order", "LittleEndian"),
        ("header_type", "UInt64"),
    ]);
    writer.write_event(Event::Start(vtk_file))?;

    writer.write_event(Event::Start(BytesStart::new("UnstructuredGrid")))?;

    let num_points_str = num_points.to_string();
    let num_cells_str = num_cells.to_string();
    let piece = BytesStart::new("Piece").with_attributes([
        ("NumberOfPoints", num_points_str.as_str()),
        ("NumberOfCells", num_cells_str.as_str()),
    ]);
    writer.write_event(Event::Start(piece))?;

    writer.write_event(Event::Start(BytesStart::new("Points")))?;
    data.domain.write_points(&mut writer, encoding)?;
    writer.write_event(Event::End(BytesEnd::new("Points")))?;

    writer.write_event(Event::Start(BytesStart::new("Cells")))?;
    data.domain.write_cells(&mut writer, encoding)?;
    writer.write_event(Event::End(BytesEnd::new("Cells")))?;

    let mut point_data = BytesStart::new("PointData");
    if let Some(scalars) = data.data.active_scalars() {
        point_data.push_attribute(("Scalars", scalars));
    }
    writer.write_event(Event::Start(point_data))?;
    data.data.write_arrays(&mut writer, encoding)?;
    writer.write_event(Event::End(BytesEnd::new("PointData")))?;

    writer.write_event(Event::End(BytesEnd::new("Piece")))?;
    writer.write_event(Event::End(BytesEnd::new("UnstructuredGrid")))?;
    writer.write_event(Event::End(BytesEnd::new("VTKFile")))?;

    tracing::debug!(num_points, num_cells, ?encoding, "wrote unstructured grid");

    Ok(())
}

/// Sample `model` on every node of `mesh` and write the result to `writer`
///
/// The written point data holds the temperature field `T` (from
/// [`ScalarModel::scalar`]), the node `Depth`, and `compositions` composition fields.
pub fn export<W, M>(
    writer: W,
    mesh: &Mesh,
    model: &M,
    gravity: f64,
    compositions: usize,
    encoding: Encoding,
) -> Result<(), Error>
where
    W: Write,
    M: ScalarModel + ?Sized,
{
    let fields = PointFields::sample(mesh, model, gravity, compositions);

    tracing::info!(
        points = mesh.num_points(),
        cells = mesh.num_cells(),
        fields = fields.len(),
        "exporting mesh"
    );

    write_vtk(writer, &VtkData::new(mesh, fields), encoding)
}

/// open an inline `<DataArray>` element
pub fn write_inline_array_header<W: Write>(
    writer: &mut Writer<W>,
    format: Encoding,
    name: &str,
    components: usize,
    precision: Precision,
) -> Result<(), Error> {
    let precision = precision.to_string();
    let components = components.to_string();

    let element = BytesStart::new("DataArray").with_attributes([
        ("type", precision.as_str()),
        ("Name", name),
        ("NumberOfComponents", components.as_str()),
        ("format", format.to_str()),
    ]);
    writer.write_event(Event::Start(element))?;

    Ok(())
}

pub fn close_inline_array_header<W: Write>(writer: &mut Writer<W>) -> Result<(), Error> {
    writer.write_event(Event::End(BytesEnd::new("DataArray")))?;

    Ok(())
}

/// write a single (inline) array of data (such as the temperature)
/// to the vtk file.
pub fn write_inline_dataarray<W: Write, A: Array>(
    writer: &mut Writer<W>,
    data: &A,
    name: &str,
    encoding: Encoding,
) -> Result<(), Error> {
    match encoding {
        Encoding::Ascii => {
            data.write_ascii(writer, name)?;
        }
        Encoding::Base64 => {
            data.write_base64(writer, name)?;
        }
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{AxisSpan, BoxGrid};

    fn written(encoding: Encoding) -> String {
        let mesh = BoxGrid::plane(AxisSpan::new(0., 2., 2), AxisSpan::new(0., 1., 1))
            .build()
            .unwrap();
        let model = |point: &[f64], _depth: f64, _gravity: f64| point[0];

        let mut buffer = Vec::new();
        export(&mut buffer, &mesh, &model, 10., 0, encoding).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn header_elements() {
        let text = written(Encoding::Ascii);

        assert!(text.starts_with("<?xml version=\"1.0\"?>"));
        assert!(text.contains("<VTKFile type=\"UnstructuredGrid\""));
        assert!(text.contains("<Piece NumberOfPoints=\"6\" NumberOfCells=\"2\">"));
        assert!(text.contains("<PointData Scalars=\"T\">"));
        assert!(text.contains("Name=\"connectivity\""));
        assert!(text.contains("Name=\"offsets\""));
        assert!(text.contains("Name=\"types\""));
        assert!(text.trim_end().ends_with("</VTKFile>"));
    }

    #[test]
    fn ascii_cells() {
        let text = written(Encoding::Ascii);

        // one quad per line
        assert!(text.contains("0 1 4 3\n"));
        assert!(text.contains("1 2 5 4\n"));
        assert!(text.contains("4 8"));
        assert!(text.contains("9 9"));
    }

    #[test]
    fn base64_format_attribute() {
        let text = written(Encoding::Base64);
        assert!(text.contains("format=\"binary\""));
        assert!(!text.contains("format=\"ascii\""));
    }

    #[test]
    fn mismatched_field_is_rejected_before_writing() {
        let mesh = BoxGrid::plane(AxisSpan::new(0., 1., 1), AxisSpan::new(0., 1., 1))
            .build()
            .unwrap();
        let fields = PointFields::new().with_field("T", vec![0.; 3]);

        let mut buffer = Vec::new();
        let result = write_vtk(&mut buffer, &VtkData::new(&mesh, fields), Encoding::Ascii);

        assert!(matches!(
            result,
            Err(Error::FieldLength {
                expected: 4,
                actual: 3,
                ..
            })
        ));
        assert!(buffer.is_empty());
    }
}
