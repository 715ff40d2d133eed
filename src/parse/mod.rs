//! reading `UnstructuredGrid` files back in
//!
//! The reader understands what [`write_vtk`](crate::write_vtk()) produces: a single
//! `<Piece>` whose `DataArray`s are stored inline, either as `ascii` text or as `binary`
//! (base64 encoded little endian values behind a `UInt64` byte count). It is mostly
//! useful for checking written files.
//!
//! ```
//! use earthgrid::prelude::*;
//! use earthgrid::mesh::{AxisSpan, BoxGrid};
//!
//! let mesh = BoxGrid::plane(AxisSpan::new(0., 1., 1), AxisSpan::new(0., 1., 1))
//!     .build()
//!     .unwrap();
//!
//! let mut file = Vec::new();
//! earthgrid::write_vtk(&mut file, &VtkData::new(&mesh, ()), Encoding::Base64).unwrap();
//!
//! let parsed = earthgrid::read_vtu(file.as_slice()).unwrap();
//! assert_eq!(parsed.num_points, 4);
//! assert_eq!(parsed.connectivity, vec![0, 1, 3, 2]);
//! ```

mod error;
mod event_summary;

pub use error::{
    InvalidArray, MalformedAttribute, MalformedXml, MissingArray, MissingAttribute,
    ParseError, ParsedNameOrBytes, UnexpectedAttributeValue, UnexpectedElement,
};
use event_summary::EventSummary;

use crate::prelude::*;
use crate::utils;

use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Reader;

/// The arrays of an unstructured grid file
#[derive(Debug, Clone, PartialEq)]
pub struct VtuFile {
    pub num_points: usize,
    pub num_cells: usize,
    /// three coordinates per point
    pub points: Array2<f64>,
    pub connectivity: Vec<i64>,
    pub offsets: Vec<i64>,
    pub types: Vec<u8>,
    pub point_data: PointFields,
    /// the `Scalars` attribute of `<PointData>`
    pub active_scalars: Option<String>,
}

impl VtuFile {
    /// the node indices of cell `index`, `None` past the last cell
    pub fn cell(&self, index: usize) -> Option<&[i64]> {
        let start = match index {
            0 => 0,
            _ => usize::try_from(*self.offsets.get(index - 1)?).ok()?,
        };
        let end = usize::try_from(*self.offsets.get(index)?).ok()?;

        self.connectivity.get(start..end)
    }
}

/// read in and parse an entire vtu file for a given path
pub fn read_and_parse(path: &Path) -> Result<VtuFile, Error> {
    let file = std::fs::File::open(path)?;
    let buf_reader = std::io::BufReader::new(file);

    Ok(read_vtu(buf_reader)?)
}

/// parse a vtu file from any buffered source
pub fn read_vtu<R: BufRead>(source: R) -> Result<VtuFile, ParseError> {
    let mut reader = Reader::from_reader(source);
    // ignore whitespace in the reader
    reader.trim_text(true);

    let mut buffer = Vec::new();

    read_to_grid_header(&mut reader, &mut buffer)?;

    read_starting_element_with_name(&mut reader, &mut buffer, "UnstructuredGrid")?;

    let piece = read_starting_element_with_name(&mut reader, &mut buffer, "Piece")?;
    let num_points: usize = parse_attribute(&piece, "Piece", "NumberOfPoints")?;
    let num_cells: usize = parse_attribute(&piece, "Piece", "NumberOfCells")?;

    let contents = read_piece_contents(&mut reader, &mut buffer)?;

    read_ending_element(&mut reader, &mut buffer, "UnstructuredGrid")?;
    read_ending_element(&mut reader, &mut buffer, "VTKFile")?;

    let file = contents.finish(num_points, num_cells)?;

    tracing::debug!(
        num_points,
        num_cells,
        fields = file.point_data.len(),
        "parsed unstructured grid"
    );

    Ok(file)
}

/// find the `VTKFile` element and check that it holds a little endian unstructured grid
fn read_to_grid_header<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
) -> Result<(), ParseError> {
    loop {
        buffer.clear();
        let event = reader
            .read_event_into(buffer)
            .map_err(MalformedXml::from)?;

        match event {
            // sometimes there are headers for type of file, we just continue
            Event::Decl(_) | Event::Comment(_) | Event::DocType(_) => continue,
            Event::Start(start) if start.name().as_ref() == b"VTKFile" => {
                check_attribute_value(&start, "VTKFile", "type", "UnstructuredGrid")?;
                check_attribute_value(&start, "VTKFile", "byte_order", "LittleEndian")?;

                if attribute_string(&start, "header_type")?.is_some() {
                    check_attribute_value(&start, "VTKFile", "header_type", "UInt64")?;
                }

                return Ok(());
            }
            other => {
                let actual_event = EventSummary::new(&other);
                return Err(UnexpectedElement::new("VTKFile", actual_event).into());
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Points,
    Cells,
    PointData,
    Ignored,
}

/// The attributes of a `DataArray` element
#[derive(Debug, Clone, PartialEq)]
struct DataArrayHeader {
    name: String,
    precision: Precision,
    components: usize,
    encoding: Encoding,
}

impl DataArrayHeader {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, ParseError> {
        let name = required_attribute(start, "DataArray", "Name")?;

        let type_name = required_attribute(start, "DataArray", "type")?;
        let precision = Precision::from_type_name(&type_name).ok_or_else(|| {
            UnexpectedAttributeValue::new(
                "DataArray".into(),
                "type".into(),
                "Float32, Float64, Int32, Int64 or UInt8".into(),
                type_name.as_str().into(),
            )
        })?;

        let components = match attribute_string(start, "NumberOfComponents")? {
            Some(_) => parse_attribute(start, "DataArray", "NumberOfComponents")?,
            None => 1,
        };

        let format = required_attribute(start, "DataArray", "format")?;
        let encoding = match format.as_str() {
            "ascii" => Encoding::Ascii,
            "binary" => Encoding::Base64,
            other => {
                return Err(UnexpectedAttributeValue::new(
                    "DataArray".into(),
                    "format".into(),
                    "ascii or binary".into(),
                    other.into(),
                )
                .into())
            }
        };

        Ok(Self {
            name,
            precision,
            components,
            encoding,
        })
    }

    fn invalid(&self, reason: impl Into<String>) -> ParseError {
        InvalidArray::new(self.name.clone(), reason.into()).into()
    }

    /// decode the text body of the array
    fn decode(&self, text: &str) -> Result<Vec<f64>, ParseError> {
        match self.encoding {
            Encoding::Ascii => text
                .split_whitespace()
                .map(f64::from_str)
                .collect::<Result<Vec<f64>, _>>()
                .map_err(|e| self.invalid(format!("bad ascii value: {}", e))),
            Encoding::Base64 => {
                let bytes = base64::decode(text.trim())
                    .map_err(|e| self.invalid(format!("bad base64 data: {}", e)))?;

                if bytes.len() < 8 {
                    return Err(self.invalid("missing the UInt64 byte count header"));
                }

                let (header, payload) = bytes.split_at(8);
                let mut count = [0; 8];
                count.copy_from_slice(header);
                let declared = u64::from_le_bytes(count) as usize;

                if declared != payload.len() {
                    return Err(self.invalid(format!(
                        "header declares {} bytes, but {} follow",
                        declared,
                        payload.len()
                    )));
                }

                utils::le_bytes_to_floats(payload, self.precision).ok_or_else(|| {
                    self.invalid(format!(
                        "{} bytes do not hold whole {} values",
                        payload.len(),
                        self.precision
                    ))
                })
            }
        }
    }
}

/// arrays collected while walking through a `<Piece>`
#[derive(Default)]
struct PieceContents {
    points: Option<(usize, Vec<f64>)>,
    connectivity: Option<Vec<f64>>,
    offsets: Option<Vec<f64>>,
    types: Option<Vec<f64>>,
    point_data: PointFields,
    active_scalars: Option<String>,
}

impl PieceContents {
    fn store(
        &mut self,
        section: Section,
        header: DataArrayHeader,
        values: Vec<f64>,
    ) -> Result<(), ParseError> {
        match (section, header.name.as_str()) {
            (Section::Points, _) => self.points = Some((header.components, values)),
            (Section::Cells, "connectivity") => self.connectivity = Some(values),
            (Section::Cells, "offsets") => self.offsets = Some(values),
            (Section::Cells, "types") => self.types = Some(values),
            (Section::PointData, _) => {
                if header.components != 1 {
                    return Err(header.invalid("only scalar point data is supported"));
                }
                self.point_data.push(header.name, values);
            }
            _ => tracing::debug!(name = %header.name, "skipping DataArray"),
        }

        Ok(())
    }

    fn finish(self, num_points: usize, num_cells: usize) -> Result<VtuFile, ParseError> {
        let (components, points) = self.points.ok_or_else(|| MissingArray::new("Points".into()))?;
        let connectivity = self
            .connectivity
            .ok_or_else(|| MissingArray::new("connectivity".into()))?;
        let offsets = self
            .offsets
            .ok_or_else(|| MissingArray::new("offsets".into()))?;
        let types = self.types.ok_or_else(|| MissingArray::new("types".into()))?;

        let invalid = |name: &str, reason: String| -> ParseError {
            InvalidArray::new(name.into(), reason).into()
        };

        if components != 3 {
            return Err(invalid("Points", format!("{} components instead of 3", components)));
        }

        let points = Array2::from_shape_vec((num_points, 3), points).map_err(|_| {
            invalid("Points", format!("does not hold {} points", num_points))
        })?;

        if offsets.len() != num_cells || types.len() != num_cells {
            return Err(invalid(
                "offsets",
                format!("offsets and types must hold {} entries", num_cells),
            ));
        }

        let connectivity = indices("connectivity", connectivity, num_points)?;
        let offsets = indices("offsets", offsets, connectivity.len() + 1)?;
        let types = indices("types", types, u8::MAX as usize + 1)?;

        if offsets.windows(2).any(|pair| pair[1] <= pair[0]) || offsets.first() == Some(&0) {
            return Err(invalid("offsets", "offsets must strictly increase".into()));
        }

        if offsets.last().copied().unwrap_or(0) as usize != connectivity.len() {
            return Err(invalid(
                "offsets",
                "the last offset must equal the length of the connectivity".into(),
            ));
        }

        if let Some(field) = self.point_data.iter().find(|f| f.values.len() != num_points) {
            return Err(invalid(
                &field.name,
                format!("{} values for {} points", field.values.len(), num_points),
            ));
        }

        Ok(VtuFile {
            num_points,
            num_cells,
            points,
            connectivity,
            offsets,
            types: types.into_iter().map(|x| x as u8).collect(),
            point_data: self.point_data,
            active_scalars: self.active_scalars,
        })
    }
}

/// integer values of an index array, each in `0..limit`
fn indices(name: &str, values: Vec<f64>, limit: usize) -> Result<Vec<i64>, ParseError> {
    match values
        .iter()
        .find(|&&x| !(x >= 0. && x < limit as f64 && x.fract() == 0.))
    {
        Some(bad) => Err(InvalidArray::new(
            name.into(),
            format!("{} is not an index below {}", bad, limit),
        )
        .into()),
        None => Ok(values.into_iter().map(|x| x as i64).collect()),
    }
}

/// walk through the children of `<Piece>` up to and including `</Piece>`
fn read_piece_contents<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
) -> Result<PieceContents, ParseError> {
    let mut contents = PieceContents::default();
    let mut section = Section::Ignored;
    let mut text_buffer = Vec::new();

    loop {
        buffer.clear();
        let event = reader
            .read_event_into(buffer)
            .map_err(MalformedXml::from)?;

        match event {
            Event::Start(start) => match start.name().as_ref() {
                b"Points" => section = Section::Points,
                b"Cells" => section = Section::Cells,
                b"PointData" => {
                    section = Section::PointData;
                    contents.active_scalars = attribute_string(&start, "Scalars")?;
                }
                b"CellData" => section = Section::Ignored,
                b"DataArray" => {
                    let header = DataArrayHeader::from_start(&start)?;
                    let text = read_array_text(reader, &mut text_buffer)?;
                    let values = header.decode(&text)?;

                    contents.store(section, header, values)?;
                }
                _ => {
                    let actual = EventSummary::new(&Event::Start(start.clone()));
                    return Err(UnexpectedElement::new("Points, Cells or PointData", actual).into());
                }
            },
            Event::Empty(start) => {
                if start.name().as_ref() == b"DataArray" {
                    let header = DataArrayHeader::from_start(&start)?;
                    contents.store(section, header, Vec::new())?;
                }
            }
            Event::End(end) => match end.name().as_ref() {
                b"Piece" => break,
                b"Points" | b"Cells" | b"PointData" | b"CellData" => section = Section::Ignored,
                _ => {
                    let actual = EventSummary::new(&Event::End(end.clone()));
                    return Err(UnexpectedElement::new("/Piece", actual).into());
                }
            },
            Event::Comment(_) => continue,
            other => {
                let actual = EventSummary::new(&other);
                return Err(UnexpectedElement::new("/Piece", actual).into());
            }
        }
    }

    Ok(contents)
}

/// read the text inside a `DataArray` element and its closing tag
fn read_array_text<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
) -> Result<String, ParseError> {
    buffer.clear();
    let event = reader
        .read_event_into(buffer)
        .map_err(MalformedXml::from)?;

    match event {
        Event::Text(text) => {
            let text = text.unescape().map_err(MalformedXml::from)?.into_owned();
            read_ending_element(reader, buffer, "DataArray")?;
            Ok(text)
        }
        Event::End(end) if end.name().as_ref() == b"DataArray" => Ok(String::new()),
        other => {
            let actual = EventSummary::new(&other);
            Err(UnexpectedElement::new("DataArray body", actual).into())
        }
    }
}

fn read_starting_element_with_name<'a, R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &'a mut Vec<u8>,
    expected_name: &str,
) -> Result<BytesStart<'a>, ParseError> {
    buffer.clear();
    let element = reader
        .read_event_into(buffer)
        .map_err(MalformedXml::from)?;

    match element {
        Event::Start(event) if event.name().as_ref() == expected_name.as_bytes() => Ok(event),
        other => {
            let actual_event = EventSummary::new(&other);
            Err(UnexpectedElement::new(expected_name, actual_event).into())
        }
    }
}

fn read_ending_element<'a, R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &'a mut Vec<u8>,
    expected_name: &str,
) -> Result<BytesEnd<'a>, ParseError> {
    buffer.clear();
    let element = reader
        .read_event_into(buffer)
        .map_err(MalformedXml::from)?;

    match element {
        Event::End(event) if event.name().as_ref() == expected_name.as_bytes() => Ok(event),
        other => {
            let actual_event = EventSummary::new(&other);
            Err(UnexpectedElement::new(format!("/{expected_name}"), actual_event).into())
        }
    }
}

/// the value of `key` on `start`, if present
fn attribute_string(start: &BytesStart<'_>, key: &str) -> Result<Option<String>, ParseError> {
    for attribute in start.attributes() {
        let attribute = attribute.map_err(MalformedAttribute::from)?;

        if attribute.key.as_ref() == key.as_bytes() {
            return Ok(Some(String::from_utf8_lossy(&attribute.value).into_owned()));
        }
    }

    Ok(None)
}

fn required_attribute(
    start: &BytesStart<'_>,
    element_name: &str,
    key: &str,
) -> Result<String, ParseError> {
    attribute_string(start, key)?
        .ok_or_else(|| MissingAttribute::new(element_name.into(), key.into()).into())
}

fn parse_attribute<T: FromStr>(
    start: &BytesStart<'_>,
    element_name: &str,
    key: &str,
) -> Result<T, ParseError> {
    let value = required_attribute(start, element_name, key)?;

    value.parse().map_err(|_| {
        UnexpectedAttributeValue::new(
            element_name.into(),
            key.into(),
            "a non negative integer".into(),
            value.as_str().into(),
        )
        .into()
    })
}

/// ensure that an attribute's value is what we expect it to be, otherwise return an error with
/// some location information
fn check_attribute_value(
    start: &BytesStart<'_>,
    element_name: &str,
    key: &str,
    expected: &str,
) -> Result<(), ParseError> {
    let value = required_attribute(start, element_name, key)?;

    if value != expected {
        return Err(UnexpectedAttributeValue::new(
            element_name.into(),
            key.into(),
            expected.into(),
            value.as_str().into(),
        )
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = r#"<?xml version="1.0"?>
<VTKFile type="UnstructuredGrid" version="1.0" byte_order="LittleEndian" header_type="UInt64">
  <UnstructuredGrid>
    <Piece NumberOfPoints="4" NumberOfCells="1">
      <Points>
        <DataArray type="Float64" Name="Points" NumberOfComponents="3" format="ascii">
0.0 0.0 0.0
1.0 0.0 0.0
1.0 1.0 0.0
0.0 1.0 0.0
        </DataArray>
      </Points>
      <Cells>
        <DataArray type="Int64" Name="connectivity" NumberOfComponents="1" format="ascii">0 1 2 3</DataArray>
        <DataArray type="Int64" Name="offsets" NumberOfComponents="1" format="ascii">4</DataArray>
        <DataArray type="UInt8" Name="types" NumberOfComponents="1" format="ascii">9</DataArray>
      </Cells>
      <PointData Scalars="T">
        <DataArray type="Float64" Name="T" NumberOfComponents="1" format="ascii">1.5 2.5 3.5 4.5</DataArray>
      </PointData>
    </Piece>
  </UnstructuredGrid>
</VTKFile>
"#;

    #[test]
    fn parse_ascii_quad() {
        let file = read_vtu(QUAD.as_bytes()).unwrap();

        assert_eq!(file.num_points, 4);
        assert_eq!(file.num_cells, 1);
        assert_eq!(file.points.row(2).to_vec(), vec![1., 1., 0.]);
        assert_eq!(file.cell(0), Some(&[0, 1, 2, 3][..]));
        assert_eq!(file.cell(1), None);
        assert_eq!(file.types, vec![9]);
        assert_eq!(file.active_scalars.as_deref(), Some("T"));
        assert_eq!(file.point_data.get("T").unwrap().values, vec![1.5, 2.5, 3.5, 4.5]);
    }

    #[test]
    fn rejects_other_grid_types() {
        let text = QUAD.replace("type=\"UnstructuredGrid\"", "type=\"RectilinearGrid\"");

        assert!(matches!(
            read_vtu(text.as_bytes()),
            Err(ParseError::UnexpectedAttributeValue(_))
        ));
    }

    #[test]
    fn missing_array() {
        let text = QUAD.replace(
            r#"<DataArray type="UInt8" Name="types" NumberOfComponents="1" format="ascii">9</DataArray>"#,
            "",
        );

        assert!(matches!(
            read_vtu(text.as_bytes()),
            Err(ParseError::MissingArray(_))
        ));
    }

    #[test]
    fn wrong_point_count() {
        let text = QUAD.replace("NumberOfPoints=\"4\"", "NumberOfPoints=\"5\"");

        assert!(matches!(
            read_vtu(text.as_bytes()),
            Err(ParseError::InvalidArray(_))
        ));
    }

    #[test]
    fn offsets_must_increase_within_connectivity() {
        for offsets in ["8 4", "4 8", "4 4", "0 4"] {
            let text = QUAD
                .replace("NumberOfCells=\"1\"", "NumberOfCells=\"2\"")
                .replace(">4</DataArray>", &format!(">{}</DataArray>", offsets))
                .replace(">9</DataArray>", ">9 9</DataArray>");

            assert!(
                matches!(read_vtu(text.as_bytes()), Err(ParseError::InvalidArray(_))),
                "accepted offsets {}",
                offsets
            );
        }

        let text = QUAD
            .replace("NumberOfCells=\"1\"", "NumberOfCells=\"2\"")
            .replace(">4</DataArray>", ">2 4</DataArray>")
            .replace(">9</DataArray>", ">9 9</DataArray>");
        let file = read_vtu(text.as_bytes()).unwrap();

        assert_eq!(file.cell(1), Some(&[2, 3][..]));
    }

    #[test]
    fn index_arrays_hold_node_indices() {
        for connectivity in ["0 1 2 4", "0 1 2 -3", "0 1 2.5 3"] {
            let text = QUAD.replace(">0 1 2 3</DataArray>", &format!(">{}</DataArray>", connectivity));

            assert!(
                matches!(read_vtu(text.as_bytes()), Err(ParseError::InvalidArray(_))),
                "accepted connectivity {}",
                connectivity
            );
        }

        let text = QUAD.replace(">9</DataArray>", ">300</DataArray>");
        assert!(matches!(
            read_vtu(text.as_bytes()),
            Err(ParseError::InvalidArray(_))
        ));
    }

    #[test]
    fn base64_byte_count_is_checked() {
        let header = DataArrayHeader {
            name: "T".into(),
            precision: Precision::Float64,
            components: 1,
            encoding: Encoding::Base64,
        };

        let mut bytes = 16u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(&1.5f64.to_le_bytes());
        bytes.extend_from_slice(&2.5f64.to_le_bytes());
        assert_eq!(header.decode(&base64::encode(&bytes)).unwrap(), vec![1.5, 2.5]);

        // the header claims more data than there is
        let mut short = 24u64.to_le_bytes().to_vec();
        short.extend_from_slice(&1.5f64.to_le_bytes());
        assert!(header.decode(&base64::encode(&short)).is_err());
    }
}
