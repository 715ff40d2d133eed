//! container types for data to be written to files
//!
//! [`Array`](crate::Array) is implemented for flat containers (`Vec<NUM>`, `&[NUM]`),
//! for row major tables (`ndarray::Array2<NUM>`, written as one tuple per row), and for
//! [`CellRows`], a table written with one row per line but as a flat array, which is
//! what the `connectivity` array of an unstructured grid looks like.

mod table;
mod vector;

pub use table::CellRows;

use crate::prelude::*;

use quick_xml::events::{BytesText, Event};

/// format `values` as ascii text, breaking the line after every `per_line` values
pub(crate) fn ascii_text<'a, NUM, I>(values: I, per_line: usize) -> String
where
    NUM: Numeric + 'a,
    I: IntoIterator<Item = &'a NUM>,
{
    let mut data = String::from("\n");

    for (idx, value) in values.into_iter().enumerate() {
        value.push_ascii(&mut data);

        if (idx + 1) % per_line == 0 {
            data.push('\n');
        } else {
            data.push(' ');
        }
    }

    if !data.ends_with('\n') {
        data.push('\n');
    }

    data
}

/// encode `values` as base64, prefixed with the `UInt64` byte count header that
/// `header_type="UInt64"` files expect
pub(crate) fn base64_text<'a, NUM, I>(values: I, length: usize) -> String
where
    NUM: Numeric + 'a,
    I: IntoIterator<Item = &'a NUM>,
{
    let payload_bytes = length * NUM::SIZE;
    let mut byte_data: Vec<u8> = Vec::with_capacity(payload_bytes + 8);

    byte_data.extend_from_slice(&(payload_bytes as u64).to_le_bytes());

    values
        .into_iter()
        .for_each(|value| value.extend_le_bytes(&mut byte_data));

    base64::encode(byte_data.as_slice())
}

/// write a complete inline array element holding `text`
pub(crate) fn write_text_array<W: Write>(
    writer: &mut Writer<W>,
    encoding: Encoding,
    name: &str,
    components: usize,
    precision: Precision,
    text: &str,
) -> Result<(), Error> {
    write_vtk::write_inline_array_header(writer, encoding, name, components, precision)?;

    writer.write_event(Event::Text(BytesText::new(text)))?;

    write_vtk::close_inline_array_header(writer)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_line_breaks() {
        let values = [0i64, 1, 4, 3, 1, 2, 5, 4];
        assert_eq!(ascii_text(&values, 4), "\n0 1 4 3\n1 2 5 4\n");

        let values = [0.5f64, 2.];
        assert_eq!(ascii_text(&values, usize::MAX), "\n0.5 2.0 \n");
    }

    #[test]
    fn base64_header_counts_payload_bytes() {
        let values = [1.0f64, 2.0];
        let text = base64_text(&values, values.len());
        let bytes = base64::decode(text).unwrap();

        assert_eq!(bytes.len(), 8 + 16);
        assert_eq!(u64::from_le_bytes(bytes[..8].try_into().unwrap()), 16);
        assert_eq!(f64::from_le_bytes(bytes[16..].try_into().unwrap()), 2.0);
    }
}
