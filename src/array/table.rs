use crate::prelude::*;

use super::{ascii_text, base64_text, write_text_array};

/// A row major table written as a flat array with one row per line
///
/// Used for the `connectivity` array: every row is one cell, but VTK expects a flat
/// list of indices without a component count.
#[derive(Debug, Clone, PartialEq, Constructor, Deref)]
pub struct CellRows<NUM>(Array2<NUM>);

/// Every row is one tuple, so a `(n, 3)` table is written as `n` points with 3 components
impl<NUM> Array for Array2<NUM>
where
    NUM: Numeric,
{
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        let data = ascii_text(self.iter(), self.ncols().max(1));

        write_text_array(
            writer,
            Encoding::Ascii,
            name,
            self.ncols(),
            NUM::as_precision(),
            &data,
        )
    }

    fn write_base64<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        let data = base64_text(self.iter(), self.len());

        write_text_array(
            writer,
            Encoding::Base64,
            name,
            self.ncols(),
            NUM::as_precision(),
            &data,
        )
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn components(&self) -> usize {
        self.ncols()
    }

    fn precision(&self) -> Precision {
        NUM::as_precision()
    }
}

impl<NUM> Array for CellRows<NUM>
where
    NUM: Numeric,
{
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        let data = ascii_text(self.iter(), self.ncols().max(1));

        write_text_array(writer, Encoding::Ascii, name, 1, NUM::as_precision(), &data)
    }

    fn write_base64<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        let data = base64_text(self.iter(), self.len());

        write_text_array(writer, Encoding::Base64, name, 1, NUM::as_precision(), &data)
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn precision(&self) -> Precision {
        NUM::as_precision()
    }
}
