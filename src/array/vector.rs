use crate::prelude::*;

use super::{ascii_text, base64_text, write_text_array};

impl<NUM> Array for Vec<NUM>
where
    NUM: Numeric,
{
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        self.as_slice().write_ascii(writer, name)
    }

    fn write_base64<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        self.as_slice().write_base64(writer, name)
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn precision(&self) -> Precision {
        NUM::as_precision()
    }
}

impl<NUM> Array for &[NUM]
where
    NUM: Numeric,
{
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        // flat arrays go on a single line
        let data = ascii_text(self.iter(), usize::MAX);

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
