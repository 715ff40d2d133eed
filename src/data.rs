#[derive(Debug, Default, Clone, PartialEq)]
/// Container type to write vtk files from.
///
/// `VtkData` contains two objects: a `D` in data and a `DOMAIN`. For writing files,
/// `domain` must implement the [`Domain`](`crate::Domain`) trait and `data` must implement
/// the [`DataArray`](`crate::DataArray`) trait. Both are already implemented for the
/// types this crate produces: [`Mesh`](`crate::Mesh`) (or `&Mesh`) and
/// [`PointFields`](`crate::PointFields`).
pub struct VtkData<DOMAIN, D> {
    pub domain: DOMAIN,
    pub data: D,
}

impl<DOMAIN, D> VtkData<DOMAIN, D> {
    /// Construct a `vtk` container for writing to a file
    pub fn new(domain: DOMAIN, data: D) -> VtkData<DOMAIN, D> {
        VtkData { domain, data }
    }

    /// change the datatype of the data stored in this container while leaving the
    /// domain information constant
    pub fn new_data<T>(self, new_data: T) -> VtkData<DOMAIN, T> {
        VtkData {
            domain: self.domain,
            data: new_data,
        }
    }
}
