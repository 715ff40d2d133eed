//! Sampling an earth model on the nodes of a mesh
//!
//! The model itself lives outside of this crate. Anything implementing [`ScalarModel`]
//! (including plain closures) can be sampled into [`PointFields`], which are written to
//! the `<PointData>` section of a file.

use crate::prelude::*;

/// A scalar field defined over the model domain
///
/// Called once per node with the node coordinates (2 or 3 values), its depth below the
/// model surface and the gravity constant. Implementations should be deterministic; there
/// is no error channel, so a model that cannot evaluate a point should return a default.
pub trait ScalarModel {
    /// the temperature (or any other primary scalar) at `point`
    fn scalar(&self, point: &[f64], depth: f64, gravity: f64) -> f64;

    /// the `index`-th composition at `point`
    fn composition(&self, _point: &[f64], _depth: f64, _index: usize) -> f64 {
        0.
    }
}

impl<F> ScalarModel for F
where
    F: Fn(&[f64], f64, f64) -> f64,
{
    fn scalar(&self, point: &[f64], depth: f64, gravity: f64) -> f64 {
        self(point, depth, gravity)
    }
}

/// A named array with one value per node
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct PointField {
    pub name: String,
    pub values: Vec<f64>,
}

/// An ordered set of [`PointField`]s
///
/// The first field is the one a viewer colors by (the `Scalars` attribute of
/// `<PointData>`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointFields {
    fields: Vec<PointField>,
}

impl PointFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.push(name, values);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.fields.push(PointField::new(name.into(), values));
    }

    /// Evaluate `model` on every node of `mesh`
    ///
    /// The result holds `T` (the model scalar), `Depth`, and `Composition 0` up to
    /// `Composition {compositions - 1}`, in that order.
    #[tracing::instrument(level = "debug", skip(mesh, model))]
    pub fn sample<M>(mesh: &Mesh, model: &M, gravity: f64, compositions: usize) -> Self
    where
        M: ScalarModel + ?Sized,
    {
        let points: Vec<Vec<f64>> = mesh
            .points()
            .rows()
            .into_iter()
            .map(|row| row.to_vec())
            .collect();
        let depth = mesh.depth();

        let temperature = points
            .iter()
            .zip(depth)
            .map(|(point, &depth)| model.scalar(point, depth, gravity))
            .collect();

        let mut fields = Self::new()
            .with_field("T", temperature)
            .with_field("Depth", depth.to_vec());

        for index in 0..compositions {
            let values = points
                .iter()
                .zip(depth)
                .map(|(point, &depth)| model.composition(point, depth, index))
                .collect();

            fields.push(format!("Composition {}", index), values);
        }

        fields
    }

    pub fn get(&self, name: &str) -> Option<&PointField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointField> {
        self.fields.iter()
    }
}

impl DataArray for PointFields {
    fn active_scalars(&self) -> Option<&str> {
        self.fields.first().map(|field| field.name.as_str())
    }

    fn check_lengths(&self, num_points: usize) -> Result<(), Error> {
        match self
            .fields
            .iter()
            .find(|field| field.values.len() != num_points)
        {
            Some(field) => Err(Error::FieldLength {
                name: field.name.clone(),
                expected: num_points,
                actual: field.values.len(),
            }),
            None => Ok(()),
        }
    }

    fn write_arrays<W: Write>(
        &self,
        writer: &mut Writer<W>,
        encoding: Encoding,
    ) -> Result<(), Error> {
        for field in &self.fields {
            write_vtk::write_inline_dataarray(writer, &field.values, &field.name, encoding)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{AxisSpan, BoxGrid};

    struct Layered;

    impl ScalarModel for Layered {
        fn scalar(&self, _point: &[f64], depth: f64, gravity: f64) -> f64 {
            273. + depth * gravity
        }

        fn composition(&self, point: &[f64], _depth: f64, index: usize) -> f64 {
            if point[0] > index as f64 {
                1.
            } else {
                0.
            }
        }
    }

    fn mesh() -> Mesh {
        BoxGrid::plane(AxisSpan::new(0., 2., 2), AxisSpan::new(0., 1., 1))
            .build()
            .unwrap()
    }

    #[test]
    fn sample_fields() {
        let fields = PointFields::sample(&mesh(), &Layered, 10., 2);

        let names: Vec<_> = fields.iter().map(|field| field.name.as_str()).collect();
        assert_eq!(names, vec!["T", "Depth", "Composition 0", "Composition 1"]);

        assert_eq!(
            fields.get("T").unwrap().values,
            vec![283., 283., 283., 273., 273., 273.]
        );
        assert_eq!(
            fields.get("Composition 1").unwrap().values,
            vec![0., 0., 1., 0., 0., 1.]
        );
        assert_eq!(fields.active_scalars(), Some("T"));
    }

    #[test]
    fn closures_are_models() {
        let model = |point: &[f64], _depth: f64, _gravity: f64| point[1];
        let fields = PointFields::sample(&mesh(), &model, 10., 0);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("T").unwrap().values[3], 1.);
        assert_eq!(fields.get("Composition 0"), None);
    }

    #[test]
    fn length_check() {
        let fields = PointFields::new()
            .with_field("T", vec![0.; 6])
            .with_field("Depth", vec![0.; 5]);

        match fields.check_lengths(6) {
            Err(Error::FieldLength { name, .. }) => assert_eq!(name, "Depth"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(PointFields::new().check_lengths(6).is_ok());
    }
}
