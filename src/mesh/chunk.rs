use super::lattice::Lattice;
use super::AxisSpan;
use crate::prelude::*;

use std::f64::consts::{FRAC_PI_2, PI};

/// A 3D sector of a spherical shell
///
/// Bounded by longitude and latitude (radians) and by radius. Nodes are generated on a
/// structured `(longitude, latitude, radius)` lattice with the radius varying fastest, and
/// mapped to cartesian coordinates by
///
/// ```text
/// x = r cos(lat) cos(lon)
/// y = r cos(lat) sin(lon)
/// z = r sin(lat)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Constructor)]
pub struct ChunkGrid {
    pub longitude: AxisSpan,
    pub latitude: AxisSpan,
    pub radius: AxisSpan,
}

impl ChunkGrid {
    fn validate(&self) -> Result<(), MeshError> {
        self.longitude.validate("longitude")?;
        self.latitude.validate("latitude")?;
        self.radius.validate("radius")?;

        let span = self.longitude.length();
        if span > 2. * PI {
            return Err(MeshError::LongitudeSpan(span));
        }

        if self.latitude.min < -FRAC_PI_2 || self.latitude.max > FRAC_PI_2 {
            return Err(MeshError::LatitudeRange {
                min: self.latitude.min,
                max: self.latitude.max,
            });
        }

        if self.radius.min < 0. {
            return Err(MeshError::InvalidRadius {
                name: "inner_radius",
                value: self.radius.min,
            });
        }

        Ok(())
    }

    #[tracing::instrument(level = "debug")]
    pub fn build(&self) -> Result<Mesh, MeshError> {
        self.validate()?;

        let Self {
            longitude,
            latitude,
            radius,
        } = *self;
        let outer = radius.max;

        let mesh = Lattice::new([longitude.cells, latitude.cells, radius.cells])
            .storage_order([2, 1, 0])
            .build(|[i, j, k]| {
                let lon = longitude.at(i);
                let lat = latitude.at(j);
                let r = radius.at(k);

                (
                    [
                        r * lat.cos() * lon.cos(),
                        r * lat.cos() * lon.sin(),
                        r * lat.sin(),
                    ],
                    outer - r,
                )
            })
            .into_mesh()?;

        tracing::info!(
            points = mesh.num_points(),
            cells = mesh.num_cells(),
            "built chunk mesh"
        );

        Ok(mesh)
    }
}
