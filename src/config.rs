//! Grid parameters read from a `key = value` data file
//!
//! ```text
//! # a 3D chunk of the upper mantle
//! grid_type = chunk
//! dim = 3
//! compositions = 2
//! x_min = -10, x_max = 10
//! y_min = -5
//! y_max = 5
//! z_min = 5771e3
//! z_max = 6371e3
//! n_cell_x = 40
//! n_cell_y = 20
//! n_cell_z = 12
//! ```
//!
//! Every line holds one or more `key = value` entries; commas are ignored and lines
//! starting with `#` are comments. Unknown keys are skipped with a warning.
//!
//! The `x` and `y` keys are longitude and latitude in **degrees** for the chunk topology,
//! and `z_min`/`z_max` are the inner and outer radius for the annulus, chunk and sphere
//! topologies.

use crate::mesh::{AnnulusGrid, AxisSpan, BoxGrid, ChunkGrid, SphereGrid};
use crate::prelude::*;

use std::path::Path;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("line {line}: expected `key = value`, got `{content}`")]
    MalformedLine { line: usize, content: String },
    #[error("invalid value `{value}` for `{key}`")]
    InvalidValue { key: String, value: String },
    #[error("the {topology} grid needs a value for `{key}`")]
    MissingKey {
        topology: &'static str,
        key: &'static str,
    },
    #[error("unknown grid type `{0}`, expected cartesian, annulus, chunk or sphere")]
    UnknownTopology(String),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Raw grid parameters, as read from a data file
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    pub grid_type: String,
    pub dim: usize,
    pub compositions: usize,
    pub gravity: f64,
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub z_min: Option<f64>,
    pub z_max: Option<f64>,
    pub n_cell_x: Option<usize>,
    pub n_cell_y: Option<usize>,
    pub n_cell_z: Option<usize>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_type: "chunk".into(),
            dim: 3,
            compositions: 0,
            gravity: 10.,
            x_min: None,
            x_max: None,
            y_min: None,
            y_max: None,
            z_min: None,
            z_max: None,
            n_cell_x: None,
            n_cell_y: None,
            n_cell_z: None,
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.into(),
        value: value.into(),
    })
}

fn require<T>(
    value: Option<T>,
    topology: &'static str,
    key: &'static str,
) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::MissingKey { topology, key })
}

/// the two axis directions a grid can be laid out along, besides the radius
#[derive(Clone, Copy)]
enum Horizontal {
    X,
    Y,
}

impl GridConfig {
    /// read and parse the data file at `path`
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = contents.parse()?;

        tracing::debug!(path = %path.display(), ?config, "read grid configuration");

        Ok(config)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "grid_type" => self.grid_type = value.into(),
            "dim" => self.dim = parse_value(key, value)?,
            "compositions" => self.compositions = parse_value(key, value)?,
            "gravity" => self.gravity = parse_value(key, value)?,
            "x_min" => self.x_min = Some(parse_value(key, value)?),
            "x_max" => self.x_max = Some(parse_value(key, value)?),
            "y_min" => self.y_min = Some(parse_value(key, value)?),
            "y_max" => self.y_max = Some(parse_value(key, value)?),
            "z_min" => self.z_min = Some(parse_value(key, value)?),
            "z_max" => self.z_max = Some(parse_value(key, value)?),
            "n_cell_x" => self.n_cell_x = Some(parse_value(key, value)?),
            "n_cell_y" => self.n_cell_y = Some(parse_value(key, value)?),
            "n_cell_z" => self.n_cell_z = Some(parse_value(key, value)?),
            other => tracing::warn!(key = other, "ignoring unknown grid parameter"),
        }

        Ok(())
    }

    fn horizontal_span(
        &self,
        topology: &'static str,
        axis: Horizontal,
        degrees: bool,
    ) -> Result<AxisSpan, ConfigError> {
        let (min, max, cells) = match axis {
            Horizontal::X => (
                require(self.x_min, topology, "x_min")?,
                require(self.x_max, topology, "x_max")?,
                require(self.n_cell_x, topology, "n_cell_x")?,
            ),
            Horizontal::Y => (
                require(self.y_min, topology, "y_min")?,
                require(self.y_max, topology, "y_max")?,
                require(self.n_cell_y, topology, "n_cell_y")?,
            ),
        };

        if degrees {
            Ok(AxisSpan::new(min.to_radians(), max.to_radians(), cells))
        } else {
            Ok(AxisSpan::new(min, max, cells))
        }
    }

    /// `z_min`, `z_max` and `n_cell_z`
    fn vertical_span(&self, topology: &'static str) -> Result<AxisSpan, ConfigError> {
        Ok(AxisSpan::new(
            require(self.z_min, topology, "z_min")?,
            require(self.z_max, topology, "z_max")?,
            require(self.n_cell_z, topology, "n_cell_z")?,
        ))
    }

    fn expect_dim(&self, topology: &'static str, expected: usize) -> Result<(), ConfigError> {
        if self.dim == expected {
            Ok(())
        } else {
            Err(MeshError::Dimension {
                topology,
                expected,
                actual: self.dim,
            }
            .into())
        }
    }

    /// Check that every parameter the chosen grid type needs is present and select the
    /// matching builder
    pub fn topology(&self) -> Result<Topology, ConfigError> {
        if self.dim != 2 && self.dim != 3 {
            return Err(MeshError::UnsupportedDimension(self.dim).into());
        }

        let topology = match self.grid_type.as_str() {
            "cartesian" => {
                let x = self.horizontal_span("cartesian", Horizontal::X, false)?;
                let z = self.vertical_span("cartesian")?;

                if self.dim == 2 {
                    Topology::Cartesian(BoxGrid::plane(x, z))
                } else {
                    let y = self.horizontal_span("cartesian", Horizontal::Y, false)?;
                    Topology::Cartesian(BoxGrid::volume(x, y, z))
                }
            }
            "annulus" => {
                self.expect_dim("annulus", 2)?;
                let radius = self.vertical_span("annulus")?;

                Topology::Annulus(AnnulusGrid::new(radius.min, radius.max, radius.cells))
            }
            "chunk" => {
                self.expect_dim("chunk", 3)?;

                Topology::Chunk(ChunkGrid::new(
                    self.horizontal_span("chunk", Horizontal::X, true)?,
                    self.horizontal_span("chunk", Horizontal::Y, true)?,
                    self.vertical_span("chunk")?,
                ))
            }
            "sphere" => {
                self.expect_dim("sphere", 3)?;

                let n_cell_x = require(self.n_cell_x, "sphere", "n_cell_x")?;
                let n_cell_y = require(self.n_cell_y, "sphere", "n_cell_y")?;
                if n_cell_x != n_cell_y {
                    return Err(MeshError::SphereCells { n_cell_x, n_cell_y }.into());
                }

                let radius = self.vertical_span("sphere")?;
                Topology::Sphere(SphereGrid::new(
                    radius.min,
                    radius.max,
                    n_cell_x,
                    radius.cells,
                ))
            }
            other => return Err(ConfigError::UnknownTopology(other.into())),
        };

        Ok(topology)
    }

    /// select the builder and run it
    pub fn build_mesh(&self) -> Result<Mesh, ConfigError> {
        let topology = self.topology()?;

        tracing::info!(topology = topology.name(), dim = self.dim, "building mesh");

        Ok(topology.build()?)
    }
}

impl FromStr for GridConfig {
    type Err = ConfigError;

    fn from_str(contents: &str) -> Result<Self, Self::Err> {
        let mut config = Self::default();

        for (index, line) in contents.lines().enumerate() {
            let cleaned = line.replace(',', " ");
            let tokens: Vec<&str> = cleaned.split_whitespace().collect();

            if tokens.is_empty() || tokens[0].starts_with('#') {
                continue;
            }

            let malformed = || ConfigError::MalformedLine {
                line: index + 1,
                content: line.trim().into(),
            };

            if tokens.len() % 3 != 0 {
                return Err(malformed());
            }

            for entry in tokens.chunks(3) {
                match entry {
                    [key, "=", value] => config.set(key, value)?,
                    _ => return Err(malformed()),
                }
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CHUNK: &str = "
# a 3D chunk
grid_type = chunk
dim = 3
compositions = 2
x_min = -10, x_max = 10
y_min = -5
y_max = 5
z_min = 5771e3
z_max = 6371e3
n_cell_x = 40
n_cell_y = 20
n_cell_z = 12
";

    #[test]
    fn parse_file() {
        let config: GridConfig = CHUNK.parse().unwrap();

        assert_eq!(config.grid_type, "chunk");
        assert_eq!(config.compositions, 2);
        assert_eq!(config.gravity, 10.);
        assert_eq!(config.x_max, Some(10.));
        assert_eq!(config.z_max, Some(6371e3));
        assert_eq!(config.n_cell_y, Some(20));
    }

    #[test]
    fn chunk_degrees_to_radians() {
        let config: GridConfig = CHUNK.parse().unwrap();

        match config.topology().unwrap() {
            Topology::Chunk(chunk) => {
                assert_relative_eq!(chunk.longitude.min, -10f64.to_radians());
                assert_relative_eq!(chunk.latitude.max, 5f64.to_radians());
                assert_eq!(chunk.radius, AxisSpan::new(5771e3, 6371e3, 12));
            }
            other => panic!("unexpected topology {:?}", other),
        }
    }

    #[test]
    fn cartesian_bounds_are_not_converted() {
        let mut config: GridConfig = CHUNK.parse().unwrap();
        config.grid_type = "cartesian".into();
        config.dim = 2;

        assert_eq!(
            config.topology().unwrap(),
            Topology::Cartesian(BoxGrid::plane(
                AxisSpan::new(-10., 10., 40),
                AxisSpan::new(5771e3, 6371e3, 12)
            ))
        );
    }

    #[test]
    fn sphere_needs_square_blocks() {
        let mut config: GridConfig = CHUNK.parse().unwrap();
        config.grid_type = "sphere".into();

        assert_eq!(
            config.topology(),
            Err(ConfigError::Mesh(MeshError::SphereCells {
                n_cell_x: 40,
                n_cell_y: 20
            }))
        );

        config.n_cell_y = Some(40);
        assert!(matches!(config.topology(), Ok(Topology::Sphere(_))));
    }

    #[test]
    fn errors() {
        let config: GridConfig = "grid_type = torus".parse().unwrap();
        assert_eq!(
            config.topology(),
            Err(ConfigError::UnknownTopology("torus".into()))
        );

        let config: GridConfig = "grid_type = annulus\ndim = 2\nz_min = 1".parse().unwrap();
        assert_eq!(
            config.topology(),
            Err(ConfigError::MissingKey {
                topology: "annulus",
                key: "z_max"
            })
        );

        let config: GridConfig = "grid_type = annulus".parse().unwrap();
        assert!(matches!(
            config.topology(),
            Err(ConfigError::Mesh(MeshError::Dimension { expected: 2, .. }))
        ));

        assert_eq!(
            "dim 3".parse::<GridConfig>(),
            Err(ConfigError::MalformedLine {
                line: 1,
                content: "dim 3".into()
            })
        );

        assert!(matches!(
            "n_cell_x = many".parse::<GridConfig>(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn build_annulus() {
        let config: GridConfig = "grid_type = annulus\ndim = 2\nz_min = 1\nz_max = 2\nn_cell_z = 2"
            .parse()
            .unwrap();

        let mesh = config.build_mesh().unwrap();
        assert_eq!(mesh.num_cells(), 25 * 2);
    }
}
