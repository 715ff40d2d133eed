/// A violated precondition while building a mesh
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("the {topology} topology requires dim = {expected}, got dim = {actual}")]
    Dimension {
        topology: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("only 2D and 3D grids are supported, got dim = {0}")]
    UnsupportedDimension(usize),
    #[error("axis `{axis}` needs at least one cell")]
    NoCells { axis: &'static str },
    #[error("axis `{axis}` has min {min} >= max {max}")]
    InvertedBounds {
        axis: &'static str,
        min: f64,
        max: f64,
    },
    #[error("longitude span {0} exceeds 2 pi")]
    LongitudeSpan(f64),
    #[error("latitude range [{min}, {max}] leaves [-pi/2, pi/2]")]
    LatitudeRange { min: f64, max: f64 },
    #[error("radius `{name}` is out of range: {value}")]
    InvalidRadius { name: &'static str, value: f64 },
    #[error("the sphere topology needs n_cell_x == n_cell_y, got {n_cell_x} and {n_cell_y}")]
    SphereCells { n_cell_x: usize, n_cell_y: usize },
    #[error("weld tolerance must be finite and positive, got {0}")]
    WeldTolerance(f64),
    #[error("cells have {actual} nodes, {expected} were expected")]
    CellWidth { expected: usize, actual: usize },
    #[error("cell {cell} references node {node}, but there are only {num_points} nodes")]
    DanglingNode {
        cell: usize,
        node: usize,
        num_points: usize,
    },
    #[error("{actual} depth values for {expected} nodes")]
    DepthLength { expected: usize, actual: usize },
}
