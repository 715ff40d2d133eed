use super::Shell;
use crate::geometry::{norm, project_on_sphere};
use crate::prelude::*;

/// Stack `layers + 1` copies of `shell` between two radii and connect them with hexahedra
///
/// Layer `k` sits at `inner + k (outer - inner) / layers`. Hexahedron `k * C + c` (for
/// `C` shell cells) has the nodes of shell cell `c` in layer `k` as its bottom face and
/// the same nodes in layer `k + 1` as its top face.
pub(crate) fn extrude(
    shell: &Shell,
    inner_radius: f64,
    outer_radius: f64,
    layers: usize,
) -> Result<Mesh, MeshError> {
    debug_assert!(layers >= 1);

    let surface_nodes = shell.num_points();
    let surface_cells = shell.num_cells();
    let dr = (outer_radius - inner_radius) / layers as f64;

    let mut points = Array2::zeros(((layers + 1) * surface_nodes, 3));
    let mut depth = Vec::with_capacity((layers + 1) * surface_nodes);

    for (index, mut row) in points.rows_mut().into_iter().enumerate() {
        let layer = index / surface_nodes;
        let node = shell.point(index % surface_nodes);
        let radius = inner_radius + layer as f64 * dr;

        let position = project_on_sphere(radius, [node[0], node[1], node[2]]);
        depth.push(outer_radius - norm(&position));

        row.iter_mut()
            .zip(position)
            .for_each(|(x, p)| *x = p);
    }

    let mut connectivity = Array2::zeros((layers * surface_cells, 8));

    for (index, mut row) in connectivity.rows_mut().into_iter().enumerate() {
        let layer = index / surface_cells;
        let quad = shell.cell(index % surface_cells);

        let bottom = quad.iter().map(|node| node + layer * surface_nodes);
        let top = quad.iter().map(|node| node + (layer + 1) * surface_nodes);

        row.iter_mut()
            .zip(bottom.chain(top))
            .for_each(|(slot, node)| *slot = node);
    }

    Mesh::new(points, depth, connectivity)
}
