//! The structured lattice every topology is generated from
//!
//! A lattice is a box of `cells[axis]` cells along each logical axis. Nodes are stored
//! with the axes listed in `order` (fastest first), and a periodic axis wraps its last
//! column of cells back onto the first column of nodes. The geometry comes from a
//! closure that maps logical node coordinates to a position and a depth.

use crate::prelude::*;

/// Corner order of a quadrilateral in the first two logical axes
const QUAD_CORNERS: [[usize; 2]; 4] = [[0, 0], [1, 0], [1, 1], [0, 1]];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Winding {
    /// corners `(0,0) (1,0) (1,1) (0,1)`
    Standard,
    /// the first axis runs backwards: `(1,0) (0,0) (0,1) (1,1)`
    Mirrored,
}

#[derive(Debug, Clone)]
pub(crate) struct Lattice<const D: usize> {
    cells: [usize; D],
    periodic: [bool; D],
    order: [usize; D],
    winding: Winding,
}

/// raw arrays produced by [`Lattice::build`]
#[derive(Debug, Clone)]
pub(crate) struct LatticeArrays {
    pub(crate) points: Array2<f64>,
    pub(crate) depth: Vec<f64>,
    pub(crate) connectivity: Array2<usize>,
}

impl LatticeArrays {
    pub(crate) fn into_mesh(self) -> Result<Mesh, MeshError> {
        Mesh::new(self.points, self.depth, self.connectivity)
    }
}

impl<const D: usize> Lattice<D> {
    pub(crate) fn new(cells: [usize; D]) -> Self {
        let mut order = [0; D];
        order
            .iter_mut()
            .enumerate()
            .for_each(|(axis, slot)| *slot = axis);

        Self {
            cells,
            periodic: [false; D],
            order,
            winding: Winding::Standard,
        }
    }

    /// list the logical axes in storage order, fastest varying first
    pub(crate) fn storage_order(mut self, order: [usize; D]) -> Self {
        self.order = order;
        self
    }

    pub(crate) fn periodic(mut self, axis: usize) -> Self {
        self.periodic[axis] = true;
        self
    }

    pub(crate) fn winding(mut self, winding: Winding) -> Self {
        self.winding = winding;
        self
    }

    fn nodes_along(&self, axis: usize) -> usize {
        if self.periodic[axis] {
            self.cells[axis]
        } else {
            self.cells[axis] + 1
        }
    }

    pub(crate) fn num_nodes(&self) -> usize {
        (0..D).map(|axis| self.nodes_along(axis)).product()
    }

    pub(crate) fn num_cells(&self) -> usize {
        self.cells.iter().product()
    }

    /// storage index of the node at logical coordinates `coords`
    pub(crate) fn node_index(&self, coords: [usize; D]) -> usize {
        let mut index = 0;
        let mut stride = 1;

        for &axis in &self.order {
            debug_assert!(coords[axis] < self.nodes_along(axis));
            index += coords[axis] * stride;
            stride *= self.nodes_along(axis);
        }

        index
    }

    /// like [`Lattice::node_index`], but coordinates on periodic axes wrap around
    pub(crate) fn node_id(&self, mut coords: [usize; D]) -> usize {
        for axis in 0..D {
            if self.periodic[axis] {
                coords[axis] %= self.nodes_along(axis);
            }
        }

        self.node_index(coords)
    }

    /// true for nodes on the first or last layer of any non periodic axis
    pub(crate) fn is_boundary(&self, coords: [usize; D]) -> bool {
        (0..D).any(|axis| {
            !self.periodic[axis] && (coords[axis] == 0 || coords[axis] == self.cells[axis])
        })
    }

    /// logical coordinates of the `linear`-th entry when every axis has `extent(axis)` entries
    fn coords_of(&self, mut linear: usize, extent: impl Fn(usize) -> usize) -> [usize; D] {
        let mut coords = [0; D];

        for &axis in &self.order {
            let n = extent(axis);
            coords[axis] = linear % n;
            linear /= n;
        }

        coords
    }

    /// offset of cell corner `corner` from the cell origin
    ///
    /// the first four corners form a quad in the first two axes, every further axis
    /// doubles the corners with a copy shifted by one along that axis
    fn corner_offset(&self, corner: usize) -> [usize; D] {
        let [mut du, dv] = QUAD_CORNERS[corner % 4];

        if self.winding == Winding::Mirrored {
            du = 1 - du;
        }

        let mut offset = [0; D];
        offset[0] = du;
        offset[1] = dv;

        for (axis, slot) in offset.iter_mut().enumerate().skip(2) {
            *slot = (corner >> axis) & 1;
        }

        offset
    }

    /// Generate the node positions, depths and cell connectivity of this lattice
    ///
    /// `transform` is called exactly once per node, in storage order.
    pub(crate) fn build<const S: usize, F>(&self, mut transform: F) -> LatticeArrays
    where
        F: FnMut([usize; D]) -> ([f64; S], f64),
    {
        debug_assert!(D >= 2, "lattices need at least two axes");

        let num_nodes = self.num_nodes();
        let mut points = Array2::zeros((num_nodes, S));
        let mut depth = Vec::with_capacity(num_nodes);

        for (linear, mut row) in points.rows_mut().into_iter().enumerate() {
            let coords = self.coords_of(linear, |axis| self.nodes_along(axis));
            let (position, node_depth) = transform(coords);

            row.iter_mut()
                .zip(position)
                .for_each(|(slot, value)| *slot = value);
            depth.push(node_depth);
        }

        let num_cells = self.num_cells();
        let mut connectivity = Array2::zeros((num_cells, 1 << D));

        for (linear, mut row) in connectivity.rows_mut().into_iter().enumerate() {
            let cell = self.coords_of(linear, |axis| self.cells[axis]);

            for (corner, node) in row.iter_mut().enumerate() {
                let mut coords = cell;
                coords
                    .iter_mut()
                    .zip(self.corner_offset(corner))
                    .for_each(|(coord, offset)| *coord += offset);

                *node = self.node_id(coords);
            }
        }

        LatticeArrays {
            points,
            depth,
            connectivity,
        }
    }
}
