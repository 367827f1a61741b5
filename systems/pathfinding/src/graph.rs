//! Immutable node graph with precomputed neighbour adjacency.

use skirmish_core::{CellCoord, CommandError, Connectivity};

/// Offsets visited for orthogonal adjacency, in wiring order.
const ORTHOGONAL: [(i64, i64); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// Offsets visited for diagonal adjacency, in wiring order.
const DIAGONAL: [(i64, i64); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// Single addressable grid cell used as a graph vertex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    cell: CellCoord,
    neighbors: Vec<usize>,
}

impl Node {
    /// Coordinate identifying the node.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Dense indices of the neighbouring nodes.
    #[must_use]
    pub fn neighbor_indices(&self) -> &[usize] {
        &self.neighbors
    }
}

/// Dense row-major graph holding one node per grid cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathGraph {
    width: u32,
    height: u32,
    connectivity: Connectivity,
    nodes: Vec<Node>,
}

impl PathGraph {
    /// Creates `width × height` nodes and wires their neighbour lists.
    ///
    /// Diagonal wiring is symmetric: every node links to all four diagonal
    /// cells that exist inside the grid.
    #[must_use]
    pub fn build(width: u32, height: u32, connectivity: Connectivity) -> Self {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        let mut nodes = Vec::with_capacity(capacity);

        for z in 0..height {
            for x in 0..width {
                let cell = CellCoord::new(x, z);
                let mut neighbors = Vec::with_capacity(8);
                wire(&mut neighbors, cell, &ORTHOGONAL, width, height);
                if connectivity == Connectivity::Eight {
                    wire(&mut neighbors, cell, &DIAGONAL, width, height);
                }
                nodes.push(Node { cell, neighbors });
            }
        }

        Self {
            width,
            height,
            connectivity,
            nodes,
        }
    }

    /// Number of node columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of node rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Neighbour wiring used when the graph was built.
    #[must_use]
    pub const fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Reports whether the graph holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Reports whether the coordinate addresses a node.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.x() < self.width && cell.z() < self.height
    }

    /// Looks up the node at the provided coordinate.
    pub fn node_at(&self, cell: CellCoord) -> Result<&Node, CommandError> {
        self.index_of(cell)
            .and_then(|index| self.nodes.get(index))
            .ok_or(CommandError::OutOfBounds { cell })
    }

    /// Dense index of the node at `cell`, if it lies inside the graph.
    #[must_use]
    pub fn index_of(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let x = usize::try_from(cell.x()).ok()?;
        let z = usize::try_from(cell.z()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        z.checked_mul(width)?.checked_add(x)
    }

    /// Node stored at a dense index.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Coordinates of the neighbours of `cell`.
    pub fn neighbors(
        &self,
        cell: CellCoord,
    ) -> Result<impl Iterator<Item = CellCoord> + '_, CommandError> {
        let node = self.node_at(cell)?;
        Ok(node
            .neighbors
            .iter()
            .map(move |&index| self.nodes[index].cell))
    }

    /// Iterator over every node in row-major order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}

fn wire(out: &mut Vec<usize>, cell: CellCoord, offsets: &[(i64, i64)], width: u32, height: u32) {
    for &(dx, dz) in offsets {
        let x = i64::from(cell.x()) + dx;
        let z = i64::from(cell.z()) + dz;
        if x < 0 || z < 0 || x >= i64::from(width) || z >= i64::from(height) {
            continue;
        }
        let (Ok(x), Ok(z), Ok(row_width)) = (
            usize::try_from(x),
            usize::try_from(z),
            usize::try_from(width),
        ) else {
            continue;
        };
        out.push(z * row_width + x);
    }
}
