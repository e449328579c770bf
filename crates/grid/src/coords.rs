use flightlog_common::GridDimensions;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Integer cell coordinate inside a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl CellCoord {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    pub fn as_array(&self) -> [usize; 3] {
        [self.x, self.y, self.z]
    }
}

/// Convert a linear index to a cell coordinate (x fastest, then y, then z).
///
/// Indices past the end of the grid yield coordinates with `z >= dims.z`;
/// callers check the range.
pub fn from_linear(index: usize, dims: GridDimensions) -> CellCoord {
    let layer = dims.x() * dims.y();
    let z = index / layer;
    let rest = index - z * layer;
    CellCoord {
        x: rest % dims.x(),
        y: rest / dims.x(),
        z,
    }
}

/// Convert a cell coordinate to its linear index, or `None` if out of range.
pub fn to_linear(coord: CellCoord, dims: GridDimensions) -> Option<usize> {
    if coord.x >= dims.x() || coord.y >= dims.y() || coord.z >= dims.z() {
        return None;
    }
    Some(coord.x + coord.y * dims.x() + coord.z * dims.x() * dims.y())
}

/// Edge length of one cell so that the largest grid axis spans one unit.
pub fn default_cell_size(dims: GridDimensions) -> f64 {
    1.0 / dims.max_extent() as f64
}

/// World-space center of a (possibly fractional) grid position.
///
/// Each axis is centered on `(dim - 1) / 2`, so the centers of the two edge
/// cells sit symmetrically around the origin.
pub fn world_position(grid: DVec3, dims: GridDimensions, cell_size: f64) -> DVec3 {
    let half = DVec3::new(
        (dims.x() as f64 - 1.0) / 2.0,
        (dims.y() as f64 - 1.0) / 2.0,
        (dims.z() as f64 - 1.0) / 2.0,
    );
    (grid - half) * cell_size
}
