use std::collections::BTreeMap;

use flightlog_codec::CodecError;
use flightlog_common::{BlockDescriptor, BlockKind, GridDimensions};
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::coords::{CellCoord, from_linear, to_linear, world_position};
use crate::inset::{FormatVersion, clamp_to_boundary};

/// Errors from building a cell grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("cell {index}: {source}")]
    Codec {
        index: usize,
        #[source]
        source: CodecError,
    },
    #[error("grid body holds more than {capacity} cells")]
    TooManyTokens { capacity: usize },
    #[error("cell {coord:?} lies outside a {dims} grid")]
    OutOfRange { coord: CellCoord, dims: GridDimensions },
}

/// Sparse map of occupied cells, keyed by linear index.
///
/// Uses BTreeMap so iteration follows the row-major body order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellGrid {
    dims: GridDimensions,
    cells: BTreeMap<usize, BlockDescriptor>,
}

/// World-space box occupied by one block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockBox {
    pub index: usize,
    pub kind: BlockKind,
    pub min: DVec3,
    pub max: DVec3,
}

impl BlockBox {
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }
}

impl CellGrid {
    /// An empty grid of the given dimensions.
    pub fn new(dims: GridDimensions) -> Self {
        Self {
            dims,
            cells: BTreeMap::new(),
        }
    }

    /// Decode a grid body from its tokens, consumed in row-major order.
    ///
    /// Sentinel tokens leave their cell empty. A body shorter than the grid
    /// leaves the trailing cells empty; a longer body is an error. Descriptors
    /// are stored exactly as encoded.
    pub fn decode<'a, I>(dims: GridDimensions, tokens: I) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let capacity = dims.cell_count();
        let mut grid = Self::new(dims);
        let mut consumed = 0;
        for (index, token) in tokens.into_iter().enumerate() {
            if index >= capacity {
                return Err(GridError::TooManyTokens { capacity });
            }
            consumed = index + 1;
            if let Some(block) = flightlog_codec::decode_cell(token)
                .map_err(|source| GridError::Codec { index, source })?
            {
                grid.cells.insert(index, block);
            }
        }
        if consumed < capacity {
            tracing::debug!(consumed, capacity, "grid body shorter than grid, padding with empty cells");
        }
        Ok(grid)
    }

    pub fn dims(&self) -> GridDimensions {
        self.dims
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, coord: CellCoord) -> Option<&BlockDescriptor> {
        to_linear(coord, self.dims).and_then(|i| self.cells.get(&i))
    }

    pub fn get_index(&self, index: usize) -> Option<&BlockDescriptor> {
        self.cells.get(&index)
    }

    /// Place a block, replacing whatever occupied the cell.
    pub fn insert(&mut self, coord: CellCoord, block: BlockDescriptor) -> Result<(), GridError> {
        let index = to_linear(coord, self.dims).ok_or(GridError::OutOfRange {
            coord,
            dims: self.dims,
        })?;
        self.cells.insert(index, block);
        Ok(())
    }

    /// Occupied cells in linear index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BlockDescriptor)> {
        self.cells.iter().map(|(i, b)| (*i, b))
    }

    /// Read-only access to the underlying map.
    pub fn cells(&self) -> &BTreeMap<usize, BlockDescriptor> {
        &self.cells
    }

    /// Count of blocks per kind.
    pub fn kind_counts(&self) -> BTreeMap<BlockKind, usize> {
        let mut counts = BTreeMap::new();
        for block in self.cells.values() {
            *counts.entry(block.kind).or_insert(0) += 1;
        }
        counts
    }

    /// World-space boxes of every block.
    ///
    /// With `clamp` set, insets pointing out of the grid are dropped so no box
    /// reaches past the boundary.
    pub fn block_boxes(&self, version: FormatVersion, cell_size: f64, clamp: bool) -> Vec<BlockBox> {
        let half = cell_size / 2.0;
        self.iter()
            .map(|(index, &block)| {
                let c = from_linear(index, self.dims);
                let block = if clamp {
                    clamp_to_boundary(block, c, self.dims)
                } else {
                    block
                };
                let center = world_position(
                    DVec3::new(c.x as f64, c.y as f64, c.z as f64),
                    self.dims,
                    cell_size,
                );
                let reach = |raw: [u8; 3]| {
                    DVec3::new(
                        version.fraction(raw[0]),
                        version.fraction(raw[1]),
                        version.fraction(raw[2]),
                    ) * half
                };
                BlockBox {
                    index,
                    kind: block.kind,
                    min: center - reach(block.neg),
                    max: center + reach(block.pos),
                }
            })
            .collect()
    }
}
