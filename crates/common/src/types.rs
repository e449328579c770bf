use serde::{Deserialize, Serialize};

/// Errors raised when building the shared data model from raw values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("grid dimensions must be positive, got {x}x{y}x{z}")]
    ZeroDimension { x: usize, y: usize, z: usize },
    #[error("grid of {x}x{y}x{z} cells is too large to address")]
    TooLarge { x: usize, y: usize, z: usize },
    #[error("block kind {0} out of range 0..=7")]
    KindOutOfRange(u8),
    #[error("inset {value} out of range 0..=3 on {axis:?}")]
    InsetOutOfRange { axis: Axis, value: u8 },
}

/// One of the three grid axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Extent of the voxel grid. Every component is strictly positive and the
/// cell count fits in a `usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[usize; 3]", into = "[usize; 3]")]
pub struct GridDimensions {
    x: usize,
    y: usize,
    z: usize,
}

impl GridDimensions {
    pub fn new(x: usize, y: usize, z: usize) -> Result<Self, ModelError> {
        if x == 0 || y == 0 || z == 0 {
            return Err(ModelError::ZeroDimension { x, y, z });
        }
        if x.checked_mul(y).and_then(|v| v.checked_mul(z)).is_none() {
            return Err(ModelError::TooLarge { x, y, z });
        }
        Ok(Self { x, y, z })
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    pub fn z(&self) -> usize {
        self.z
    }

    /// Extent along a single axis.
    pub fn along(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Total number of cells, `x * y * z`.
    pub fn cell_count(&self) -> usize {
        self.x * self.y * self.z
    }

    /// Largest extent over the three axes.
    pub fn max_extent(&self) -> usize {
        self.x.max(self.y).max(self.z)
    }
}

impl TryFrom<[usize; 3]> for GridDimensions {
    type Error = ModelError;

    fn try_from([x, y, z]: [usize; 3]) -> Result<Self, Self::Error> {
        Self::new(x, y, z)
    }
}

impl From<GridDimensions> for [usize; 3] {
    fn from(d: GridDimensions) -> Self {
        [d.x, d.y, d.z]
    }
}

impl std::fmt::Display for GridDimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

/// What a block represents in the course. Stored in the 3-bit type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockKind {
    Goal,
    Asteroid,
    Nebula,
    MagneticCloud,
    Checkpoint1,
    Checkpoint2,
    Checkpoint3,
    Checkpoint4,
}

impl BlockKind {
    pub const ALL: [BlockKind; 8] = [
        BlockKind::Goal,
        BlockKind::Asteroid,
        BlockKind::Nebula,
        BlockKind::MagneticCloud,
        BlockKind::Checkpoint1,
        BlockKind::Checkpoint2,
        BlockKind::Checkpoint3,
        BlockKind::Checkpoint4,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, ModelError> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or(ModelError::KindOutOfRange(code))
    }

    /// Checkpoint ordinal (1..=4), or `None` for non-checkpoint kinds.
    pub fn checkpoint(self) -> Option<u8> {
        match self {
            BlockKind::Checkpoint1 => Some(1),
            BlockKind::Checkpoint2 => Some(2),
            BlockKind::Checkpoint3 => Some(3),
            BlockKind::Checkpoint4 => Some(4),
            _ => None,
        }
    }

    /// Solid kinds a flight may not start inside.
    pub fn is_solid(self) -> bool {
        matches!(self, BlockKind::Goal | BlockKind::Asteroid)
    }
}

/// A block occupying part of its unit cell.
///
/// `pos[axis]` and `neg[axis]` are quantized amounts (0..=3) describing how far
/// the block reaches from the cell center toward the positive and negative
/// direction of that axis. How a quantized amount maps to a fraction of the
/// cell depends on the log's format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockDescriptor {
    pub kind: BlockKind,
    pub pos: [u8; 3],
    pub neg: [u8; 3],
}

impl BlockDescriptor {
    /// Largest quantized inset value.
    pub const MAX_INSET: u8 = 3;

    pub fn new(kind: BlockKind, pos: [u8; 3], neg: [u8; 3]) -> Result<Self, ModelError> {
        for axis in Axis::ALL {
            for value in [pos[axis.index()], neg[axis.index()]] {
                if value > Self::MAX_INSET {
                    return Err(ModelError::InsetOutOfRange { axis, value });
                }
            }
        }
        Ok(Self { kind, pos, neg })
    }

    /// A block filling its whole cell.
    pub fn full(kind: BlockKind) -> Self {
        Self {
            kind,
            pos: [Self::MAX_INSET; 3],
            neg: [Self::MAX_INSET; 3],
        }
    }

    /// Whether the block has a nonzero extent along `axis`.
    pub fn spans(&self, axis: Axis) -> bool {
        self.pos[axis.index()] != 0 || self.neg[axis.index()] != 0
    }

    /// Whether every inset on every axis is nonzero.
    pub fn fully_extended(&self) -> bool {
        self.pos.iter().chain(self.neg.iter()).all(|&v| v != 0)
    }
}
