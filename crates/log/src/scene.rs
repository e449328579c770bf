use flightlog_common::GridDimensions;
use flightlog_grid::{BlockBox, CellGrid, FormatVersion, world_position};
use flightlog_path::{PathPoint, Termination};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::directives::SceneDirectives;
use crate::error::LogError;

/// Everything decoded from one log, ready for a renderer.
///
/// Immutable once built; replay hands out a fresh path rather than editing
/// the grid or directives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneModel {
    pub directives: SceneDirectives,
    pub format_version: FormatVersion,
    /// Drop outward insets of edge cells when building block boxes.
    pub clamp_boundary: bool,
    /// World-space edge length of one cell.
    pub cell_size: f64,
    pub grid: CellGrid,
    /// Tokens present in the grid body, sentinels included.
    pub body_tokens: usize,
    pub path: Vec<PathPoint>,
    pub outcome: Option<Termination>,
}

impl SceneModel {
    pub fn dims(&self) -> GridDimensions {
        self.directives.dims
    }

    /// First point of the trajectory, if any.
    pub fn start(&self) -> Option<DVec3> {
        self.path.first().map(|p| p.position)
    }

    /// Trajectory points mapped to world space.
    pub fn world_path(&self) -> Vec<DVec3> {
        self.path
            .iter()
            .map(|p| world_position(p.position, self.dims(), self.cell_size))
            .collect()
    }

    /// World-space boxes of every block.
    pub fn block_boxes(&self) -> Vec<BlockBox> {
        self.grid
            .block_boxes(self.format_version, self.cell_size, self.clamp_boundary)
    }

    /// Copy of this scene with a replaced trajectory.
    pub fn with_path(&self, path: Vec<PathPoint>, outcome: Option<Termination>) -> Self {
        Self {
            path,
            outcome,
            ..self.clone()
        }
    }

    /// SHA-256 over the canonical JSON form, as lowercase hex.
    pub fn digest(&self) -> Result<String, LogError> {
        let bytes = serde_json::to_vec(self).map_err(LogError::Serialize)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}
