use flightlog_common::{Axis, BlockKind, GridDimensions};
use flightlog_grid::{CellCoord, CellGrid};
use flightlog_path::{PathIntegrator, PathState};
use glam::DVec3;

use crate::config::ValidationConfig;
use crate::directives::parse_directives;
use crate::error::LogError;
use crate::gzip::{gunzip, is_gzip};
use crate::scene::SceneModel;

/// Why a submitted map was rejected. Rules are checked in declaration
/// order and only the first failure is reported.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid global structure: {0}")]
    Structure(#[from] LogError),
    #[error("Invalid dimensions")]
    Dimensions { dims: GridDimensions, max_width: usize },
    #[error("Invalid start point")]
    StartPoint { start: Option<DVec3> },
    #[error("Wrong number of blocks")]
    BlockCount { expected: usize, found: usize },
    #[error("Start in forbidden block")]
    ForbiddenStart { kind: BlockKind },
    #[error("Invalid block")]
    InvalidBlock { index: usize },
    #[error("No arrival")]
    NoArrival,
    #[error("Invalid checkpoints")]
    Checkpoints { present: [bool; 4] },
}

/// Check a decoded scene against the map submission rules.
pub fn validate_scene(scene: &SceneModel, config: &ValidationConfig) -> Result<(), ValidationError> {
    check(scene.dims(), scene.start(), scene.body_tokens, config, || Ok(scene.grid.clone()))
}

/// Validate a raw log, optionally gzip-wrapped.
///
/// The token count is checked before the grid is decoded, so an overlong
/// body reports as a count mismatch rather than a structural error.
pub fn validate_log(bytes: &[u8], config: &ValidationConfig) -> Result<(), ValidationError> {
    let raw = if is_gzip(bytes) {
        gunzip(bytes)?
    } else {
        bytes.to_vec()
    };
    let text = String::from_utf8(raw).map_err(LogError::from)?;
    let parsed = parse_directives(&text)?;
    let dims = parsed.directives.dims;
    let tokens = parsed.tokens()?;

    let integrator = PathIntegrator::default();
    let mut state = PathState::new();
    integrator
        .run(&mut state, parsed.opcodes.iter().copied())
        .map_err(LogError::from)?;
    let start = integrator.path(&state).first().map(|p| p.position);

    check(dims, start, tokens.len(), config, || {
        CellGrid::decode(dims, tokens.iter().copied()).map_err(LogError::from)
    })
}

fn check<F>(
    dims: GridDimensions,
    start: Option<DVec3>,
    body_tokens: usize,
    config: &ValidationConfig,
    grid: F,
) -> Result<(), ValidationError>
where
    F: FnOnce() -> Result<CellGrid, LogError>,
{
    if Axis::ALL.iter().any(|&a| dims.along(a) > config.max_width) {
        return Err(ValidationError::Dimensions {
            dims,
            max_width: config.max_width,
        });
    }

    let start_cell = start
        .and_then(|s| start_cell(s, dims))
        .ok_or(ValidationError::StartPoint { start })?;

    if body_tokens != dims.cell_count() {
        return Err(ValidationError::BlockCount {
            expected: dims.cell_count(),
            found: body_tokens,
        });
    }

    let grid = grid()?;
    if let Some(block) = grid.get(start_cell) {
        if block.kind.is_solid() && block.fully_extended() {
            return Err(ValidationError::ForbiddenStart { kind: block.kind });
        }
    }

    let mut arrival = false;
    let mut checkpoints = [false; 4];
    for (index, block) in grid.iter() {
        if block.kind == BlockKind::Goal {
            arrival = true;
        }
        if let Some(n) = block.kind.checkpoint() {
            checkpoints[n as usize - 1] = true;
        }
        if !Axis::ALL.iter().all(|&a| block.spans(a)) {
            return Err(ValidationError::InvalidBlock { index });
        }
    }
    if !arrival {
        return Err(ValidationError::NoArrival);
    }
    // A checkpoint needs its predecessor.
    if checkpoints.windows(2).any(|w| w[1] && !w[0]) {
        return Err(ValidationError::Checkpoints {
            present: checkpoints,
        });
    }
    tracing::debug!(%dims, blocks = grid.len(), "map is valid");
    Ok(())
}

fn start_cell(start: DVec3, dims: GridDimensions) -> Option<CellCoord> {
    let mut cell = [0usize; 3];
    for axis in Axis::ALL {
        let v = start[axis.index()];
        if v.fract() != 0.0 || v < 0.0 || v >= dims.along(axis) as f64 {
            return None;
        }
        cell[axis.index()] = v as usize;
    }
    Some(CellCoord::new(cell[0], cell[1], cell[2]))
}
