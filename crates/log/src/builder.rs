use flightlog_codec::{CodecError, EMPTY_TOKEN, encode};
use flightlog_common::{BlockDescriptor, BlockKind, GridDimensions, ModelError};
use flightlog_grid::{CellCoord, CellGrid, GridError, from_linear};
use glam::DVec3;

use crate::scene::SceneModel;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("cell {index}: {source}")]
    Codec {
        index: usize,
        #[source]
        source: CodecError,
    },
    #[error("start {start:?} lies outside a {dims} grid")]
    StartOutOfRange { start: CellCoord, dims: GridDimensions },
    #[error("scene has no integral start cell")]
    MissingStart,
}

/// Assembles a map log from dimensions, a start cell and blocks.
#[derive(Debug, Clone)]
pub struct MapBuilder {
    start: CellCoord,
    title: Option<String>,
    grid: CellGrid,
}

impl MapBuilder {
    pub fn new(dims: GridDimensions, start: CellCoord) -> Result<Self, BuildError> {
        if start.x >= dims.x() || start.y >= dims.y() || start.z >= dims.z() {
            return Err(BuildError::StartOutOfRange { start, dims });
        }
        Ok(Self {
            start,
            title: None,
            grid: CellGrid::new(dims),
        })
    }

    /// Rebuild the map of a decoded scene. The trajectory is dropped; only
    /// its first point is kept as the start cell.
    pub fn from_scene(scene: &SceneModel) -> Result<Self, BuildError> {
        let start = scene
            .start()
            .filter(|s| s.cmpge(DVec3::ZERO).all() && s.floor() == *s)
            .ok_or(BuildError::MissingStart)?;
        let start = CellCoord::new(start.x as usize, start.y as usize, start.z as usize);
        let mut builder = Self::new(scene.dims(), start)?;
        builder.title = scene.directives.title.clone();
        builder.grid = scene.grid.clone();
        Ok(builder)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn dims(&self) -> GridDimensions {
        self.grid.dims()
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Place a block, replacing whatever occupied the cell.
    pub fn add_block(
        &mut self,
        kind: BlockKind,
        at: CellCoord,
        pos: [u8; 3],
        neg: [u8; 3],
    ) -> Result<&mut Self, BuildError> {
        let block = BlockDescriptor::new(kind, pos, neg)?;
        self.grid.insert(at, block)?;
        tracing::debug!(?kind, ?at, "added block");
        Ok(self)
    }

    /// Place a block reaching equally far in both directions of each axis.
    pub fn add_symmetric(
        &mut self,
        kind: BlockKind,
        at: CellCoord,
        reach: [u8; 3],
    ) -> Result<&mut Self, BuildError> {
        self.add_block(kind, at, reach, reach)
    }

    /// Place a block filling its whole cell.
    pub fn add_full(&mut self, kind: BlockKind, at: CellCoord) -> Result<&mut Self, BuildError> {
        let full = [BlockDescriptor::MAX_INSET; 3];
        self.add_block(kind, at, full, full)
    }

    /// Render the log text.
    ///
    /// Tokens in a row are separated by spaces, rows by a newline and layers
    /// by an empty line.
    pub fn to_log_text(&self) -> Result<String, BuildError> {
        let dims = self.dims();
        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(&format!("TITLE {title}\n"));
        }
        out.push_str(&format!("MAP {} {} {}\n", dims.x(), dims.y(), dims.z()));
        for index in 0..dims.cell_count() {
            let cell = from_linear(index, dims);
            if cell.x > 0 {
                out.push(' ');
            } else if index > 0 {
                out.push('\n');
                if cell.y == 0 {
                    out.push('\n');
                }
            }
            match self.grid.get_index(index) {
                Some(block) => {
                    let token =
                        encode(block).map_err(|source| BuildError::Codec { index, source })?;
                    out.push_str(&token);
                }
                None => out.push_str(EMPTY_TOKEN),
            }
        }
        let s = self.start;
        out.push_str(&format!("\nENDMAP\nSTART {} {} {}\n", s.x, s.y, s.z));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::LogAssembler;

    fn dims(x: usize, y: usize, z: usize) -> GridDimensions {
        GridDimensions::new(x, y, z).unwrap()
    }

    #[test]
    fn layout_of_empty_map() {
        let text = MapBuilder::new(dims(2, 2, 2), CellCoord::new(0, 0, 0))
            .unwrap()
            .to_log_text()
            .unwrap();
        assert_eq!(
            text,
            "MAP 2 2 2\nAAA AAA\nAAA AAA\n\nAAA AAA\nAAA AAA\nENDMAP\nSTART 0 0 0\n"
        );
    }

    #[test]
    fn built_blocks_decode_back() {
        let mut builder = MapBuilder::new(dims(3, 2, 2), CellCoord::new(0, 0, 0))
            .unwrap()
            .with_title("built");
        builder
            .add_full(BlockKind::Goal, CellCoord::new(2, 1, 1))
            .unwrap()
            .add_block(BlockKind::Nebula, CellCoord::new(1, 0, 0), [1, 2, 3], [3, 2, 1])
            .unwrap()
            .add_symmetric(BlockKind::Checkpoint1, CellCoord::new(0, 1, 0), [2, 2, 2])
            .unwrap();
        let text = builder.to_log_text().unwrap();

        let scene = LogAssembler::default().decode_text(&text).unwrap();
        assert_eq!(&scene.grid, builder.grid());
        assert_eq!(scene.directives.title.as_deref(), Some("built"));
        assert_eq!(scene.body_tokens, 12);
        crate::validate::validate_scene(&scene, &Default::default()).unwrap();

        let rebuilt = MapBuilder::from_scene(&scene).unwrap();
        assert_eq!(rebuilt.to_log_text().unwrap(), text);
    }

    #[test]
    fn edge_blocks_survive_default_decode() {
        for text in [
            "MAP 1 1 1\nA//\nENDMAP\nSTART 0 0 0\n",
            "MAP 2 1 1\nA// B//\nENDMAP\nSTART 1 0 0\n",
        ] {
            let scene = LogAssembler::default().decode_text(text).unwrap();
            assert!(scene.clamp_boundary);
            assert_eq!(scene.grid.get_index(0), Some(&BlockDescriptor::full(BlockKind::Goal)));
            let rebuilt = MapBuilder::from_scene(&scene).unwrap().to_log_text().unwrap();
            assert_eq!(rebuilt, text);
        }
    }

    #[test]
    fn range_checks() {
        assert!(matches!(
            MapBuilder::new(dims(2, 2, 2), CellCoord::new(0, 2, 0)),
            Err(BuildError::StartOutOfRange { .. })
        ));
        let mut builder = MapBuilder::new(dims(2, 2, 2), CellCoord::new(0, 0, 0)).unwrap();
        assert!(matches!(
            builder.add_full(BlockKind::Goal, CellCoord::new(2, 0, 0)),
            Err(BuildError::Grid(GridError::OutOfRange { .. }))
        ));
        assert!(matches!(
            builder.add_block(BlockKind::Goal, CellCoord::new(0, 0, 0), [4, 0, 0], [0; 3]),
            Err(BuildError::Model(ModelError::InsetOutOfRange { .. }))
        ));
    }

    #[test]
    fn zero_goal_cannot_be_written() {
        let mut builder = MapBuilder::new(dims(1, 1, 1), CellCoord::new(0, 0, 0)).unwrap();
        builder
            .add_block(BlockKind::Goal, CellCoord::new(0, 0, 0), [0; 3], [0; 3])
            .unwrap();
        assert!(matches!(
            builder.to_log_text(),
            Err(BuildError::Codec {
                index: 0,
                source: CodecError::SentinelCollision
            })
        ));
    }
}
