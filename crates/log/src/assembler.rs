use std::path::Path;

use flightlog_grid::{CellGrid, default_cell_size};
use flightlog_path::{PathIntegrator, PathPoint, PathState, Phase};
use glam::IVec3;

use crate::config::DecodeConfig;
use crate::directives::parse_directives;
use crate::error::LogError;
use crate::gzip::{gunzip, is_gzip};
use crate::replay::{ReplayTransport, acc_request};
use crate::scene::SceneModel;

/// Decodes logs into scenes and owns the path state that replay continues.
///
/// A full decode rebuilds everything from scratch and replaces the retained
/// state; replay only advances that state.
#[derive(Debug, Default)]
pub struct LogAssembler {
    config: DecodeConfig,
    integrator: PathIntegrator,
    state: PathState,
    playable_url: Option<String>,
    scene: Option<SceneModel>,
}

impl LogAssembler {
    pub fn new(config: DecodeConfig) -> Self {
        Self {
            integrator: PathIntegrator::new(config.overshoot),
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// The most recent scene, with any replayed path applied.
    pub fn scene(&self) -> Option<&SceneModel> {
        self.scene.as_ref()
    }

    /// Retained path state.
    pub fn path_state(&self) -> &PathState {
        &self.state
    }

    /// URL to submit replay requests to, while the flight is still open.
    pub fn playable_url(&self) -> Option<&str> {
        self.playable_url.as_deref()
    }

    /// Decode raw log bytes, transparently unwrapping gzip.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<SceneModel, LogError> {
        let _span = tracing::info_span!("decode_log", bytes = bytes.len()).entered();
        let raw = if is_gzip(bytes) {
            tracing::debug!("gzip stream detected");
            gunzip(bytes)?
        } else {
            bytes.to_vec()
        };
        let text = String::from_utf8(raw)?;
        self.decode_text(&text)
    }

    /// Read and decode a log file.
    pub fn decode_file(&mut self, path: impl AsRef<Path>) -> Result<SceneModel, LogError> {
        let bytes = std::fs::read(path.as_ref())?;
        self.decode(&bytes)
    }

    /// Decode log text. On error the previously retained state is kept.
    pub fn decode_text(&mut self, text: &str) -> Result<SceneModel, LogError> {
        let parsed = parse_directives(text)?;
        let dims = parsed.directives.dims;
        let tokens = parsed.tokens()?;
        let body_tokens = tokens.len();
        let grid = CellGrid::decode(dims, tokens)?;

        let mut state = PathState::new();
        self.integrator
            .run(&mut state, parsed.opcodes.iter().copied())?;

        let scene = SceneModel {
            format_version: self.config.format_version,
            clamp_boundary: self.config.clamp_boundary,
            cell_size: self.config.cell_size.unwrap_or_else(|| default_cell_size(dims)),
            grid,
            body_tokens,
            path: self.integrator.path(&state),
            outcome: state.termination(),
            directives: parsed.directives,
        };
        tracing::info!(
            %dims,
            blocks = scene.grid.len(),
            points = scene.path.len(),
            playable = scene.directives.playable_url.is_some(),
            "decoded log"
        );

        self.playable_url = match state.phase() {
            Phase::Terminated => None,
            _ => scene.directives.playable_url.clone(),
        };
        self.state = state;
        self.scene = Some(scene.clone());
        Ok(scene)
    }

    /// Feed a replay batch (ACC*/END, optionally led by START) into the
    /// retained state and return the updated path.
    ///
    /// The grid and directives are not touched. A malformed batch leaves the
    /// state unchanged.
    pub fn replay(&mut self, text: &str) -> Result<Vec<PathPoint>, LogError> {
        let applied = self.integrator.resume(&mut self.state, text)?;
        let path = self.integrator.path(&self.state);
        tracing::debug!(applied, points = path.len(), "replay batch applied");
        if self.state.phase() == Phase::Terminated {
            self.playable_url = None;
        }
        if let Some(scene) = self.scene.as_mut() {
            *scene = scene.with_path(path.clone(), self.state.termination());
        }
        Ok(path)
    }

    /// Submit one acceleration to the playable endpoint and apply the answer.
    ///
    /// A failed exchange changes nothing; the caller may resubmit.
    pub fn play<T: ReplayTransport + ?Sized>(
        &mut self,
        transport: &mut T,
        accel: IVec3,
    ) -> Result<Vec<PathPoint>, LogError> {
        let url = self.playable_url.clone().ok_or(LogError::NotPlayable)?;
        let body = acc_request(accel);
        let response = transport.exchange(&url, &body).inspect_err(|e| {
            tracing::warn!(%url, error = %e, "replay exchange failed");
        })?;
        self.replay(&response)
    }
}
