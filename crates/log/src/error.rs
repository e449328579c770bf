use flightlog_grid::GridError;
use flightlog_path::PathError;

use crate::replay::TransportError;

/// Errors from decoding or replaying a flight log.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("line {line}: {message}")]
    Format { line: usize, message: String },
    #[error("missing MAP directive")]
    MissingMap,
    #[error("MAP on line {line} is never closed by ENDMAP")]
    MissingEndmap { line: usize },
    #[error("grid body: {0}")]
    Grid(#[from] GridError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("log is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("gzip decompression failed: {0}")]
    Decompression(#[source] std::io::Error),
    #[error("replay transport failed: {0}")]
    Transport(#[from] TransportError),
    #[error("scene is not playable")]
    NotPlayable,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("scene serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Coarse classification of a [`LogError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The record itself is malformed.
    Format,
    /// The gzip wrapper is corrupt.
    Decompression,
    /// A replay exchange failed; the previous scene is untouched.
    Transport,
    /// Anything else: IO, configuration, misuse.
    Other,
}

impl LogError {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        LogError::Format {
            line,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LogError::Format { .. }
            | LogError::MissingMap
            | LogError::MissingEndmap { .. }
            | LogError::Grid(_)
            | LogError::Path(_)
            | LogError::Utf8(_) => ErrorKind::Format,
            LogError::Decompression(_) => ErrorKind::Decompression,
            LogError::Transport(_) => ErrorKind::Transport,
            LogError::NotPlayable
            | LogError::Io(_)
            | LogError::Config(_)
            | LogError::Serialize(_) => ErrorKind::Other,
        }
    }

    pub fn is_format(&self) -> bool {
        self.kind() == ErrorKind::Format
    }
}
