//! Flight log decoding: turns a textual (optionally gzip-wrapped) simulation
//! record into a [`SceneModel`].
//!
//! # Invariants
//! - A structural error aborts the whole decode; no partial scene is returned.
//! - The retained [`flightlog_path::PathState`] belongs to one
//!   [`LogAssembler`] and is replaced wholesale by every full decode.
//! - Replay batches are applied all or nothing.

mod assembler;
mod builder;
mod config;
mod directives;
mod error;
mod gzip;
mod replay;
mod scene;
mod validate;

pub use assembler::LogAssembler;
pub use builder::{BuildError, MapBuilder};
pub use config::{DecodeConfig, FlightlogConfig, ValidationConfig};
pub use directives::{Autoload, GridDisplay, ParsedLog, SceneDirectives, parse_directives};
pub use error::{ErrorKind, LogError};
pub use gzip::{GZIP_MAGIC, gunzip, gzip, is_gzip};
pub use replay::{ReplayTransport, ScriptedTransport, TransportError, acc_request};
pub use scene::SceneModel;
pub use validate::{ValidationError, validate_log, validate_scene};
