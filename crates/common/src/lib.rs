//! Shared data model for flight logs.
//!
//! # Invariants
//! - Grid dimensions are strictly positive on every axis.
//! - Block kinds fit the 3-bit type field; insets fit 2 bits.

mod types;

pub use types::{Axis, BlockDescriptor, BlockKind, GridDimensions, ModelError};
