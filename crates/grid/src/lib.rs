//! Grid model: linear and 3D cell addressing, world-space placement, inset
//! conventions and the sparse block map decoded from a grid body.
//!
//! # Invariants
//! - `to_linear(from_linear(i)) == i` for every index in range.
//! - Decoded descriptors are stored exactly as encoded. Boundary clamping
//!   only shapes the world-space boxes, so no clamped box reaches past the
//!   grid.
//! - The inset convention is an explicit [`FormatVersion`], never inferred.

mod cells;
mod coords;
mod inset;

pub use cells::{BlockBox, CellGrid, GridError};
pub use coords::{CellCoord, default_cell_size, from_linear, to_linear, world_position};
pub use inset::{FormatVersion, clamp_to_boundary};
