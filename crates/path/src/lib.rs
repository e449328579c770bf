//! Path integrator: turns trajectory opcodes into an ordered list of points.
//!
//! # Invariants
//! - Every ACC both changes velocity and advances position by the updated
//!   velocity (unit-time steps).
//! - Action indices increase monotonically; only a terminal point may be
//!   fractional.
//! - Resuming after a termination continues from the last integer move, never
//!   from the interpolated tail point.

mod integrator;
mod opcode;
mod state;

pub use integrator::PathIntegrator;
pub use opcode::{Opcode, PathError, parse_opcode};
pub use state::{OvershootPolicy, PathPoint, PathState, Phase, Termination};
