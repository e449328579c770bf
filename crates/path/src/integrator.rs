use crate::opcode::{Opcode, PathError, parse_opcode};
use crate::state::{OvershootPolicy, PathPoint, PathState};

/// Drives a [`PathState`] from opcode lines.
///
/// The state is passed in by reference so its owner can keep it across
/// replay batches.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathIntegrator {
    overshoot: OvershootPolicy,
}

impl PathIntegrator {
    pub fn new(overshoot: OvershootPolicy) -> Self {
        Self { overshoot }
    }

    pub fn overshoot(&self) -> OvershootPolicy {
        self.overshoot
    }

    /// Apply a single opcode reported on `line`.
    pub fn apply(&self, state: &mut PathState, line: usize, op: Opcode) -> Result<(), PathError> {
        match op {
            Opcode::Start(position) => {
                tracing::trace!(line, ?position, "START");
                state.start(position);
            }
            Opcode::Acc(accel) => {
                let point = state.accelerate(accel).ok_or(PathError::NotStarted {
                    line,
                    opcode: "ACC",
                })?;
                tracing::trace!(line, ?accel, index = point.action_index, "ACC");
            }
            Opcode::End { ok, moves } => {
                if moves < 0.0 || !moves.is_finite() {
                    return Err(PathError::InvalidMoves { line, moves });
                }
                if moves > state.move_count() as f64 {
                    tracing::debug!(
                        line,
                        moves,
                        recorded = state.move_count(),
                        policy = ?self.overshoot,
                        "END past last recorded move"
                    );
                }
                if !state.end(ok, moves) {
                    return Err(PathError::NotStarted {
                        line,
                        opcode: "END",
                    });
                }
            }
        }
        Ok(())
    }

    /// Feed numbered lines into `state`. Non-opcode lines are skipped.
    /// Returns the number of opcodes applied.
    pub fn run<'a, I>(&self, state: &mut PathState, lines: I) -> Result<usize, PathError>
    where
        I: IntoIterator<Item = (usize, &'a str)>,
    {
        let mut applied = 0;
        for (line, text) in lines {
            if let Some(op) = parse_opcode(line, text)? {
                self.apply(state, line, op)?;
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Feed a replay response into `state`, all or nothing.
    ///
    /// On error the state is left as it was before the call.
    pub fn resume(&self, state: &mut PathState, text: &str) -> Result<usize, PathError> {
        let mut next = state.clone();
        let applied = self.run(&mut next, text.lines().enumerate().map(|(i, l)| (i + 1, l)))?;
        *state = next;
        Ok(applied)
    }

    /// The presented trajectory of `state` under this integrator's policy.
    pub fn path(&self, state: &PathState) -> Vec<PathPoint> {
        state.points(self.overshoot)
    }
}
