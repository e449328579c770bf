use glam::DVec3;
use serde::{Deserialize, Serialize};

/// One point of the reconstructed trajectory, in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub position: DVec3,
    /// Ordinal of the move that produced this point; fractional only for an
    /// interpolated terminal point.
    pub action_index: f64,
}

/// How an END reported at or past the last recorded move is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvershootPolicy {
    /// Leave the path as recorded; the last point keeps its integer index.
    #[default]
    Keep,
    /// Keep the geometry but stamp the reported move count on the last point.
    Stamp,
}

/// Where the integrator is in the START/ACC/END cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    Accumulating,
    Terminated,
}

/// Outcome reported by an END opcode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Termination {
    /// Success flag, carried for downstream styling only.
    pub ok: bool,
    pub moves: f64,
}

/// Kinematic accumulator for one flight.
///
/// Recorded points are the true integrated positions and are never rewritten;
/// an END only changes how [`PathState::points`] presents them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathState {
    position: DVec3,
    velocity: DVec3,
    move_count: u32,
    recorded: Vec<DVec3>,
    termination: Option<Termination>,
    phase: Phase,
}

impl PathState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Position the next ACC with zero acceleration would reach.
    pub fn projected(&self) -> DVec3 {
        self.position + self.velocity
    }

    /// Reset to an absolute position with zero velocity.
    pub fn start(&mut self, position: DVec3) -> PathPoint {
        self.position = position;
        self.velocity = DVec3::ZERO;
        self.move_count = 0;
        self.recorded.clear();
        self.recorded.push(position);
        self.termination = None;
        self.phase = Phase::Accumulating;
        PathPoint {
            position,
            action_index: 0.0,
        }
    }

    /// Apply one acceleration step. Returns `None` while idle.
    ///
    /// A terminated state resumes: the termination is dropped and stepping
    /// continues from the last integer move.
    pub fn accelerate(&mut self, accel: DVec3) -> Option<PathPoint> {
        match self.phase {
            Phase::Idle => return None,
            Phase::Terminated => self.resume(),
            Phase::Accumulating => {}
        }
        self.velocity += accel;
        self.position += self.velocity;
        self.move_count += 1;
        self.recorded.push(self.position);
        Some(PathPoint {
            position: self.position,
            action_index: self.move_count as f64,
        })
    }

    /// Record the END outcome. Returns `false` while idle.
    pub fn end(&mut self, ok: bool, moves: f64) -> bool {
        if self.phase == Phase::Idle {
            return false;
        }
        self.termination = Some(Termination { ok, moves });
        self.phase = Phase::Terminated;
        true
    }

    /// Drop any termination so stepping can continue.
    pub fn resume(&mut self) {
        if self.phase == Phase::Terminated {
            tracing::debug!(moves = self.move_count, "resuming terminated path");
            self.termination = None;
            self.phase = Phase::Accumulating;
        }
    }

    /// The trajectory as it should be presented.
    ///
    /// With a termination at `moves` below the last recorded index, the path is
    /// cut to `ceil(moves) + 1` points and the last one is interpolated between
    /// `floor(moves)` and `ceil(moves)` with weight `moves mod 1`.
    pub fn points(&self, policy: OvershootPolicy) -> Vec<PathPoint> {
        let mut points: Vec<PathPoint> = self
            .recorded
            .iter()
            .enumerate()
            .map(|(i, &position)| PathPoint {
                position,
                action_index: i as f64,
            })
            .collect();
        let Some(Termination { moves, .. }) = self.termination else {
            return points;
        };
        let Some(last) = points.len().checked_sub(1) else {
            return points;
        };
        if moves >= last as f64 {
            if policy == OvershootPolicy::Stamp {
                points[last].action_index = moves;
            }
            return points;
        }
        let lo = moves.floor() as usize;
        let hi = moves.ceil() as usize;
        points.truncate(hi + 1);
        let weight = moves.fract();
        let a = self.recorded[lo];
        let b = self.recorded[hi];
        points[hi] = PathPoint {
            position: a.lerp(b, weight),
            action_index: moves,
        };
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flown(accels: &[[f64; 3]]) -> PathState {
        let mut s = PathState::new();
        s.start(DVec3::new(2.0, 1.0, 2.0));
        for a in accels {
            s.accelerate(DVec3::from_array(*a)).unwrap();
        }
        s
    }

    #[test]
    fn idle_rejects_steps() {
        let mut s = PathState::new();
        assert!(s.accelerate(DVec3::X).is_none());
        assert!(!s.end(true, 1.0));
        assert!(s.points(OvershootPolicy::Keep).is_empty());
    }

    #[test]
    fn integration_is_unit_time() {
        let s = flown(&[[1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);
        let p = s.points(OvershootPolicy::Keep);
        let xs: Vec<f64> = p.iter().map(|p| p.position.x).collect();
        // velocity 1, 2, 2 -> positions 3, 5, 7
        assert_eq!(xs, vec![2.0, 3.0, 5.0, 7.0]);
        assert_eq!(s.velocity(), DVec3::new(2.0, 0.0, 0.0));
        assert_eq!(s.projected(), DVec3::new(9.0, 1.0, 2.0));
    }

    #[test]
    fn fractional_end_interpolates() {
        let mut s = flown(&[[1.0, 0.0, 0.0]; 8]);
        let before = s.points(OvershootPolicy::Keep);
        s.end(true, 5.5);
        let p = s.points(OvershootPolicy::Keep);
        assert_eq!(p.len(), 7);
        assert_eq!(p[6].action_index, 5.5);
        let mid = (before[5].position + before[6].position) * 0.5;
        assert_eq!(p[6].position, mid);
        assert_eq!(p[5], before[5]);
    }

    #[test]
    fn integer_end_truncates_without_blend() {
        let mut s = flown(&[[0.0, 1.0, 0.0]; 4]);
        let before = s.points(OvershootPolicy::Keep);
        s.end(false, 2.0);
        let p = s.points(OvershootPolicy::Keep);
        assert_eq!(p.len(), 3);
        assert_eq!(p[2], before[2]);
        assert!(!s.termination().unwrap().ok);
    }

    #[test]
    fn overshoot_policies() {
        let mut s = flown(&[[1.0, 0.0, 0.0]; 3]);
        s.end(true, 4.25);
        let keep = s.points(OvershootPolicy::Keep);
        assert_eq!(keep.len(), 4);
        assert_eq!(keep[3].action_index, 3.0);
        let stamp = s.points(OvershootPolicy::Stamp);
        assert_eq!(stamp.len(), 4);
        assert_eq!(stamp[3].action_index, 4.25);
        assert_eq!(stamp[3].position, keep[3].position);
    }

    #[test]
    fn resume_continues_from_integer_move() {
        let mut s = flown(&[[1.0, 0.0, 0.0]; 3]);
        s.end(true, 2.5);
        assert_eq!(s.points(OvershootPolicy::Keep).len(), 4);
        let next = s.accelerate(DVec3::ZERO).unwrap();
        assert_eq!(s.phase(), Phase::Accumulating);
        assert_eq!(next.action_index, 4.0);
        // velocity 3 from the three accelerations, last x = 2+1+2+3 = 8
        assert_eq!(next.position.x, 11.0);
        let p = s.points(OvershootPolicy::Keep);
        assert_eq!(p.len(), 5);
        assert!(p.iter().all(|p| p.action_index.fract() == 0.0));
    }

    #[test]
    fn start_discards_previous_flight() {
        let mut s = flown(&[[1.0, 1.0, 1.0]; 2]);
        s.end(true, 1.5);
        s.start(DVec3::ZERO);
        assert_eq!(s.move_count(), 0);
        assert_eq!(s.termination(), None);
        assert_eq!(s.points(OvershootPolicy::Keep).len(), 1);
    }

    #[test]
    fn point_serializes() {
        let p = PathPoint {
            position: DVec3::new(1.0, 2.0, 3.0),
            action_index: 5.5,
        };
        let json = serde_json::to_string(&p).unwrap();
        let back: PathPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
