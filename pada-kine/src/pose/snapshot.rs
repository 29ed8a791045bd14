//! Pose history entries.

use super::leg::LegId;
use crate::ik::JointAngles;

/// What kind of motion produced a snapshot
///
/// The command loop paces body moves, leg moves and running steps at
/// different speeds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveKind {
    /// Initial or seed pose
    Init,
    /// Hip points moved with feet planted
    Body,
    /// A single foot moved
    Foot { leg: LegId },
    /// Several feet moved together
    Feet { legs: Vec<LegId> },
    /// Any part of a running trot step
    Run,
}

impl MoveKind {
    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            MoveKind::Init => "init",
            MoveKind::Body => "body",
            MoveKind::Foot { .. } => "foot",
            MoveKind::Feet { .. } => "feet",
            MoveKind::Run => "run",
        }
    }
}

/// One recorded full-robot joint state
#[derive(Clone, Debug, PartialEq)]
pub struct PoseSnapshot {
    pub kind: MoveKind,
    /// Per-leg angles in leg-number order
    pub angles: [JointAngles; 4],
}

impl PoseSnapshot {
    pub fn leg(&self, leg: LegId) -> &JointAngles {
        &self.angles[leg.index()]
    }
}
