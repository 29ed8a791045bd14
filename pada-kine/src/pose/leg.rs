//! Leg identity and per-leg state.

use crate::core::Point;
use crate::error::Result;
use crate::ik::{JointAngles, LegSolver, LegType};

/// Leg number, counted clockwise from front-right when seen from above
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LegId {
    /// Front right, quadrant (+x, +y)
    One,
    /// Rear right, quadrant (+x, -y)
    Two,
    /// Rear left, quadrant (-x, -y)
    Three,
    /// Front left, quadrant (-x, +y)
    Four,
}

impl LegId {
    /// All legs in numbering order
    pub const ALL: [LegId; 4] = [LegId::One, LegId::Two, LegId::Three, LegId::Four];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            LegId::One => 0,
            LegId::Two => 1,
            LegId::Three => 2,
            LegId::Four => 3,
        }
    }

    #[inline]
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn from_number(n: u8) -> Option<LegId> {
        match n {
            1 => Some(LegId::One),
            2 => Some(LegId::Two),
            3 => Some(LegId::Three),
            4 => Some(LegId::Four),
            _ => None,
        }
    }

    pub fn leg_type(self) -> LegType {
        match self {
            LegId::One | LegId::Four => LegType::Front,
            LegId::Two | LegId::Three => LegType::Rear,
        }
    }

    /// Body-frame heading of the leg's neutral direction (degrees)
    ///
    /// This is also the fixed yaw bias of the physical servo.
    pub fn mount_yaw_deg(self) -> f64 {
        match self {
            LegId::One => 45.0,
            LegId::Two => -45.0,
            LegId::Three => -135.0,
            LegId::Four => 135.0,
        }
    }

    /// Diagonally opposite leg
    pub fn opposite(self) -> LegId {
        match self {
            LegId::One => LegId::Three,
            LegId::Two => LegId::Four,
            LegId::Three => LegId::One,
            LegId::Four => LegId::Two,
        }
    }

    /// Quadrant signs (x, y)
    pub fn quadrant(self) -> (f64, f64) {
        match self {
            LegId::One => (1.0, 1.0),
            LegId::Two => (1.0, -1.0),
            LegId::Three => (-1.0, -1.0),
            LegId::Four => (-1.0, 1.0),
        }
    }
}

impl std::fmt::Display for LegId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// One leg: hip point, foot point and the angles that join them
///
/// The angles are only ever replaced together with the points they were
/// solved for.
#[derive(Clone, Debug, PartialEq)]
pub struct Leg {
    id: LegId,
    hip: Point,
    foot: Point,
    angles: JointAngles,
}

impl Leg {
    /// Place a leg, solving its angles
    pub fn new(id: LegId, hip: Point, foot: Point, solver: &LegSolver) -> Result<Self> {
        let angles = solver.solve(hip, foot, id)?;
        Ok(Self {
            id,
            hip,
            foot,
            angles,
        })
    }

    pub fn id(&self) -> LegId {
        self.id
    }

    pub fn hip(&self) -> Point {
        self.hip
    }

    pub fn foot(&self) -> Point {
        self.foot
    }

    pub fn angles(&self) -> JointAngles {
        self.angles
    }

    /// Copy of this leg moved to new points, or the solver error
    pub(crate) fn relocated(&self, hip: Point, foot: Point, solver: &LegSolver) -> Result<Leg> {
        Leg::new(self.id, hip, foot, solver)
    }
}
