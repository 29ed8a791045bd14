//! Leg inverse kinematics with joint limits and memoization.

mod cache;
mod constraints;
mod solver;

pub use cache::{PlanarAngles, PlanarKey, PlanarOutcome, SolutionCache};
pub use constraints::{AngleConstraints, AngleRange, LegLimits, LegType, YawPitchCoupling};
pub use solver::{JointAngles, LegSolver};
