//! Kinematic pose model, snapshots and servo conversion.

mod convert;
mod leg;
mod model;
mod snapshot;

pub use convert::{ServoPose, from_servo, leg_from_servo, leg_to_servo, to_servo};
pub use leg::{Leg, LegId};
pub use model::PoseModel;
pub use snapshot::{MoveKind, PoseSnapshot};
