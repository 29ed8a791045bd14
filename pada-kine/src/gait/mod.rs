//! Gait primitives, the trot state machine, the soft envelope and the
//! command composer.

mod command;
mod envelope;
mod forwarder;
mod primitives;

pub use command::{Command, ComposedPose, Sequencer};
pub use envelope::Envelope;
pub use forwarder::{Forwarder, GaitPhase, TrotGait, TrotPace, TrotStep};
pub use primitives::{
    BACKWARD_ORDER, DiagonalPair, FORWARD_ORDER, GaitPrimitives, STRAFE_LEFT_ORDER, STRAFE_RIGHT_ORDER,
};
