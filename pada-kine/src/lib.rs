//! PadaKine - quadruped leg kinematics and gait composition
//!
//! Turns symbolic locomotion commands into per-leg joint angles:
//!
//! - [`core`]: points, lines, segments and rounding helpers
//! - [`ik`]: leg inverse kinematics with joint limits and a memo table
//! - [`pose`]: the four-leg pose model, its snapshot history and the servo
//!   angle convention
//! - [`gait`]: gait primitives, the trot state machine, the soft envelope and
//!   the command composer
//! - [`planner`]: obstacle boxes, collision tests and plan search
//!
//! The crate never installs a logger; it only emits through `log`.
//!
//! # Example
//!
//! ```no_run
//! use pada_kine::{KineConfig, Sequencer};
//!
//! let config = KineConfig::default();
//! let mut sequencer = Sequencer::new(&config)?;
//! for pose in sequencer.compose("forward_two_legged")? {
//!     println!("{:?} {:?}", pose.kind, pose.servo);
//! }
//! # Ok::<(), pada_kine::Error>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod gait;
pub mod ik;
pub mod planner;
pub mod pose;

pub use config::KineConfig;
pub use crate::core::Point;
pub use error::{Error, Result};
pub use gait::{Command, ComposedPose, Sequencer};
pub use ik::{JointAngles, LegSolver, SolutionCache};
pub use planner::{Obstacle, PlanMove, Planner};
pub use pose::{LegId, MoveKind, PoseModel, ServoPose};
