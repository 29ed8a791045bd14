//! Servo bus boundary and the convergence loop
//!
//! The bus framing itself lives outside this crate; everything here talks to
//! the servos through [`ServoBus`].

mod convergence;
mod mock;

pub use convergence::{Convergence, ConvergenceLoop, interpolation_rate};
pub use mock::MockServoBus;

use crate::error::Result;
use pada_kine::ServoPose;

/// Servo bus trait for hardware abstraction
pub trait ServoBus: Send {
    /// Read back the sixteen servo angles in degrees
    fn current_angles(&mut self) -> Result<ServoPose>;

    /// Command every servo towards `pose`
    ///
    /// A rate of 0 moves at the servos' own maximum speed.
    fn issue(&mut self, pose: &ServoPose, rate: u32) -> Result<()>;

    /// Release all servos
    fn disable_torque(&mut self) -> Result<()>;

    /// Re-engage all servos at their current position
    fn enable_torque(&mut self) -> Result<()>;
}
