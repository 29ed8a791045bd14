//! Closed-loop pose convergence
//!
//! ```text
//! issue(target, rate) ─► settle ─► read ─► poll ──► deviation <= tolerance ──► done
//!                                          ▲  │
//!                                          │  ├─ stalled, no correction yet:
//!                                          │  │    deviation > limit ──► ConvergenceFailed
//!                                          │  │    else issue(target - residual, 0)
//!                                          └──┘
//!                                 max polls spent ──► ConvergenceStalled
//! ```
//!
//! The interrupt predicate is checked before every poll, so a pending
//! disable or exit never waits for the loop to run out.

use super::ServoBus;
use crate::config::ServoConfig;
use crate::error::{Error, Result};
use log::{debug, trace, warn};
use pada_kine::ServoPose;
use pada_kine::core::round_to;
use std::thread;

/// Outcome of a converged pose
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Convergence {
    /// Polls until the deviation reached the tolerance
    pub polls: usize,
    /// Corrective re-commands issued (0 or 1)
    pub corrections: usize,
    /// Final deviation from the target in degrees
    pub deviation: f64,
}

/// Interpolation rate for a move of `max_delta` degrees
///
/// The rate scales with the largest joint delta so every servo arrives at
/// about the same time, and never drops below `min_rate`.
pub fn interpolation_rate(speed: u32, max_delta: f64, reference_delta: f64, min_rate: u32) -> u32 {
    let scaled = f64::from(speed) * max_delta / reference_delta;
    scaled.max(f64::from(min_rate)).round() as u32
}

/// Drives the servo bus to each target pose
#[derive(Clone, Debug)]
pub struct ConvergenceLoop {
    config: ServoConfig,
    min_rate: u32,
}

impl ConvergenceLoop {
    pub fn new(config: &ServoConfig, min_rate: u32) -> Self {
        Self {
            config: config.clone(),
            min_rate,
        }
    }

    pub fn config(&self) -> &ServoConfig {
        &self.config
    }

    /// Move the servos to `target` and wait until they get there
    ///
    /// # Errors
    /// - [`Error::Interrupted`] when `interrupted` returns true between polls
    /// - [`Error::ConvergenceFailed`] when the servos stall beyond the
    ///   catastrophic limit
    /// - [`Error::ConvergenceStalled`] when the poll bound runs out
    pub fn drive<B: ServoBus + ?Sized>(
        &self,
        bus: &mut B,
        target: &ServoPose,
        speed: u32,
        interrupted: &mut dyn FnMut() -> bool,
    ) -> Result<Convergence> {
        let start = bus.current_angles()?;
        let max_delta = start.max_abs_diff(target);
        let rate = interpolation_rate(speed, max_delta, self.config.reference_delta, self.min_rate);
        debug!("Issuing pose: max delta {:.2}, rate {}", max_delta, rate);

        bus.issue(target, rate)?;
        thread::sleep(self.config.settle_delay());

        let limit = self.config.catastrophic_limit();
        // Progress is measured from where the servos are once settled
        let mut previous = bus.current_angles()?;
        let mut corrections = 0;
        let mut deviation = max_delta;

        for poll in 1..=self.config.max_polls {
            if interrupted() {
                debug!("Convergence interrupted at poll {}", poll);
                return Err(Error::Interrupted);
            }
            if poll > 1 {
                thread::sleep(self.config.poll_interval());
            }

            let current = bus.current_angles()?;
            deviation = current.max_abs_diff(target);
            let progress = current.max_abs_diff(&previous);
            trace!(
                "Poll {}: deviation {:.2}, progress {:.2}",
                poll, deviation, progress
            );

            if deviation <= self.config.tolerance {
                return Ok(Convergence {
                    polls: poll,
                    corrections,
                    deviation,
                });
            }

            if progress <= self.config.stall_tolerance && corrections == 0 {
                if deviation > limit {
                    warn!(
                        "Servos stalled {:.2} from target (limit {:.2})",
                        deviation, limit
                    );
                    return Err(Error::ConvergenceFailed { deviation, limit });
                }
                let residual = current.minus(target);
                let corrected = target.minus(&residual).map(|v| round_to(v, 1));
                debug!("Correcting residual {:.2} at poll {}", deviation, poll);
                bus.issue(&corrected, 0)?;
                corrections += 1;
                thread::sleep(self.config.settle_delay());
            }

            previous = current;
        }

        Err(Error::ConvergenceStalled {
            polls: self.config.max_polls,
            deviation,
        })
    }
}
