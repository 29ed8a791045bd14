//! Soft limits on look angles and body offset.
//!
//! The envelope tracks what the body_* and look_* commands have accumulated
//! since the last reset. It is checked before a command runs and updated only
//! after the command succeeds.

use crate::config::EnvelopeConfig;
use crate::error::{Error, Result};

const SLACK: f64 = 1e-9;

/// Cumulative look and offset state
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    limits: EnvelopeConfig,
    body_x: f64,
    body_y: f64,
    side_look: f64,
    vertical_look: f64,
}

impl Envelope {
    pub fn new(limits: EnvelopeConfig) -> Self {
        Self {
            limits,
            body_x: 0.0,
            body_y: 0.0,
            side_look: 0.0,
            vertical_look: 0.0,
        }
    }

    /// Body offset (x, y) since the last centering
    pub fn body_offset(&self) -> (f64, f64) {
        (self.body_x, self.body_y)
    }

    /// Cumulative side look in degrees, positive to the right
    pub fn side_look(&self) -> f64 {
        self.side_look
    }

    /// Vertical look in degrees, positive up
    pub fn vertical_look(&self) -> f64 {
        self.vertical_look
    }

    /// Check that shifting the body by (dx, dy) stays inside the envelope
    pub fn check_body_shift(&self, dx: f64, dy: f64) -> Result<()> {
        let (x, y) = (self.body_x + dx, self.body_y + dy);
        if y > self.limits.body_forward + SLACK {
            return Err(exceeded("body_forward", y, self.limits.body_forward));
        }
        if -y > self.limits.body_backward + SLACK {
            return Err(exceeded("body_backward", y, -self.limits.body_backward));
        }
        if x.abs() > self.limits.body_sideways + SLACK {
            return Err(exceeded("body_sideways", x, self.limits.body_sideways));
        }
        Ok(())
    }

    pub fn apply_body_shift(&mut self, dx: f64, dy: f64) {
        self.body_x += dx;
        self.body_y += dy;
    }

    pub fn check_side_look(&self, delta: f64) -> Result<()> {
        let next = self.side_look + delta;
        if next.abs() > self.limits.side_look + SLACK {
            return Err(exceeded("side_look", next, self.limits.side_look));
        }
        Ok(())
    }

    pub fn apply_side_look(&mut self, delta: f64) {
        self.side_look += delta;
    }

    /// Check an absolute vertical look target
    pub fn check_vertical_look(&self, target: f64) -> Result<()> {
        if target.abs() > self.limits.vertical_look + SLACK {
            return Err(exceeded("vertical_look", target, self.limits.vertical_look));
        }
        Ok(())
    }

    pub fn set_vertical_look(&mut self, target: f64) {
        self.vertical_look = target;
    }

    /// Forget the body offset (after recentering)
    pub fn reset_body(&mut self) {
        self.body_x = 0.0;
        self.body_y = 0.0;
    }

    /// Forget both look angles (after returning the sight to normal)
    pub fn reset_look(&mut self) {
        self.side_look = 0.0;
        self.vertical_look = 0.0;
    }
}

fn exceeded(axis: &'static str, value: f64, limit: f64) -> Error {
    Error::EnvelopeExceeded { axis, value, limit }
}
