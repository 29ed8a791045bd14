//! Mapping between internal joint angles and physical servo angles.
//!
//! Internal angles are radians with yaw measured in the body frame. Servo
//! angles are degrees, four per leg in the order yaw, alpha, beta, gamma:
//!
//! - yaw is relative to the leg's mounting direction
//! - the knee servo turns the opposite way, so beta is negated
//! - the ankle carries a configurable bias
//!
//! Forward conversion rounds to 2 decimals, back-conversion to 4.

use serde::{Deserialize, Serialize};

use super::leg::LegId;
use crate::config::ServoMapConfig;
use crate::core::{round_to, wrap_degrees, wrap_radians};
use crate::ik::JointAngles;

/// Sixteen servo angles in degrees, four per leg in leg-number order
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServoPose(pub [f64; 16]);

impl ServoPose {
    /// The four servo angles of one leg
    pub fn leg(&self, leg: LegId) -> [f64; 4] {
        let i = leg.index() * 4;
        [self.0[i], self.0[i + 1], self.0[i + 2], self.0[i + 3]]
    }

    pub fn values(&self) -> &[f64; 16] {
        &self.0
    }

    /// Largest absolute per-servo difference
    pub fn max_abs_diff(&self, other: &ServoPose) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    /// Apply a function to every servo angle
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> ServoPose {
        let mut out = self.0;
        for v in out.iter_mut() {
            *v = f(*v);
        }
        ServoPose(out)
    }

    /// Element-wise `self - other`
    pub fn minus(&self, other: &ServoPose) -> ServoPose {
        let mut out = self.0;
        for (v, o) in out.iter_mut().zip(other.0.iter()) {
            *v -= o;
        }
        ServoPose(out)
    }
}

impl Default for ServoPose {
    fn default() -> Self {
        ServoPose([0.0; 16])
    }
}

/// Convert one leg's angles to servo degrees
pub fn leg_to_servo(leg: LegId, angles: &JointAngles, map: &ServoMapConfig) -> [f64; 4] {
    [
        round_to(wrap_degrees(angles.tetta.to_degrees() - leg.mount_yaw_deg()), 2),
        round_to(angles.alpha.to_degrees(), 2),
        round_to(-angles.beta.to_degrees(), 2),
        round_to(angles.gamma.to_degrees() - map.ankle_bias_deg, 2),
    ]
}

/// Convert one leg's servo degrees back to internal angles
pub fn leg_from_servo(leg: LegId, servo: [f64; 4], map: &ServoMapConfig) -> JointAngles {
    JointAngles {
        tetta: round_to(wrap_radians((servo[0] + leg.mount_yaw_deg()).to_radians()), 4),
        alpha: round_to(servo[1].to_radians(), 4),
        beta: round_to((-servo[2]).to_radians(), 4),
        gamma: round_to((servo[3] + map.ankle_bias_deg).to_radians(), 4),
    }
}

/// Convert a full pose to servo convention
pub fn to_servo(angles: &[JointAngles; 4], map: &ServoMapConfig) -> ServoPose {
    let mut out = [0.0; 16];
    for leg in LegId::ALL {
        let servo = leg_to_servo(leg, &angles[leg.index()], map);
        out[leg.index() * 4..leg.index() * 4 + 4].copy_from_slice(&servo);
    }
    ServoPose(out)
}

/// Convert a full servo pose back to internal convention
pub fn from_servo(pose: &ServoPose, map: &ServoMapConfig) -> [JointAngles; 4] {
    LegId::ALL.map(|leg| leg_from_servo(leg, pose.leg(leg), map))
}
