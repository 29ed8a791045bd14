//! Kinematic configuration
//!
//! Loaded once from TOML and treated as immutable afterwards. Every field has a
//! default so a partial file is valid. Lengths are in centimeters, angles in
//! degrees.

use crate::core::round_to;
use crate::error::{Error, Result};
use crate::ik::LegLimits;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level kinematic configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct KineConfig {
    #[serde(default)]
    pub geometry: LegGeometry,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub limits: LegLimits,
    #[serde(default)]
    pub servo_map: ServoMapConfig,
    #[serde(default)]
    pub stance: StanceConfig,
    #[serde(default)]
    pub gait: GaitConfig,
    #[serde(default)]
    pub envelope: EnvelopeConfig,
    #[serde(default)]
    pub obstacle: ObstacleConfig,
}

/// Link lengths shared by all four legs
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct LegGeometry {
    /// Proximal link (hip to knee)
    #[serde(default = "default_link_a")]
    pub a: f64,
    /// Distal link (knee to ankle)
    #[serde(default = "default_link_b")]
    pub b: f64,
    /// Toe link (ankle to foot); leave unset for the two-link model
    #[serde(default)]
    pub c: Option<f64>,
    /// Hip yaw axis to shoulder offset
    #[serde(default = "default_link_d")]
    pub d: f64,
    /// Hip point offset from the body center on both axes
    #[serde(default = "default_mount_offset")]
    pub mount_offset: f64,
}

impl Default for LegGeometry {
    fn default() -> Self {
        Self {
            a: default_link_a(),
            b: default_link_b(),
            c: Some(17.2),
            d: default_link_d(),
            mount_offset: default_mount_offset(),
        }
    }
}

impl LegGeometry {
    /// Longest straight-line reach from the shoulder
    pub fn max_reach(&self) -> f64 {
        self.a + self.b + self.c.unwrap_or(0.0)
    }
}

/// Wrist-orientation sweep used by the three-link solver
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SweepConfig {
    /// First sample (inclusive)
    #[serde(default = "default_sweep_min")]
    pub min_deg: i32,
    /// Last sample (exclusive)
    #[serde(default = "default_sweep_max")]
    pub max_deg: i32,
    #[serde(default = "default_sweep_step")]
    pub step_deg: i32,
    /// Preferred alpha + beta + gamma; -90 points the toe straight down
    #[serde(default = "default_ideal_surface")]
    pub ideal_surface_deg: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            min_deg: default_sweep_min(),
            max_deg: default_sweep_max(),
            step_deg: default_sweep_step(),
            ideal_surface_deg: default_ideal_surface(),
        }
    }
}

/// Internal to servo angle mapping
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ServoMapConfig {
    /// Offset subtracted from the ankle angle (degrees)
    #[serde(default)]
    pub ankle_bias_deg: f64,
}

/// Neutral standing pose
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct StanceConfig {
    /// Hip height above ground
    #[serde(default = "default_stance_vertical")]
    pub vertical: f64,
    /// Foot distance from the body center along x
    #[serde(default = "default_stance_horizontal")]
    pub horizontal_x: f64,
    /// Foot distance from the body center along y
    #[serde(default = "default_stance_horizontal")]
    pub horizontal_y: f64,
}

impl Default for StanceConfig {
    fn default() -> Self {
        Self {
            vertical: default_stance_vertical(),
            horizontal_x: default_stance_horizontal(),
            horizontal_y: default_stance_horizontal(),
        }
    }
}

/// Step lengths, lift heights and angles of the gait primitives
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GaitConfig {
    /// Distance from the diagonal intersection toward the opposite foot
    #[serde(default = "default_margin")]
    pub margin: f64,
    /// Lift height for compensated single-leg steps
    #[serde(default = "default_single_lift")]
    pub single_lift: f64,
    /// Lift height for diagonal-pair moves
    #[serde(default = "default_pair_lift")]
    pub pair_lift: f64,
    /// Half-step length of the two-legged trot
    #[serde(default = "default_trot_step")]
    pub trot_step: f64,
    /// Step length of one-legged walking
    #[serde(default = "default_single_step")]
    pub single_step: f64,
    /// Body shift per body_* command
    #[serde(default = "default_body_shift")]
    pub body_shift: f64,
    /// Body height change per up/down command
    #[serde(default = "default_up_down_step")]
    pub up_down_step: f64,
    /// Turn angle per turn command (degrees)
    #[serde(default = "default_turn_angle")]
    pub turn_angle: f64,
    /// Side look increment (degrees)
    #[serde(default = "default_side_look_step")]
    pub side_look_step: f64,
    /// Vertical look increment (degrees)
    #[serde(default = "default_vertical_look_step")]
    pub vertical_look_step: f64,
    /// Stance change per reposition command
    #[serde(default = "default_reposition_step")]
    pub reposition_step: f64,
    /// Half-step length of the running trot
    #[serde(default = "default_run_step")]
    pub run_step: f64,
    /// Lift height of the running trot
    #[serde(default = "default_run_lift")]
    pub run_lift: f64,
    /// Step height for climb_up / climb_down
    #[serde(default = "default_climb_height")]
    pub climb_height: f64,
    /// Pair step lengths of a climb, pairs 2-4 and 1-3 alternating
    ///
    /// Both pairs and the body must travel the same total distance.
    #[serde(default = "default_climb_steps")]
    pub climb_steps: Vec<f64>,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            single_lift: default_single_lift(),
            pair_lift: default_pair_lift(),
            trot_step: default_trot_step(),
            single_step: default_single_step(),
            body_shift: default_body_shift(),
            up_down_step: default_up_down_step(),
            turn_angle: default_turn_angle(),
            side_look_step: default_side_look_step(),
            vertical_look_step: default_vertical_look_step(),
            reposition_step: default_reposition_step(),
            run_step: default_run_step(),
            run_lift: default_run_lift(),
            climb_height: default_climb_height(),
            climb_steps: default_climb_steps(),
        }
    }
}

impl GaitConfig {
    /// Body advance after climb step `index`
    ///
    /// The whole first step, nothing on the last, half of it in between.
    pub fn climb_body_shift(&self, index: usize) -> f64 {
        let step = self.climb_steps.get(index).copied().unwrap_or(0.0);
        if index == 0 {
            step
        } else if index + 1 >= self.climb_steps.len() {
            0.0
        } else {
            round_to(step / 2.0, 1)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.run_step <= 0.0 || self.run_lift <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "run step and lift must be positive (step = {}, lift = {})",
                self.run_step, self.run_lift
            )));
        }
        if self.climb_steps.is_empty() || self.climb_steps.iter().any(|&s| s <= 0.0) {
            return Err(Error::InvalidConfig(
                "climb steps must be a non-empty list of positive lengths".to_string(),
            ));
        }
        let even: f64 = self.climb_steps.iter().step_by(2).sum();
        let odd: f64 = self.climb_steps.iter().skip(1).step_by(2).sum();
        let body: f64 = (0..self.climb_steps.len())
            .map(|i| self.climb_body_shift(i))
            .sum();
        if (even - odd).abs() > 1e-6 || (even - body).abs() > 1e-6 {
            return Err(Error::InvalidConfig(format!(
                "climb steps travel unevenly (pair 2-4 {}, pair 1-3 {}, body {})",
                even, odd, body
            )));
        }
        Ok(())
    }
}

/// Soft limits, tighter than the joint limits
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EnvelopeConfig {
    #[serde(default = "default_body_offset_limit")]
    pub body_forward: f64,
    #[serde(default = "default_body_offset_limit")]
    pub body_backward: f64,
    #[serde(default = "default_body_offset_limit")]
    pub body_sideways: f64,
    /// Cumulative side look, either direction (degrees)
    #[serde(default = "default_side_look_limit")]
    pub side_look: f64,
    /// Vertical look, either direction (degrees)
    #[serde(default = "default_vertical_look_limit")]
    pub vertical_look: f64,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            body_forward: default_body_offset_limit(),
            body_backward: default_body_offset_limit(),
            body_sideways: default_body_offset_limit(),
            side_look: default_side_look_limit(),
            vertical_look: default_vertical_look_limit(),
        }
    }
}

/// Clearances applied to every obstacle of a planning run
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ObstacleConfig {
    /// Minimum foot distance from an edge when stepping onto a box
    #[serde(default = "default_danger_margin")]
    pub danger_margin: f64,
    /// Outward plane offset for trajectory collision tests
    #[serde(default = "default_outer_danger_margin")]
    pub outer_danger_margin: f64,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            danger_margin: default_danger_margin(),
            outer_danger_margin: default_outer_danger_margin(),
        }
    }
}

// Geometry defaults
fn default_link_a() -> f64 {
    12.7
}
fn default_link_b() -> f64 {
    6.9
}
fn default_link_d() -> f64 {
    6.7
}
fn default_mount_offset() -> f64 {
    3.8
}

// Sweep defaults
fn default_sweep_min() -> i32 {
    -45
}
fn default_sweep_max() -> i32 {
    45
}
fn default_sweep_step() -> i32 {
    1
}
fn default_ideal_surface() -> f64 {
    -90.0
}

// Stance defaults
fn default_stance_vertical() -> f64 {
    14.0
}
fn default_stance_horizontal() -> f64 {
    15.0
}

// Gait defaults
fn default_margin() -> f64 {
    3.0
}
fn default_single_lift() -> f64 {
    6.0
}
fn default_pair_lift() -> f64 {
    5.0
}
fn default_trot_step() -> f64 {
    4.0
}
fn default_single_step() -> f64 {
    8.0
}
fn default_body_shift() -> f64 {
    7.0
}
fn default_up_down_step() -> f64 {
    2.0
}
fn default_turn_angle() -> f64 {
    25.0
}
fn default_side_look_step() -> f64 {
    12.0
}
fn default_vertical_look_step() -> f64 {
    30.0
}
fn default_reposition_step() -> f64 {
    1.0
}
fn default_run_step() -> f64 {
    4.0
}
fn default_run_lift() -> f64 {
    3.0
}
fn default_climb_height() -> f64 {
    2.0
}
fn default_climb_steps() -> Vec<f64> {
    vec![4.0, 6.0, 6.0, 6.0, 4.0, 6.0, 4.0]
}

// Envelope defaults
fn default_body_offset_limit() -> f64 {
    7.0
}
fn default_side_look_limit() -> f64 {
    24.0
}
fn default_vertical_look_limit() -> f64 {
    30.0
}

// Obstacle defaults
fn default_danger_margin() -> f64 {
    1.0
}
fn default_outer_danger_margin() -> f64 {
    2.0
}

impl KineConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: KineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject configurations the solver cannot work with
    pub fn validate(&self) -> Result<()> {
        let g = &self.geometry;
        if g.a <= 0.0 || g.b <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "link lengths must be positive (a = {}, b = {})",
                g.a, g.b
            )));
        }
        if let Some(c) = g.c
            && c <= 0.0
        {
            return Err(Error::InvalidConfig(format!(
                "toe link must be positive when set (c = {})",
                c
            )));
        }
        if g.d < 0.0 || g.mount_offset < 0.0 {
            return Err(Error::InvalidConfig(
                "hip offsets must not be negative".to_string(),
            ));
        }
        if self.sweep.step_deg <= 0 {
            return Err(Error::InvalidConfig(format!(
                "sweep step must be positive (got {})",
                self.sweep.step_deg
            )));
        }
        if self.sweep.min_deg >= self.sweep.max_deg {
            return Err(Error::InvalidConfig(format!(
                "sweep range is empty ({}..{})",
                self.sweep.min_deg, self.sweep.max_deg
            )));
        }
        if self.stance.vertical <= 0.0 {
            return Err(Error::InvalidConfig(
                "stance height must be positive".to_string(),
            ));
        }
        self.limits.validate()?;
        self.gait.validate()?;
        Ok(())
    }
}
