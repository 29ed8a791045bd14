//! Configuration for ChalanIO
//!
//! One TOML file covers the command channel, speed range, servo convergence
//! tuning and the embedded kinematics configuration. Every field has a
//! default, so a partial file (or none at all) is valid.

use crate::error::{Error, Result};
use pada_kine::KineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level application configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub command: CommandConfig,
    #[serde(default)]
    pub speed: SpeedConfig,
    #[serde(default)]
    pub servo: ServoConfig,
    #[serde(default)]
    pub kinematics: KineConfig,
}

/// Command channel settings
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CommandConfig {
    /// File holding the latest `id,name,speed` record (default: /tmp/chalan.cmd)
    #[serde(default = "default_command_file")]
    pub file: PathBuf,

    /// Delay between command polls in milliseconds (default: 20)
    #[serde(default = "default_command_poll_ms")]
    pub poll_interval_ms: u64,
}

/// Servo speed range
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SpeedConfig {
    /// Speed used when a record leaves it out (default: 400)
    #[serde(default = "default_speed")]
    pub default: u32,

    /// Speed for body moves and the initial pose (default: 800)
    #[serde(default = "default_body_speed")]
    pub body: u32,

    /// Speed for every pose of a running trot (default: 150)
    #[serde(default = "default_run_speed")]
    pub run: u32,

    /// Lowest accepted speed, also the minimum interpolation rate (default: 100)
    #[serde(default = "default_min_speed")]
    pub min: u32,

    /// Highest accepted speed (default: 10000)
    #[serde(default = "default_max_speed")]
    pub max: u32,
}

/// Convergence loop tuning
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServoConfig {
    /// Deviation in degrees counted as converged (default: 2.5)
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Poll-to-poll movement in degrees below which servos count as stalled (default: 0.5)
    #[serde(default = "default_stall_tolerance")]
    pub stall_tolerance: f64,

    /// Multiple of the tolerance treated as catastrophic when stalled (default: 3)
    #[serde(default = "default_catastrophic_factor")]
    pub catastrophic_factor: f64,

    /// Poll bound per pose (default: 50)
    #[serde(default = "default_max_polls")]
    pub max_polls: usize,

    /// Poll cadence in milliseconds (default: 30)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Wait after issuing a pose in milliseconds (default: 50)
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Joint delta in degrees that runs at the nominal speed (default: 45)
    #[serde(default = "default_reference_delta")]
    pub reference_delta: f64,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            file: default_command_file(),
            poll_interval_ms: default_command_poll_ms(),
        }
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            default: default_speed(),
            body: default_body_speed(),
            run: default_run_speed(),
            min: default_min_speed(),
            max: default_max_speed(),
        }
    }
}

impl SpeedConfig {
    /// Whether a command speed lies in the accepted range
    pub fn accepts(&self, speed: u32) -> bool {
        (self.min..=self.max).contains(&speed)
    }
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            stall_tolerance: default_stall_tolerance(),
            catastrophic_factor: default_catastrophic_factor(),
            max_polls: default_max_polls(),
            poll_interval_ms: default_poll_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            reference_delta: default_reference_delta(),
        }
    }
}

impl ServoConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Deviation beyond which a stalled servo is not corrected
    pub fn catastrophic_limit(&self) -> f64 {
        self.tolerance * self.catastrophic_factor
    }
}

// Default value functions
fn default_command_file() -> PathBuf {
    PathBuf::from("/tmp/chalan.cmd")
}
fn default_command_poll_ms() -> u64 {
    20
}
fn default_speed() -> u32 {
    400
}
fn default_body_speed() -> u32 {
    800
}
fn default_run_speed() -> u32 {
    150
}
fn default_min_speed() -> u32 {
    100
}
fn default_max_speed() -> u32 {
    10000
}
fn default_tolerance() -> f64 {
    2.5
}
fn default_stall_tolerance() -> f64 {
    0.5
}
fn default_catastrophic_factor() -> f64 {
    3.0
}
fn default_max_polls() -> usize {
    50
}
fn default_poll_interval_ms() -> u64 {
    30
}
fn default_settle_delay_ms() -> u64 {
    50
}
fn default_reference_delta() -> f64 {
    45.0
}

impl AppConfig {
    /// Load and validate configuration from a TOML file
    ///
    /// # Example
    /// ```no_run
    /// use chalan_io::config::AppConfig;
    ///
    /// let config = AppConfig::from_file("/etc/chalan.toml")?;
    /// println!("Commands from {}", config.command.file.display());
    /// # Ok::<(), chalan_io::Error>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write configuration as pretty TOML
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let speed = &self.speed;
        if speed.min == 0 || speed.min > speed.max {
            return Err(Error::InvalidConfig(format!(
                "speed range {}..={} is empty or starts at 0",
                speed.min, speed.max
            )));
        }
        for (name, value) in [
            ("default", speed.default),
            ("body", speed.body),
            ("run", speed.run),
        ] {
            if !speed.accepts(value) {
                return Err(Error::InvalidConfig(format!(
                    "{} speed {} outside {}..={}",
                    name, value, speed.min, speed.max
                )));
            }
        }

        let servo = &self.servo;
        if servo.tolerance <= 0.0 || servo.stall_tolerance <= 0.0 {
            return Err(Error::InvalidConfig(
                "servo tolerances must be positive".to_string(),
            ));
        }
        if servo.catastrophic_factor < 1.0 {
            return Err(Error::InvalidConfig(format!(
                "catastrophic factor {} below 1",
                servo.catastrophic_factor
            )));
        }
        if servo.max_polls == 0 || servo.reference_delta <= 0.0 {
            return Err(Error::InvalidConfig(
                "max_polls and reference_delta must be positive".to_string(),
            ));
        }

        self.kinematics.validate()?;
        Ok(())
    }
}
