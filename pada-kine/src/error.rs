//! Error types for pada-kine

use crate::pose::LegId;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Kinematics and planning errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Foot target lies outside the leg's physical envelope
    #[error("Unreachable target: reach {reach:.2}, drop {drop:.2}")]
    Unreachable {
        /// Horizontal distance from the shoulder point
        reach: f64,
        /// Vertical offset from the hip
        drop: f64,
    },

    /// A geometric solution exists but no candidate satisfies the joint limits
    #[error("Constraint violated: {joint} = {value:.2}")]
    ConstraintViolated {
        /// Joint or coupled range that failed
        joint: &'static str,
        /// Offending value in degrees (NaN when no single value applies)
        value: f64,
    },

    /// Soft look/offset envelope would be exceeded
    #[error("Envelope exceeded: {axis} would reach {value:.2} (limit {limit:.2})")]
    EnvelopeExceeded {
        /// Envelope axis
        axis: &'static str,
        /// Value the command would produce
        value: f64,
        /// Configured limit
        limit: f64,
    },

    /// Planned foot trajectory intersects an obstacle
    #[error("Collision detected for leg {leg}")]
    CollisionDetected {
        /// Leg whose trajectory collided
        leg: LegId,
    },

    /// Foot would land too close to an obstacle edge
    #[error("Unsafe foothold at ({x:.1}, {y:.1}): {reason}")]
    UnsafeFoothold {
        /// Foot x
        x: f64,
        /// Foot y
        y: f64,
        /// Which edge was too close
        reason: String,
    },

    /// No enumerated plan reached the target
    #[error("Plan search exhausted after {evaluated} candidates")]
    PlanExhausted {
        /// Number of simulated candidates
        evaluated: usize,
    },

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Command name not recognised by the composer
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Malformed obstacle description
    #[error("Invalid obstacle: {0}")]
    InvalidObstacle(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("Config serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// True for the two solver failures that abort a command
    pub fn is_kinematic(&self) -> bool {
        matches!(
            self,
            Error::Unreachable { .. } | Error::ConstraintViolated { .. }
        )
    }
}
