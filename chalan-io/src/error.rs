//! Error types for ChalanIO

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// ChalanIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Kinematics, gait or planner failure
    #[error("Kinematics error: {0}")]
    Kinematics(#[from] pada_kine::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("Config serialize error: {0}")]
    ConfigSer(#[from] toml::ser::Error),

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Servos stopped short of the target after every poll
    #[error("Convergence stalled after {polls} polls, deviation {deviation:.2}")]
    ConvergenceStalled {
        /// Polls spent
        polls: usize,
        /// Final deviation from the target in degrees
        deviation: f64,
    },

    /// Servos stopped moving far from the target
    #[error("Convergence failed: deviation {deviation:.2} exceeds {limit:.2}")]
    ConvergenceFailed {
        /// Deviation from the target in degrees
        deviation: f64,
        /// Catastrophic limit
        limit: f64,
    },

    /// A disable or exit request arrived during convergence
    #[error("Interrupted")]
    Interrupted,

    /// Command speed outside the configured range
    #[error("Invalid speed {speed}: expected {min}..={max}")]
    InvalidSpeed {
        /// Requested speed
        speed: u32,
        /// Lowest accepted speed
        min: u32,
        /// Highest accepted speed
        max: u32,
    },

    /// Command record that could not be parsed
    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    /// Servo bus failure
    #[error("Servo bus error: {0}")]
    Bus(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
