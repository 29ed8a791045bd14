//! ChalanIO - command loop and servo convergence for the pada-kine walker
//!
//! This library holds everything between the operator's command channel and
//! the servo bus:
//!
//! - [`config`]: TOML application config, embedding the kinematics config
//! - [`command`]: command records, file and in-memory sources, dedup
//! - [`servo`]: the servo bus trait, a mock bus and the convergence loop
//! - [`processor`]: the single-threaded command-processing loop

pub mod command;
pub mod config;
pub mod error;
pub mod processor;
pub mod servo;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
pub use processor::{Flow, Processor};
pub use servo::{MockServoBus, ServoBus};
