//! Command channel
//!
//! Operators publish `id,name[,speed]` records. The channel drops records it
//! has already seen (except continuous motion, which re-fires while held) and
//! records whose speed is out of range.

mod channel;
mod source;

pub use channel::{Accepted, CommandChannel};
pub use source::{CommandSource, FileCommandSource, QueueCommandSource};

use crate::error::{Error, Result};
use pada_kine::Command;
use std::fmt;
use std::str::FromStr;

/// What a record asks the daemon to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    /// Locomotion command for the composer
    Motion(Command),
    DisableTorque,
    EnableTorque,
    Exit,
}

impl Request {
    /// Re-fires on every poll while held
    pub fn is_continuous(self) -> bool {
        matches!(self, Request::Motion(command) if command.is_continuous())
    }

    /// Bypasses pacing and interrupts convergence
    pub fn is_interrupt(self) -> bool {
        matches!(self, Request::DisableTorque | Request::Exit)
    }
}

impl FromStr for Request {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "disable_torque" => Ok(Request::DisableTorque),
            "enable_torque" => Ok(Request::EnableTorque),
            "exit" => Ok(Request::Exit),
            other => Ok(Request::Motion(other.parse()?)),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Motion(command) => write!(f, "{}", command),
            Request::DisableTorque => f.write_str("disable_torque"),
            Request::EnableTorque => f.write_str("enable_torque"),
            Request::Exit => f.write_str("exit"),
        }
    }
}

/// One record from the command channel
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CommandRecord {
    /// Monotonic id assigned by the publisher
    pub id: u64,
    pub request: Request,
    /// Servo speed; the configured default applies when absent
    pub speed: Option<u32>,
}

impl CommandRecord {
    pub fn new(id: u64, request: Request, speed: Option<u32>) -> Self {
        Self { id, request, speed }
    }

    /// Parse an `id,name[,speed]` line
    pub fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
        let (id, name, speed) = match fields.as_slice() {
            [id, name] => (*id, *name, None),
            [id, name, speed] => (*id, *name, Some(*speed)),
            _ => {
                return Err(Error::MalformedCommand(format!(
                    "expected id,name[,speed], got '{}'",
                    line.trim()
                )));
            }
        };

        let id = id
            .parse::<u64>()
            .map_err(|e| Error::MalformedCommand(format!("id '{}': {}", id, e)))?;
        let speed = match speed {
            Some(s) if !s.is_empty() => Some(
                s.parse::<u32>()
                    .map_err(|e| Error::MalformedCommand(format!("speed '{}': {}", s, e)))?,
            ),
            _ => None,
        };
        Ok(Self {
            id,
            request: name.parse()?,
            speed,
        })
    }
}
