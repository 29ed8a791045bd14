//! Deduplicating, speed-checked view over a command source

use super::{CommandRecord, CommandSource, Request};
use crate::config::SpeedConfig;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::collections::VecDeque;

/// A record cleared for dispatch
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Accepted {
    pub id: u64,
    pub request: Request,
    /// Resolved servo speed
    pub speed: u32,
}

/// Filters a [`CommandSource`] down to records worth dispatching
///
/// New records found while peeking for interrupts are stashed in arrival
/// order and handed out by [`CommandChannel::next`] before the source is
/// polled again, so peeking never loses a command. A stashed disable or exit
/// is handed out ahead of the rest. Re-fires of a held command are not
/// stashed; the source repeats them.
pub struct CommandChannel<S: CommandSource> {
    source: S,
    speed: SpeedConfig,
    last_id: Option<u64>,
    stashed: VecDeque<Accepted>,
}

impl<S: CommandSource> CommandChannel<S> {
    pub fn new(source: S, speed: SpeedConfig) -> Self {
        Self {
            source,
            speed,
            last_id: None,
            stashed: VecDeque::new(),
        }
    }

    /// Next command to dispatch, if any
    pub fn next(&mut self) -> Result<Option<Accepted>> {
        let interrupt = self.stashed.iter().position(|a| a.request.is_interrupt());
        if let Some(accepted) = self.stashed.remove(interrupt.unwrap_or(0)) {
            return Ok(Some(accepted));
        }
        Ok(self.poll()?.map(|(accepted, _)| accepted))
    }

    /// Whether a disable or exit is waiting
    ///
    /// Called between servo polls. Source errors are logged and read as
    /// "nothing pending".
    pub fn interrupt_pending(&mut self) -> bool {
        if self.stashed.iter().any(|a| a.request.is_interrupt()) {
            return true;
        }
        match self.poll() {
            Ok(Some((accepted, repeat))) => {
                if !repeat {
                    self.stashed.push_back(accepted);
                }
                accepted.request.is_interrupt()
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Command source error while peeking: {}", e);
                false
            }
        }
    }

    /// Resolve and range-check a record's speed
    pub fn resolve_speed(&self, record: &CommandRecord) -> Result<u32> {
        let speed = record.speed.unwrap_or(self.speed.default);
        if record.request.is_interrupt() || self.speed.accepts(speed) {
            Ok(speed)
        } else {
            Err(Error::InvalidSpeed {
                speed,
                min: self.speed.min,
                max: self.speed.max,
            })
        }
    }

    /// Fetch and filter one record; the flag marks a re-fire of the last id
    fn poll(&mut self) -> Result<Option<(Accepted, bool)>> {
        let Some(record) = self.source.fetch()? else {
            return Ok(None);
        };

        let repeat = self.last_id == Some(record.id);
        if repeat && !record.request.is_continuous() {
            return Ok(None);
        }
        self.last_id = Some(record.id);

        match self.resolve_speed(&record) {
            Ok(speed) => {
                debug!("Accepted command {} ({}) at speed {}", record.id, record.request, speed);
                let accepted = Accepted {
                    id: record.id,
                    request: record.request,
                    speed,
                };
                Ok(Some((accepted, repeat)))
            }
            Err(e) => {
                warn!("Ignoring command {} ({}): {}", record.id, record.request, e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::QueueCommandSource;
    use pada_kine::Command;

    fn channel() -> (QueueCommandSource, CommandChannel<QueueCommandSource>) {
        let queue = QueueCommandSource::new();
        let channel = CommandChannel::new(queue.clone(), SpeedConfig::default());
        (queue, channel)
    }

    fn motion(id: u64, command: Command, speed: Option<u32>) -> CommandRecord {
        CommandRecord::new(id, Request::Motion(command), speed)
    }

    #[test]
    fn test_dedup_except_continuous() {
        let (queue, mut channel) = channel();
        queue.push(motion(1, Command::Reset, None));
        queue.push(motion(1, Command::Reset, None));
        queue.push(motion(2, Command::ForwardTwoLegged, Some(500)));
        queue.push(motion(2, Command::ForwardTwoLegged, Some(500)));

        assert_eq!(channel.next().unwrap().unwrap().id, 1);
        assert_eq!(channel.next().unwrap(), None);
        let held = channel.next().unwrap().unwrap();
        assert_eq!(held.speed, 500);
        assert_eq!(channel.next().unwrap(), Some(held));
        assert_eq!(channel.next().unwrap(), None);
    }

    #[test]
    fn test_speed_out_of_range_is_ignored() {
        let (queue, mut channel) = channel();
        queue.push(motion(1, Command::Up, Some(50)));
        queue.push(motion(2, Command::Up, Some(20000)));
        queue.push(motion(3, Command::Up, None));

        assert_eq!(channel.next().unwrap(), None);
        assert_eq!(channel.next().unwrap(), None);
        assert_eq!(channel.next().unwrap().unwrap().speed, 400);
    }

    #[test]
    fn test_interrupt_skips_speed_check() {
        let (queue, mut channel) = channel();
        queue.push(CommandRecord::new(1, Request::DisableTorque, Some(0)));
        assert!(channel.interrupt_pending());
        // Still pending until consumed
        assert!(channel.interrupt_pending());
        assert_eq!(channel.next().unwrap().unwrap().request, Request::DisableTorque);
        assert!(!channel.interrupt_pending());
    }

    #[test]
    fn test_peek_stashes_other_commands() {
        let (queue, mut channel) = channel();
        queue.push(motion(7, Command::Reset, None));
        assert!(!channel.interrupt_pending());
        assert!(queue.is_empty());
        assert_eq!(channel.next().unwrap().unwrap().id, 7);
    }

    #[test]
    fn test_peeked_commands_keep_their_order() {
        let (queue, mut channel) = channel();
        queue.push(motion(1, Command::Reset, None));
        queue.push(motion(2, Command::Up, None));
        assert!(!channel.interrupt_pending());
        assert!(!channel.interrupt_pending());
        assert!(queue.is_empty());

        let ids: Vec<u64> = std::iter::from_fn(|| channel.next().unwrap())
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_stashed_interrupt_goes_first() {
        let (queue, mut channel) = channel();
        queue.push(motion(1, Command::Reset, None));
        queue.push(CommandRecord::new(2, Request::DisableTorque, None));
        queue.push(motion(3, Command::Up, None));
        assert!(!channel.interrupt_pending());
        assert!(channel.interrupt_pending());
        // Found in the stash, the source is left alone
        assert!(channel.interrupt_pending());
        assert_eq!(queue.len(), 1);

        assert_eq!(channel.next().unwrap().unwrap().request, Request::DisableTorque);
        assert_eq!(channel.next().unwrap().unwrap().id, 1);
        assert_eq!(channel.next().unwrap().unwrap().id, 3);
        assert_eq!(channel.next().unwrap(), None);
    }

    #[test]
    fn test_peek_leaves_held_command_to_source() {
        let (queue, mut channel) = channel();
        queue.push(motion(3, Command::LookLeft, None));
        queue.push(motion(3, Command::LookLeft, None));
        assert_eq!(channel.next().unwrap().unwrap().id, 3);
        assert!(!channel.interrupt_pending());
        assert_eq!(channel.next().unwrap(), None);
    }

    #[test]
    fn test_invalid_speed_error() {
        let (_, channel) = channel();
        assert!(matches!(
            channel.resolve_speed(&motion(1, Command::Up, Some(5))),
            Err(Error::InvalidSpeed {
                speed: 5,
                min: 100,
                max: 10000
            })
        ));
    }
}
