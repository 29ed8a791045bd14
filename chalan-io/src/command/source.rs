//! Raw command sources

use super::CommandRecord;
use crate::error::Result;
use log::warn;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Producer of raw command records
pub trait CommandSource {
    /// Latest record, if one is available
    ///
    /// Sources do not deduplicate; the same record may come back on every
    /// call.
    fn fetch(&mut self) -> Result<Option<CommandRecord>>;
}

/// Reads the last record of a file the operator overwrites
#[derive(Debug)]
pub struct FileCommandSource {
    path: PathBuf,
    last_rejected: Option<String>,
}

impl FileCommandSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            last_rejected: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CommandSource for FileCommandSource {
    fn fetch(&mut self) -> Result<Option<CommandRecord>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let Some(line) = contents.lines().map(str::trim).rev().find(|l| !l.is_empty()) else {
            return Ok(None);
        };

        match CommandRecord::parse(line) {
            Ok(record) => {
                self.last_rejected = None;
                Ok(Some(record))
            }
            Err(e) => {
                // The file keeps the bad line until overwritten; report it once
                if self.last_rejected.as_deref() != Some(line) {
                    warn!("Ignoring command line '{}': {}", line, e);
                    self.last_rejected = Some(line.to_string());
                }
                Ok(None)
            }
        }
    }
}

/// In-memory FIFO of records
///
/// Clones share the queue, so a producer can keep pushing while the command
/// loop owns the source.
#[derive(Clone, Debug, Default)]
pub struct QueueCommandSource {
    queue: Arc<Mutex<VecDeque<CommandRecord>>>,
}

impl QueueCommandSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: CommandRecord) {
        self.queue.lock().push_back(record);
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl CommandSource for QueueCommandSource {
    fn fetch(&mut self) -> Result<Option<CommandRecord>> {
        Ok(self.queue.lock().pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Request;
    use pada_kine::Command;

    #[test]
    fn test_file_source_reads_last_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmd");
        let mut source = FileCommandSource::new(&path);
        assert_eq!(source.fetch().unwrap(), None);

        fs::write(&path, "1,up,400\n2,down,400\n\n").unwrap();
        let record = source.fetch().unwrap().unwrap();
        assert_eq!(record.id, 2);
        assert_eq!(record.request, Request::Motion(Command::Down));

        // Unchanged file returns the same record again
        assert_eq!(source.fetch().unwrap(), Some(record));
    }

    #[test]
    fn test_file_source_skips_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmd");
        fs::write(&path, "garbage").unwrap();
        let mut source = FileCommandSource::new(&path);
        assert_eq!(source.fetch().unwrap(), None);
        assert_eq!(source.fetch().unwrap(), None);

        fs::write(&path, "4,exit").unwrap();
        assert_eq!(source.fetch().unwrap().unwrap().request, Request::Exit);
    }

    #[test]
    fn test_queue_source_is_fifo() {
        let producer = QueueCommandSource::new();
        let mut source = producer.clone();
        producer.push(CommandRecord::new(1, Request::Exit, None));
        producer.push(CommandRecord::new(2, Request::EnableTorque, None));
        assert_eq!(source.fetch().unwrap().unwrap().id, 1);
        assert_eq!(producer.len(), 1);
        assert_eq!(source.fetch().unwrap().unwrap().id, 2);
        assert_eq!(source.fetch().unwrap(), None);
        assert!(producer.is_empty());
    }
}
