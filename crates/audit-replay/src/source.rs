//! # Audit Sources
//!
//! Sequential readers over captured message logs. The replay engine only
//! needs "how many records" and "give me the next line"; anything that can
//! answer those two questions can feed a replay.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Errors opening or reading an audit log.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The log file could not be opened or read.
    #[error("Audit log I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Sequential reader over a captured message log.
pub trait AuditSource: Send {
    /// Total number of records in the source.
    fn message_count(&self) -> usize;

    /// The next raw record line, or `None` at end of log.
    fn next_record(&mut self) -> Option<String>;
}

/// Line-oriented audit log on disk, one record per line.
///
/// The line count is taken with a full pass at open so progress reporting
/// has a denominator; reading then restarts from the top.
pub struct FileAuditSource {
    reader: BufReader<File>,
    count: usize,
}

impl FileAuditSource {
    /// Open an audit log and count its records.
    ///
    /// # Errors
    ///
    /// Returns a [`ReplayError::Io`] when the file cannot be opened or read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let count = BufReader::new(File::open(path)?).lines().count();
        info!(path = %path.display(), count, "Opened audit log");

        Ok(Self {
            reader: BufReader::new(File::open(path)?),
            count,
        })
    }
}

impl AuditSource for FileAuditSource {
    fn message_count(&self) -> usize {
        self.count
    }

    fn next_record(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_owned()),
            Err(error) => {
                warn!(%error, "Audit log read failed, ending replay input");
                None
            }
        }
    }
}
