//! One captured message as stored in an audit log.

use serde::Deserialize;

/// A single recorded message, one JSON object per log line.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReplayRecord {
    /// Topic the message was originally published on.
    pub topic: String,
    /// Payload text as captured.
    pub payload: String,
    /// Original receipt time, epoch milliseconds. Drives replay pacing.
    pub timestamp: u64,
}

impl ReplayRecord {
    /// Parse one log line.
    ///
    /// # Errors
    ///
    /// Returns the underlying deserialization error for a malformed line;
    /// the caller logs and skips the record.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
