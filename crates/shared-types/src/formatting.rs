//! # Payload Formatting Port
//!
//! Formatting is an external collaborator: a pure function from raw payload
//! bytes and a formatter configuration to a display string. Stores invoke it
//! once per received message before insertion.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from payload formatting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatterError {
    /// The payload could not be converted with the configured method.
    #[error("Cannot format payload with formatter '{formatter}': {reason}")]
    Conversion { formatter: String, reason: String },
}

/// Formatter configuration, owned by the external configuration layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatterDetails {
    /// Formatter id, referenced from store configuration.
    pub id: String,
    /// Human-readable name.
    pub name: String,
}

impl FormatterDetails {
    /// The built-in plain formatter configuration.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            id: "default".into(),
            name: "Plain".into(),
        }
    }
}

/// Pure payload-formatting collaborator.
pub trait PayloadFormatter: Send + Sync {
    /// Format a raw payload for display.
    ///
    /// # Errors
    ///
    /// Returns [`FormatterError::Conversion`] when the payload cannot be
    /// represented with the configured conversion method.
    fn format(&self, payload: &[u8], details: &FormatterDetails) -> Result<String, FormatterError>;
}

/// Default formatter: lossy UTF-8 passthrough. Never fails.
#[derive(Debug, Default)]
pub struct PlainFormatter;

impl PayloadFormatter for PlainFormatter {
    fn format(&self, payload: &[u8], _details: &FormatterDetails) -> Result<String, FormatterError> {
        Ok(String::from_utf8_lossy(payload).into_owned())
    }
}
