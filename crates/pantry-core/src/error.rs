//! Error types for the pantry-core crate.

use thiserror::Error;

/// A caller-input problem. The message is surfaced to end users verbatim,
/// so it names the offending field and rule in plain language.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
