//! Tracks metadata for a parsing session.
//!
//! The parsers don't have global state, so anything that spans a whole parse
//! (currently just "is logging enabled") lives in a [`Session`] that the
//! caller creates once and passes around.

use crate::log;

/// Metadata for a parsing session.
#[derive(Clone, Default)]
pub struct Session {
    log_enabled: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            log_enabled: log::log_enabled(),
        }
    }

    pub fn log_enabled(&self) -> bool {
        self.log_enabled
    }
}
