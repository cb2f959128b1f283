//! Import outcome reporting.

use serde::{Deserialize, Serialize};

/// Outcome of one catalogue import batch.
///
/// Partial success is the normal completion mode: each record persists or
/// fails independently and the batch always runs to the end.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImportReport {
    /// Number of records persisted successfully.
    pub success: usize,
    /// One message per failed record or per structural failure.
    pub errors: Vec<String>,
}

impl ImportReport {
    pub fn record_success(&mut self) {
        self.success += 1;
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
