//! Error kinds surfaced to the user.
//!
//! None of these end the session: the UI renders each one as a message
//! (status bar, chart warning or assistant reply).

use thiserror::Error;

use crate::formats::UploadError;
use crate::gateway::GatewayError;
use crate::stats::StatsError;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The upload could not be read or decoded
    #[error("Error processing genome file: {0}")]
    Parse(#[from] UploadError),

    /// The statistic does not apply to this sequence
    #[error("{0}")]
    UnsupportedInput(#[from] StatsError),

    /// The LLM endpoint could not produce a reply
    #[error("Error: {0}")]
    Gateway(#[from] GatewayError),
}

impl AnalysisError {
    /// Soft failures are shown as warnings rather than errors.
    pub fn is_warning(&self) -> bool {
        matches!(self, AnalysisError::UnsupportedInput(_))
    }

    /// The message followed by every underlying cause not already in it.
    pub fn with_causes(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        message
    }
}
