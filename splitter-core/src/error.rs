//! Failures that abort a whole split run.
//!
//! Per-entry problems (a malformed box, a degenerate region, a crop that fails to encode) are
//! not represented here: they are logged and dropped.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitError {
    /// The detection response has no list-valued `regions` field.
    #[error("malformed detection response: {0}")]
    MalformedResponse(String),
    /// The model text could not be parsed as JSON at all.
    #[error("detection payload is not valid JSON: {0}")]
    InvalidPayload(String),
    /// The source bitmap cannot provide pixel data.
    #[error("source image is unreadable: {0}")]
    SourceImageUnreadable(String),
}

impl SplitError {
    /// Message suitable for an end user, keeping structural and image failures apart.
    pub fn user_message(&self) -> &'static str {
        match self {
            SplitError::MalformedResponse(_) | SplitError::InvalidPayload(_) => {
                "Analysis failed. Please try again."
            }
            SplitError::SourceImageUnreadable(_) => "The image could not be read.",
        }
    }
}
