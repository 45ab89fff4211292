//! Errors raised while constructing or decomposing model types.

use thiserror::Error;

/// Errors produced by the `mt-types` data model.
///
/// These cover structural problems in individual model values (tag names,
/// header blocks, message type identifiers). Wire-level parsing errors live
/// in `mt-codec`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Tag name does not match the SWIFT shape: two digits plus an optional
    /// trailing uppercase letter option (e.g. `20C`, `16R`, `98A`).
    #[error("invalid tag name {name:?}: expected two digits plus optional letter option")]
    InvalidTagName { name: String },

    /// Header block content is too short or structurally wrong.
    #[error("malformed block {block} header: {reason} (content: {content:?})")]
    MalformedHeader {
        block: char,
        reason: String,
        content: String,
    },

    /// Message type identifier is not a three-digit number.
    #[error("invalid message type {value:?}: expected three digits")]
    InvalidMessageType { value: String },

    /// Sequence boundary tags disagree with the declared qualifier.
    #[error("sequence boundary mismatch: expected qualifier {expected:?}, found start {start:?} / end {end:?}")]
    SequenceBoundaryMismatch {
        expected: String,
        start: String,
        end: String,
    },
}

impl TypeError {
    pub fn malformed_header(block: char, reason: impl Into<String>, content: &str) -> Self {
        // Truncate so a multi-kilobyte block cannot flood a log line.
        let mut content = content.to_string();
        if content.len() > 64 {
            content.truncate(64);
            content.push_str("...");
        }
        Self::MalformedHeader {
            block,
            reason: reason.into(),
            content,
        }
    }
}

/// Result type for model construction.
pub type TypeResult<T> = std::result::Result<T, TypeError>;
