//! Codec-level errors for FIN message processing.
//!
//! Every variant carries enough context to point at the offending input:
//! byte offsets for the block scanner, line numbers for the block 4 tag
//! scanner, and tag indices for sequence extraction. Parsing never fails
//! silently; absent *optional* data is an `Option`/empty `Vec` at the
//! accessor layer, not an error.

use mt_types::TypeError;
use thiserror::Error;

/// Errors produced while parsing or assembling FIN messages.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A `{n:` block opener was never closed by its matching `}`.
    #[error("unterminated block {block_id} starting at offset {offset}")]
    UnterminatedBlock { block_id: char, offset: usize },

    /// Found something other than a block opener at the top level.
    #[error("expected block opener '{{' at offset {offset}, found {found:?}")]
    UnexpectedCharacter { found: char, offset: usize },

    /// Block identifier is not one of `1`-`5`.
    #[error("invalid block identifier {found:?} at offset {offset}: blocks are numbered 1-5")]
    InvalidBlockIdentifier { found: String, offset: usize },

    /// A block 4 line that should start a tag does not scan as `:name:`.
    #[error("malformed tag at line {line}: {reason} (content: {content:?})")]
    MalformedTag {
        line: usize,
        reason: String,
        content: String,
    },

    /// Block 4 text does not end with the `-` terminator.
    #[error("block 4 is missing its '-' terminator")]
    MissingTextTerminator,

    /// The input contains no blocks at all.
    #[error("input contains no FIN blocks")]
    EmptyInput,

    /// A `16R` window was never closed by its `16S`.
    #[error("unterminated sequence {qualifier:?}: 16R at tag index {start_index} has no matching 16S")]
    UnterminatedSequence {
        qualifier: String,
        start_index: usize,
    },

    /// Structural problem in a model value (tag name, header layout).
    #[error(transparent)]
    Type(#[from] TypeError),

    /// I/O failure in the reader/file parse factories.
    #[error("i/o error while reading message: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Create a [`CodecError::MalformedTag`] with the offending line
    /// truncated to a loggable length.
    pub fn malformed_tag(line: usize, reason: impl Into<String>, content: &str) -> Self {
        let mut content = content.to_string();
        if content.len() > 64 {
            content.truncate(64);
            content.push_str("...");
        }
        Self::MalformedTag {
            line,
            reason: reason.into(),
            content,
        }
    }
}

/// Result type for codec operations.
pub type CodecResult<T> = std::result::Result<T, CodecError>;
