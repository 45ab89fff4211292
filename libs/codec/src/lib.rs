//! # MT Codec - SWIFT FIN Parsing, Sequences and Validation
//!
//! ## Purpose
//!
//! The rules layer over the `mt-types` data model:
//! - FIN text parsing and rendering (blocks 1-5, block 4 tag scanning)
//! - Delimited sequence extraction over `16R`/`16S` boundary tags
//! - The message-type schema registry and the schema/format validator
//! - [`MtMessage`], the accessor layer everything else reads through
//!
//! ## Architecture Role
//!
//! ```text
//! mt-types  →  [mt-codec]  →  applications
//!     ↑            ↓
//! Pure Data   Parsing Rules
//! Tag/Block   Sequences/Schema/Validation
//! ```
//!
//! ## Error Policy
//!
//! Malformed wire input is a structured [`CodecError`]; it never produces a
//! silently empty message. Absent optional data reads as `Option::None` or
//! an empty `Vec` through the accessors, and a message without a text block
//! logs a warning and reads as empty; the validator is where that becomes
//! a finding.

pub mod error;
pub mod message;
pub mod parser;
pub mod schema;
pub mod sequence;
pub mod validation;
pub mod writer;

pub use error::{CodecError, CodecResult};
pub use message::MtMessage;
pub use parser::{parse_message, parse_text_block, scan_blocks, RawBlock};
pub use schema::{MessageSchema, Repetition, SchemaRegistry, SequenceSpec};
pub use sequence::{find_sequence, find_sequences, find_sequences_strict, Sequence};
pub use validation::{
    validated_sequences, FormatSpec, FormatViolation, MessageValidator, ValidationError,
    ValidationPolicy,
};
pub use writer::write_message;
