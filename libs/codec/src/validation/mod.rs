//! # Message Validation
//!
//! Two layers:
//!
//! - [`format`]: the SWIFT field-format pattern engine (`16x`, `4!c`,
//!   `:4!c//8!n`, ...), compiled once and matched per tag value.
//! - [`validator`]: schema-aware whole-message checks behind a configurable
//!   [`ValidationPolicy`]: text block presence, balanced `16R`/`16S`
//!   boundaries, sequence cardinality, and per-tag formats.

pub mod format;
pub mod validator;

pub use format::{FormatError, FormatSpec, FormatViolation};
pub use validator::{
    validated_sequences, MessageValidator, ValidationError, ValidationPolicy,
};
