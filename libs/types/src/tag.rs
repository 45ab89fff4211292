//! # Block 4 Tag - The Atomic Unit of an MT Message Body
//!
//! A [`Tag`] is one `(name, value)` pair from the text block of a SWIFT FIN
//! message, e.g. `:20C::SEME//REF123` stored as name `20C` and value
//! `:SEME//REF123`. Values are kept verbatim, including embedded newlines
//! for multiline fields such as `35B`.
//!
//! Tags `16R` and `16S` are structural: their value names the sequence they
//! open or close, and the sequence extraction in `mt-codec` keys off the
//! predicates exposed here.

use crate::error::{TypeError, TypeResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One tag of block 4: a field name plus its raw value.
///
/// The name is validated on construction; the value is free-form and owned
/// verbatim. Multiline values use `\n` internally regardless of the wire
/// line ending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    name: String,
    value: String,
}

impl Tag {
    /// Name of the tag that opens a delimited sequence.
    pub const SEQUENCE_START: &'static str = "16R";
    /// Name of the tag that closes a delimited sequence.
    pub const SEQUENCE_END: &'static str = "16S";

    /// Create a tag, validating the field name.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> TypeResult<Self> {
        let name = name.into();
        if !Self::is_valid_name(&name) {
            return Err(TypeError::InvalidTagName { name });
        }
        Ok(Self {
            name,
            value: value.into(),
        })
    }

    /// Check a candidate field name: two ASCII digits plus at most one
    /// trailing uppercase letter option.
    pub fn is_valid_name(name: &str) -> bool {
        let bytes = name.as_bytes();
        match bytes.len() {
            2 => bytes[0].is_ascii_digit() && bytes[1].is_ascii_digit(),
            3 => {
                bytes[0].is_ascii_digit()
                    && bytes[1].is_ascii_digit()
                    && bytes[2].is_ascii_uppercase()
            }
            _ => false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// True for `16R` tags.
    pub fn is_sequence_start(&self) -> bool {
        self.name == Self::SEQUENCE_START
    }

    /// True for `16S` tags.
    pub fn is_sequence_end(&self) -> bool {
        self.name == Self::SEQUENCE_END
    }

    /// True if this tag opens the sequence with the given qualifier.
    pub fn starts_sequence(&self, qualifier: &str) -> bool {
        self.is_sequence_start() && self.value == qualifier
    }

    /// True if this tag closes the sequence with the given qualifier.
    pub fn ends_sequence(&self, qualifier: &str) -> bool {
        self.is_sequence_end() && self.value == qualifier
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}:{}", self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid_names() {
        assert!(Tag::new("20", "REF").is_ok());
        assert!(Tag::new("20C", ":SEME//REF123").is_ok());
        assert!(Tag::new("16R", "GENL").is_ok());
        assert!(Tag::new("95P", ":ACOW//BANKBEBB").is_ok());
    }

    #[test]
    fn test_new_rejects_bad_names() {
        for name in ["", "2", "2C", "205", "20c", "A20", "20CC", "16r"] {
            assert!(
                matches!(Tag::new(name, "x"), Err(TypeError::InvalidTagName { .. })),
                "name {name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_sequence_predicates() {
        let start = Tag::new("16R", "GENL").unwrap();
        let end = Tag::new("16S", "GENL").unwrap();
        let plain = Tag::new("20C", ":SEME//X").unwrap();

        assert!(start.is_sequence_start());
        assert!(start.starts_sequence("GENL"));
        assert!(!start.starts_sequence("LINK"));
        assert!(end.is_sequence_end());
        assert!(end.ends_sequence("GENL"));
        assert!(!plain.is_sequence_start());
        assert!(!plain.is_sequence_end());
    }

    #[test]
    fn test_display() {
        let tag = Tag::new("98A", ":SETT//20260827").unwrap();
        assert_eq!(tag.to_string(), ":98A::SETT//20260827");
    }

    #[test]
    fn test_multiline_value_preserved() {
        let tag = Tag::new("35B", "ISIN XS1234567890\nSOME DESCRIPTION").unwrap();
        assert_eq!(tag.value(), "ISIN XS1234567890\nSOME DESCRIPTION");
    }

    #[test]
    fn test_serde_round_trip() {
        let tag = Tag::new("20C", ":SEME//REF123").unwrap();
        let json = serde_json::to_string(&tag).unwrap();
        let back: Tag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
    }
}
