//! # MtMessage - The Message Accessor Layer
//!
//! ## Purpose
//!
//! One type for a whole FIN message: the five blocks plus the accessor API
//! the rest of the system reads messages through, covering first/all tags
//! by name, decomposed fields, delimited sequences, and append methods that
//! keep the boundary invariant by construction.
//!
//! Reading from a message with no text block is not an error at this layer:
//! it logs a warning and reads as empty, so accessors stay total. The
//! validator is where a missing block 4 becomes a finding.

use crate::error::CodecResult;
use crate::parser;
use crate::sequence::{self, Sequence};
use crate::writer;
use mt_types::{
    ApplicationHeader, BasicHeader, Field, MtType, SubfieldBlock, Tag, TagListBlock,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// User-header subfield carrying the message variant (validation flag).
const VALIDATION_FLAG: &str = "119";

/// A parsed SWIFT MT message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MtMessage {
    pub basic_header: Option<BasicHeader>,
    pub application_header: Option<ApplicationHeader>,
    pub user_header: Option<SubfieldBlock>,
    text: Option<TagListBlock>,
    pub trailer: Option<SubfieldBlock>,
}

impl MtMessage {
    pub fn new() -> Self {
        Self::default()
    }

    // -- parse factories ----------------------------------------------------

    /// Parse a message from FIN text.
    pub fn parse(input: &str) -> CodecResult<Self> {
        parser::parse_message(input)
    }

    /// Parse a message from any reader.
    pub fn parse_reader<R: Read>(mut reader: R) -> CodecResult<Self> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;
        Self::parse(&input)
    }

    /// Parse a message from a file.
    pub fn parse_file(path: impl AsRef<Path>) -> CodecResult<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Render back to FIN wire text.
    pub fn to_fin_string(&self) -> String {
        writer::write_message(self)
    }

    // -- message type -------------------------------------------------------

    /// Message type from the application header, with the variant from the
    /// user header's 119 subfield when present.
    pub fn mt_type(&self) -> Option<MtType> {
        let header = self.application_header.as_ref()?;
        let base: MtType = header.message_type().parse().ok()?;
        match self
            .user_header
            .as_ref()
            .and_then(|uh| uh.get(VALIDATION_FLAG))
        {
            Some(variant) => Some(MtType::with_variant(base.number(), variant)),
            None => Some(base),
        }
    }

    /// Same numeric message type, ignoring any variant.
    pub fn is_type(&self, number: u16) -> bool {
        self.mt_type().is_some_and(|mt| mt.is_number(number))
    }

    // -- text block access --------------------------------------------------

    pub fn text(&self) -> Option<&TagListBlock> {
        self.text.as_ref()
    }

    pub fn set_text(&mut self, text: TagListBlock) -> &mut Self {
        self.text = Some(text);
        self
    }

    /// Text block for reading; logs and substitutes empty when absent.
    fn text_or_empty(&self) -> &TagListBlock {
        static EMPTY: TagListBlock = TagListBlock::empty();
        match &self.text {
            Some(text) => text,
            None => {
                warn!("message has no text block (block 4), reading as empty");
                &EMPTY
            }
        }
    }

    /// First tag with the given field name.
    pub fn tag_by_name(&self, name: &str) -> Option<&Tag> {
        self.text_or_empty().tag_by_name(name)
    }

    /// Every tag with the given field name, in message order.
    pub fn tags_by_name(&self, name: &str) -> Vec<&Tag> {
        self.text_or_empty().tags_by_name(name)
    }

    /// Value of the first tag with the given name.
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.text_or_empty().tag_value(name)
    }

    /// Decomposed form of the first tag with the given name.
    pub fn field(&self, name: &str) -> Option<Field> {
        self.tag_by_name(name).map(Field::parse)
    }

    /// Decomposed forms of every tag with the given name.
    pub fn fields(&self, name: &str) -> Vec<Field> {
        self.tags_by_name(name).into_iter().map(Field::parse).collect()
    }

    // -- sequences ----------------------------------------------------------

    /// Every sequence with the given qualifier, lenient extraction.
    pub fn sequences(&self, qualifier: &str) -> Vec<Sequence> {
        sequence::find_sequences(self.text_or_empty(), qualifier)
    }

    /// First sequence with the given qualifier.
    pub fn sequence(&self, qualifier: &str) -> Option<Sequence> {
        sequence::find_sequence(self.text_or_empty(), qualifier)
    }

    // -- assembly -----------------------------------------------------------

    /// Append a tag to the text block, creating the block when absent.
    pub fn append_tag(&mut self, tag: Tag) -> &mut Self {
        self.text.get_or_insert_with(TagListBlock::new).append(tag);
        self
    }

    /// Append a whole sequence, boundaries included.
    pub fn append_sequence(&mut self, sequence: Sequence) -> &mut Self {
        let text = self.text.get_or_insert_with(TagListBlock::new);
        text.extend_from(sequence.tags());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str, value: &str) -> Tag {
        Tag::new(name, value).unwrap()
    }

    #[test]
    fn test_accessors_forward_to_text() {
        let mut message = MtMessage::new();
        message
            .append_tag(tag("20C", ":SEME//REF123"))
            .append_tag(tag("22F", ":TRTR//TRAD"))
            .append_tag(tag("20C", ":MAST//POOL1"));

        assert_eq!(message.tag_value("20C"), Some(":SEME//REF123"));
        assert_eq!(message.tags_by_name("20C").len(), 2);
        assert_eq!(message.tag_by_name("99Z"), None);

        let field = message.field("22F").unwrap();
        assert_eq!(field.qualifier(), Some("TRTR"));
        assert_eq!(field.value(), "TRAD");
        assert_eq!(message.fields("20C").len(), 2);
    }

    #[test]
    fn test_missing_text_block_reads_empty() {
        let message = MtMessage::new();
        assert_eq!(message.tag_by_name("20C"), None);
        assert!(message.tags_by_name("20C").is_empty());
        assert!(message.sequences("GENL").is_empty());
        assert!(message.sequence("GENL").is_none());
        assert!(message.field("20C").is_none());
    }

    #[test]
    fn test_mt_type_with_variant() {
        let input = "{2:I574BANKDEFFXXXXN}{3:{119:W8BENO}}{4:\n:16R:GENL\n:16S:GENL\n-}";
        let message = MtMessage::parse(input).unwrap();
        let mt = message.mt_type().unwrap();
        assert_eq!(mt.number(), 574);
        assert_eq!(mt.variant(), Some("W8BENO"));
        assert!(message.is_type(574));
        assert!(!message.is_type(514));
    }

    #[test]
    fn test_mt_type_absent_without_application_header() {
        let message = MtMessage::parse("{4:\n:23G:NEWM\n-}").unwrap();
        assert_eq!(message.mt_type(), None);
        assert!(!message.is_type(514));
    }

    #[test]
    fn test_append_sequence_keeps_boundaries() {
        let mut seq = Sequence::new("LINK");
        seq.append(tag("20C", ":RELA//PREV1"));

        let mut message = MtMessage::new();
        message.append_sequence(seq);

        let text = message.text().unwrap();
        assert_eq!(text.len(), 3);
        assert!(text.tags()[0].starts_sequence("LINK"));
        assert!(text.tags()[2].ends_sequence("LINK"));
        assert_eq!(message.sequences("LINK").len(), 1);
    }

    #[test]
    fn test_parse_reader() {
        let input = "{4:\n:23G:NEWM\n-}".as_bytes();
        let message = MtMessage::parse_reader(input).unwrap();
        assert_eq!(message.tag_value("23G"), Some("NEWM"));
    }

    #[test]
    fn test_serde_round_trip() {
        let input = "{2:I514BANKDEFFXXXXN}{4:\n:16R:GENL\n:20C::SEME//REF123\n:16S:GENL\n-}";
        let message = MtMessage::parse(input).unwrap();
        let json = serde_json::to_string(&message).unwrap();
        let back: MtMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_round_trip_through_fin_string() {
        let input = "{1:F01BANKBEBBAXXX2222123456}{2:I514BANKDEFFXXXXN}{4:\r\n:16R:GENL\r\n:20C::SEME//REF123\r\n:16S:GENL\r\n-}";
        let message = MtMessage::parse(input).unwrap();
        assert_eq!(message.to_fin_string(), input);
    }
}
