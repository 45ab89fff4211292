//! # Message Blocks - Headers, Trailer and the Block 4 Tag List
//!
//! A FIN message carries up to five brace-delimited blocks:
//!
//! ```text
//! {1: basic header}{2: application header}{3: user header}{4: text}{5: trailer}
//! ```
//!
//! Blocks 1 and 2 are fixed-position character layouts, blocks 3 and 5 are
//! lists of `{key:value}` subfields, and block 4 is the ordered tag list
//! modeled by [`TagListBlock`]. All header types parse from the block
//! *content* (the text between `{n:` and the closing `}`) and render back to
//! it, so the wire framing itself stays in `mt-codec`.

use crate::error::{TypeError, TypeResult};
use crate::tag::Tag;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered sequence of block 4 tags.
///
/// Lookup is a linear scan: block 4 of a real message holds tens of tags and
/// field names repeat (the same `98A` appears once per sequence), so position
/// matters and a map would lose it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagListBlock {
    tags: Vec<Tag>,
}

impl TagListBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Const-constructible empty block, usable in statics.
    pub const fn empty() -> Self {
        Self { tags: Vec::new() }
    }

    pub fn from_tags(tags: Vec<Tag>) -> Self {
        Self { tags }
    }

    /// Append one tag, returning `&mut self` for chaining.
    pub fn append(&mut self, tag: Tag) -> &mut Self {
        self.tags.push(tag);
        self
    }

    /// Append every tag of `other` in order.
    pub fn extend_from(&mut self, other: &TagListBlock) -> &mut Self {
        self.tags.extend(other.tags.iter().cloned());
        self
    }

    /// First tag with the given field name, scanning in order.
    pub fn tag_by_name(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name() == name)
    }

    /// Every tag with the given field name, in message order.
    pub fn tags_by_name(&self, name: &str) -> Vec<&Tag> {
        self.tags.iter().filter(|t| t.name() == name).collect()
    }

    /// Value of the first tag with the given name.
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tag_by_name(name).map(Tag::value)
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl fmt::Display for TagListBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tag in &self.tags {
            writeln!(f, "{tag}")?;
        }
        Ok(())
    }
}

impl IntoIterator for TagListBlock {
    type Item = Tag;
    type IntoIter = std::vec::IntoIter<Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.into_iter()
    }
}

impl<'a> IntoIterator for &'a TagListBlock {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

/// Block 1: basic header.
///
/// Fixed layout, e.g. `F01BANKBEBBAXXX2222123456`: application id (1),
/// service id (2), logical terminal address (12), session number (4),
/// sequence number (6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicHeader {
    pub application_id: String,
    pub service_id: String,
    pub logical_terminal: String,
    pub session_number: String,
    pub sequence_number: String,
}

impl BasicHeader {
    pub fn parse(content: &str) -> TypeResult<Self> {
        if content.len() != 25 {
            return Err(TypeError::malformed_header(
                '1',
                format!("expected 25 characters, got {}", content.len()),
                content,
            ));
        }
        if !content.is_ascii() {
            return Err(TypeError::malformed_header('1', "non-ASCII content", content));
        }
        Ok(Self {
            application_id: content[0..1].to_string(),
            service_id: content[1..3].to_string(),
            logical_terminal: content[3..15].to_string(),
            session_number: content[15..19].to_string(),
            sequence_number: content[19..25].to_string(),
        })
    }
}

impl fmt::Display for BasicHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.application_id,
            self.service_id,
            self.logical_terminal,
            self.session_number,
            self.sequence_number
        )
    }
}

/// Block 2: application header, input (to SWIFT) or output (from SWIFT).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationHeader {
    /// `I` form, e.g. `I514BANKDEFFXXXXN`: message type (3), destination
    /// address (12), priority (1), then optional delivery monitoring (1)
    /// and obsolescence period (3).
    Input {
        message_type: String,
        destination: String,
        priority: String,
        delivery_monitoring: Option<String>,
        obsolescence_period: Option<String>,
    },
    /// `O` form: message type (3), input time (4), MIR (28), output date
    /// (6), output time (4), priority (1).
    Output {
        message_type: String,
        input_time: String,
        mir: String,
        output_date: String,
        output_time: String,
        priority: String,
    },
}

impl ApplicationHeader {
    pub fn parse(content: &str) -> TypeResult<Self> {
        if !content.is_ascii() {
            return Err(TypeError::malformed_header('2', "non-ASCII content", content));
        }
        match content.as_bytes().first() {
            Some(b'I') => {
                // 17 bare, 18 with delivery monitoring, 21 with the
                // obsolescence period as well.
                let (delivery_monitoring, obsolescence_period) = match content.len() {
                    17 => (None, None),
                    18 => (Some(content[17..18].to_string()), None),
                    21 => (
                        Some(content[17..18].to_string()),
                        Some(content[18..21].to_string()),
                    ),
                    n => {
                        return Err(TypeError::malformed_header(
                            '2',
                            format!("input header must be 17, 18 or 21 characters, got {n}"),
                            content,
                        ))
                    }
                };
                Ok(Self::Input {
                    message_type: content[1..4].to_string(),
                    destination: content[4..16].to_string(),
                    priority: content[16..17].to_string(),
                    delivery_monitoring,
                    obsolescence_period,
                })
            }
            Some(b'O') => {
                if content.len() != 47 {
                    return Err(TypeError::malformed_header(
                        '2',
                        format!("output header needs 47 characters, got {}", content.len()),
                        content,
                    ));
                }
                Ok(Self::Output {
                    message_type: content[1..4].to_string(),
                    input_time: content[4..8].to_string(),
                    mir: content[8..36].to_string(),
                    output_date: content[36..42].to_string(),
                    output_time: content[42..46].to_string(),
                    priority: content[46..47].to_string(),
                })
            }
            _ => Err(TypeError::malformed_header(
                '2',
                "direction must be 'I' or 'O'",
                content,
            )),
        }
    }

    /// Three-digit message type carried by either variant.
    pub fn message_type(&self) -> &str {
        match self {
            Self::Input { message_type, .. } | Self::Output { message_type, .. } => message_type,
        }
    }
}

impl fmt::Display for ApplicationHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input {
                message_type,
                destination,
                priority,
                delivery_monitoring,
                obsolescence_period,
            } => {
                write!(f, "I{message_type}{destination}{priority}")?;
                if let Some(dm) = delivery_monitoring {
                    write!(f, "{dm}")?;
                }
                if let Some(op) = obsolescence_period {
                    write!(f, "{op}")?;
                }
                Ok(())
            }
            Self::Output {
                message_type,
                input_time,
                mir,
                output_date,
                output_time,
                priority,
            } => write!(
                f,
                "O{message_type}{input_time}{mir}{output_date}{output_time}{priority}"
            ),
        }
    }
}

/// Blocks 3 and 5: an ordered list of `{key:value}` subfields.
///
/// Block 3 carries the user header (108 MUR, 121 UETR, 119 validation flag);
/// block 5 carries the trailer (CHK, MAC, ...). Values are kept opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubfieldBlock {
    fields: Vec<(String, String)>,
}

impl SubfieldBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `{108:REF}{121:...}` style content. The surrounding block
    /// braces must already be stripped.
    pub fn parse(block: char, content: &str) -> TypeResult<Self> {
        let mut fields = Vec::new();
        let mut rest = content;
        while !rest.is_empty() {
            let Some(stripped) = rest.strip_prefix('{') else {
                return Err(TypeError::malformed_header(
                    block,
                    "expected '{' before subfield",
                    content,
                ));
            };
            let Some(end) = stripped.find('}') else {
                return Err(TypeError::malformed_header(block, "unterminated subfield", content));
            };
            let inner = &stripped[..end];
            let Some((key, value)) = inner.split_once(':') else {
                return Err(TypeError::malformed_header(
                    block,
                    format!("subfield {inner:?} has no ':' separator"),
                    content,
                ));
            };
            fields.push((key.to_string(), value.to_string()));
            rest = &stripped[end + 1..];
        }
        Ok(Self { fields })
    }

    /// Value of the first subfield with the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for SubfieldBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.fields {
            write!(f, "{{{key}:{value}}}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str, value: &str) -> Tag {
        Tag::new(name, value).unwrap()
    }

    #[test]
    fn test_tag_list_lookup_first_match() {
        let mut block = TagListBlock::new();
        block
            .append(tag("20C", ":SEME//FIRST"))
            .append(tag("23G", "NEWM"))
            .append(tag("20C", ":SEME//SECOND"));

        assert_eq!(block.tag_value("20C"), Some(":SEME//FIRST"));
        assert_eq!(block.tag_by_name("23G").unwrap().value(), "NEWM");
        assert_eq!(block.tag_by_name("99Z"), None);
    }

    #[test]
    fn test_tag_list_all_matches_in_order() {
        let mut block = TagListBlock::new();
        block
            .append(tag("22F", ":TRTR//TRAD"))
            .append(tag("98A", ":SETT//20260827"))
            .append(tag("22F", ":PRIC//AVPR"));

        let all = block.tags_by_name("22F");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].value(), ":TRTR//TRAD");
        assert_eq!(all[1].value(), ":PRIC//AVPR");
        assert!(block.tags_by_name("99Z").is_empty());
    }

    #[test]
    fn test_tag_list_display_one_per_line() {
        let mut block = TagListBlock::new();
        block.append(tag("16R", "GENL")).append(tag("16S", "GENL"));
        assert_eq!(block.to_string(), ":16R:GENL\n:16S:GENL\n");
    }

    #[test]
    fn test_basic_header_round_trip() {
        let content = "F01BANKBEBBAXXX2222123456";
        let header = BasicHeader::parse(content).unwrap();
        assert_eq!(header.application_id, "F");
        assert_eq!(header.service_id, "01");
        assert_eq!(header.logical_terminal, "BANKBEBBAXXX");
        assert_eq!(header.session_number, "2222");
        assert_eq!(header.sequence_number, "123456");
        assert_eq!(header.to_string(), content);
    }

    #[test]
    fn test_basic_header_wrong_length() {
        assert!(matches!(
            BasicHeader::parse("F01BANK"),
            Err(TypeError::MalformedHeader { block: '1', .. })
        ));
        // Trailing content is an error, not discarded.
        assert!(matches!(
            BasicHeader::parse("F01BANKBEBBAXXX2222123456X"),
            Err(TypeError::MalformedHeader { block: '1', .. })
        ));
    }

    #[test]
    fn test_application_header_input() {
        let header = ApplicationHeader::parse("I514BANKDEFFXXXXN").unwrap();
        match &header {
            ApplicationHeader::Input {
                message_type,
                destination,
                priority,
                delivery_monitoring,
                obsolescence_period,
            } => {
                assert_eq!(message_type, "514");
                assert_eq!(destination, "BANKDEFFXXXX");
                assert_eq!(priority, "N");
                assert_eq!(delivery_monitoring, &None);
                assert_eq!(obsolescence_period, &None);
            }
            _ => panic!("expected input header"),
        }
        assert_eq!(header.message_type(), "514");
        assert_eq!(header.to_string(), "I514BANKDEFFXXXXN");
    }

    #[test]
    fn test_application_header_input_with_monitoring() {
        let header = ApplicationHeader::parse("I514BANKDEFFXXXXU3003").unwrap();
        match &header {
            ApplicationHeader::Input {
                delivery_monitoring,
                obsolescence_period,
                ..
            } => {
                assert_eq!(delivery_monitoring.as_deref(), Some("3"));
                assert_eq!(obsolescence_period.as_deref(), Some("003"));
            }
            _ => panic!("expected input header"),
        }
        assert_eq!(header.to_string(), "I514BANKDEFFXXXXU3003");
    }

    #[test]
    fn test_application_header_output() {
        let content = "O5691200010103BANKBEBBAXXX22221234560101031201N";
        let header = ApplicationHeader::parse(content).unwrap();
        match &header {
            ApplicationHeader::Output {
                message_type,
                input_time,
                mir,
                output_date,
                output_time,
                priority,
            } => {
                assert_eq!(message_type, "569");
                assert_eq!(input_time, "1200");
                assert_eq!(mir, "010103BANKBEBBAXXX2222123456");
                assert_eq!(output_date, "010103");
                assert_eq!(output_time, "1201");
                assert_eq!(priority, "N");
            }
            _ => panic!("expected output header"),
        }
        assert_eq!(header.to_string(), content);
    }

    #[test]
    fn test_application_header_bad_direction() {
        assert!(ApplicationHeader::parse("X514BANKDEFFXXXXN").is_err());
        assert!(ApplicationHeader::parse("").is_err());
    }

    #[test]
    fn test_application_header_wrong_lengths() {
        // A partial obsolescence period (19-20 chars) must not be dropped.
        assert!(ApplicationHeader::parse("I514BANKDEFFXXXXN30").is_err());
        assert!(ApplicationHeader::parse("I514BANKDEFFXXXXN3003X").is_err());
        assert!(ApplicationHeader::parse(
            "O5691200010103BANKBEBBAXXX22221234560101031201NX"
        )
        .is_err());
    }

    #[test]
    fn test_subfield_block_parse_and_get() {
        let block = SubfieldBlock::parse('3', "{108:MUR12345}{119:W8BENO}").unwrap();
        assert_eq!(block.get("108"), Some("MUR12345"));
        assert_eq!(block.get("119"), Some("W8BENO"));
        assert_eq!(block.get("121"), None);
        assert_eq!(block.to_string(), "{108:MUR12345}{119:W8BENO}");
    }

    #[test]
    fn test_subfield_block_malformed() {
        assert!(SubfieldBlock::parse('3', "108:MUR").is_err());
        assert!(SubfieldBlock::parse('3', "{108MUR}").is_err());
        assert!(SubfieldBlock::parse('5', "{CHK:ABC").is_err());
    }

    #[test]
    fn test_subfield_block_set_chaining() {
        let mut block = SubfieldBlock::new();
        block.set("CHK", "123456789ABC").set("MAC", "00000000");
        assert_eq!(block.get("CHK"), Some("123456789ABC"));
        assert_eq!(block.to_string(), "{CHK:123456789ABC}{MAC:00000000}");
    }
}
