//! # FIN Message Parser
//!
//! ## Purpose
//!
//! Turns raw SWIFT FIN text into an [`MtMessage`]: a brace-block scanner
//! splits the input into the five numbered blocks, fixed-layout parsing of
//! blocks 1/2 and subfield parsing of blocks 3/5 is delegated to `mt-types`,
//! and the block 4 scanner turns the text body into an ordered tag list.
//!
//! ## Wire Shape
//!
//! ```text
//! {1:F01BANKBEBBAXXX2222123456}{2:I514BANKDEFFXXXXN}{3:{108:MUR123}}{4:
//! :16R:GENL
//! :20C::SEME//REF123
//! :16S:GENL
//! -}{5:{CHK:123456789ABC}}
//! ```
//!
//! A block 4 tag starts on a line beginning `:name:`; its value runs across
//! following lines until the next tag line or the `-` terminator. CRLF and
//! LF are both accepted; values are normalized to `\n` internally.
//!
//! Malformed input is a structured [`CodecError`], never a silently empty
//! message.

use crate::error::{CodecError, CodecResult};
use crate::message::MtMessage;
use mt_types::{ApplicationHeader, BasicHeader, SubfieldBlock, Tag, TagListBlock};
use tracing::warn;

/// One raw block as found by the scanner: identifier plus the content
/// between `{n:` and the matching `}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock<'a> {
    pub id: char,
    pub content: &'a str,
}

/// Split FIN text into its numbered blocks.
///
/// Brace depth is tracked so the nested `{key:value}` subfields of blocks 3
/// and 5 stay inside their block's content. Whitespace between blocks is
/// tolerated.
pub fn scan_blocks(input: &str) -> CodecResult<Vec<RawBlock<'_>>> {
    let bytes = input.as_bytes();
    let mut blocks = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos].is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if bytes[pos] != b'{' {
            return Err(CodecError::UnexpectedCharacter {
                found: input[pos..].chars().next().unwrap_or('?'),
                offset: pos,
            });
        }
        let open = pos;
        // Identifier runs up to the ':' that starts the content.
        let Some(colon) = input[open + 1..].find(':').map(|i| open + 1 + i) else {
            return Err(CodecError::UnterminatedBlock {
                block_id: '?',
                offset: open,
            });
        };
        let id_str = &input[open + 1..colon];
        let id = match id_str {
            "1" | "2" | "3" | "4" | "5" => id_str.chars().next().unwrap(),
            _ => {
                return Err(CodecError::InvalidBlockIdentifier {
                    found: id_str.to_string(),
                    offset: open + 1,
                })
            }
        };

        let mut depth = 1usize;
        let mut cursor = colon + 1;
        while cursor < bytes.len() {
            match bytes[cursor] {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            cursor += 1;
        }
        if depth != 0 {
            return Err(CodecError::UnterminatedBlock {
                block_id: id,
                offset: open,
            });
        }

        blocks.push(RawBlock {
            id,
            content: &input[colon + 1..cursor],
        });
        pos = cursor + 1;
    }

    if blocks.is_empty() {
        return Err(CodecError::EmptyInput);
    }
    Ok(blocks)
}

/// Parse block 4 content into an ordered tag list.
///
/// `content` is the text between `{4:` and `}`, including the trailing `-`
/// terminator line.
pub fn parse_text_block(content: &str) -> CodecResult<TagListBlock> {
    let normalized = content.replace("\r\n", "\n");
    let mut tags = TagListBlock::new();
    let mut current: Option<(String, String)> = None;
    let mut terminated = false;

    for (index, line) in normalized.split('\n').enumerate() {
        let line_number = index + 1;
        if terminated && !line.trim().is_empty() {
            return Err(CodecError::malformed_tag(
                line_number,
                "content after '-' terminator",
                line,
            ));
        }
        if terminated || (line.is_empty() && current.is_none()) {
            continue;
        }
        if line == "-" {
            terminated = true;
            continue;
        }
        if let Some(rest) = line.strip_prefix(':') {
            // Start of a new tag: ":name:value".
            let Some(colon) = rest.find(':') else {
                return Err(CodecError::malformed_tag(
                    line_number,
                    "tag line has no closing ':' after the field name",
                    line,
                ));
            };
            if let Some((name, value)) = current.take() {
                tags.append(Tag::new(name, value)?);
            }
            current = Some((rest[..colon].to_string(), rest[colon + 1..].to_string()));
        } else {
            // Continuation line of a multiline value.
            match current.as_mut() {
                Some((_, value)) => {
                    value.push('\n');
                    value.push_str(line);
                }
                None => {
                    return Err(CodecError::malformed_tag(
                        line_number,
                        "continuation line before any tag",
                        line,
                    ));
                }
            }
        }
    }

    if let Some((name, value)) = current.take() {
        tags.append(Tag::new(name, value)?);
    }
    if !terminated {
        return Err(CodecError::MissingTextTerminator);
    }
    Ok(tags)
}

/// Parse a complete FIN message.
///
/// Every block is optional at this level; presence requirements are the
/// validator's concern. A repeated block keeps the last occurrence and logs
/// a warning.
pub fn parse_message(input: &str) -> CodecResult<MtMessage> {
    let mut message = MtMessage::new();

    for block in scan_blocks(input)? {
        match block.id {
            '1' => {
                warn_on_replace(&mut message.basic_header, '1');
                message.basic_header = Some(BasicHeader::parse(block.content)?);
            }
            '2' => {
                warn_on_replace(&mut message.application_header, '2');
                message.application_header = Some(ApplicationHeader::parse(block.content)?);
            }
            '3' => {
                warn_on_replace(&mut message.user_header, '3');
                message.user_header = parse_subfield_block('3', block.content)?;
            }
            '4' => {
                if message.text().is_some() {
                    warn!(block = 4, "repeated block, keeping the last occurrence");
                }
                message.set_text(parse_text_block(block.content)?);
            }
            '5' => {
                warn_on_replace(&mut message.trailer, '5');
                message.trailer = parse_subfield_block('5', block.content)?;
            }
            _ => unreachable!("scan_blocks only yields identifiers 1-5"),
        }
    }

    Ok(message)
}

/// An empty `{3:}` or `{5:}` normalizes to `None`, so the writer (which
/// skips absent blocks) round-trips it.
fn parse_subfield_block(block: char, content: &str) -> CodecResult<Option<SubfieldBlock>> {
    let parsed = SubfieldBlock::parse(block, content)?;
    Ok((!parsed.is_empty()).then_some(parsed))
}

fn warn_on_replace<T>(slot: &mut Option<T>, block: char) {
    if slot.is_some() {
        warn!(%block, "repeated block, keeping the last occurrence");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_blocks_flat() {
        let blocks = scan_blocks("{1:F01BANKBEBBAXXX2222123456}{2:I514BANKDEFFXXXXN}").unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].id, '1');
        assert_eq!(blocks[0].content, "F01BANKBEBBAXXX2222123456");
        assert_eq!(blocks[1].id, '2');
        assert_eq!(blocks[1].content, "I514BANKDEFFXXXXN");
    }

    #[test]
    fn test_scan_blocks_nested_braces() {
        let blocks = scan_blocks("{3:{108:MUR123}{119:W8BENO}}{5:{CHK:AB12}}").unwrap();
        assert_eq!(blocks[0].id, '3');
        assert_eq!(blocks[0].content, "{108:MUR123}{119:W8BENO}");
        assert_eq!(blocks[1].id, '5');
        assert_eq!(blocks[1].content, "{CHK:AB12}");
    }

    #[test]
    fn test_scan_blocks_whitespace_between_blocks() {
        let blocks = scan_blocks("{1:F01BANKBEBBAXXX2222123456}\r\n{2:I514BANKDEFFXXXXN}\n").unwrap();
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_scan_blocks_errors() {
        assert!(matches!(scan_blocks(""), Err(CodecError::EmptyInput)));
        assert!(matches!(
            scan_blocks("   \n "),
            Err(CodecError::EmptyInput)
        ));
        assert!(matches!(
            scan_blocks("x{1:A}"),
            Err(CodecError::UnexpectedCharacter { found: 'x', offset: 0 })
        ));
        assert!(matches!(
            scan_blocks("{9:A}"),
            Err(CodecError::InvalidBlockIdentifier { .. })
        ));
        assert!(matches!(
            scan_blocks("{4:\n:20C::SEME//X\n-"),
            Err(CodecError::UnterminatedBlock { block_id: '4', .. })
        ));
    }

    #[test]
    fn test_parse_text_block_basic() {
        let tags = parse_text_block("\r\n:16R:GENL\r\n:20C::SEME//REF123\r\n:16S:GENL\r\n-").unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags.tag_value("20C"), Some(":SEME//REF123"));
        assert!(tags.tags()[0].starts_sequence("GENL"));
        assert!(tags.tags()[2].ends_sequence("GENL"));
    }

    #[test]
    fn test_parse_text_block_multiline_value() {
        let tags =
            parse_text_block("\n:35B:ISIN XS1234567890\n5 PCT BOND 2030\n:16S:FIN\n-").unwrap();
        assert_eq!(
            tags.tag_value("35B"),
            Some("ISIN XS1234567890\n5 PCT BOND 2030")
        );
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_parse_text_block_lf_only() {
        let tags = parse_text_block("\n:23G:NEWM\n-").unwrap();
        assert_eq!(tags.tag_value("23G"), Some("NEWM"));
    }

    #[test]
    fn test_parse_text_block_missing_terminator() {
        assert!(matches!(
            parse_text_block("\n:23G:NEWM\n"),
            Err(CodecError::MissingTextTerminator)
        ));
    }

    #[test]
    fn test_parse_text_block_bad_tag_line() {
        assert!(matches!(
            parse_text_block("\n:23G\n-"),
            Err(CodecError::MalformedTag { line: 2, .. })
        ));
    }

    #[test]
    fn test_parse_text_block_orphan_continuation() {
        assert!(matches!(
            parse_text_block("\nORPHAN LINE\n-"),
            Err(CodecError::MalformedTag { .. })
        ));
    }

    #[test]
    fn test_parse_text_block_invalid_tag_name() {
        let err = parse_text_block("\n:2:X\n-").unwrap_err();
        assert!(matches!(err, CodecError::Type(_)));
    }

    #[test]
    fn test_parse_text_block_content_after_terminator() {
        assert!(matches!(
            parse_text_block("\n:23G:NEWM\n-\n:20C::SEME//X"),
            Err(CodecError::MalformedTag { .. })
        ));
    }

    #[test]
    fn test_parse_message_all_blocks() {
        let input = "{1:F01BANKBEBBAXXX2222123456}{2:I514BANKDEFFXXXXN}{3:{108:MUR123}}{4:\r\n:16R:GENL\r\n:20C::SEME//REF123\r\n:16S:GENL\r\n-}{5:{CHK:123456789ABC}}";
        let message = parse_message(input).unwrap();
        assert_eq!(
            message.basic_header.as_ref().unwrap().logical_terminal,
            "BANKBEBBAXXX"
        );
        assert_eq!(
            message.application_header.as_ref().unwrap().message_type(),
            "514"
        );
        assert_eq!(
            message.user_header.as_ref().unwrap().get("108"),
            Some("MUR123")
        );
        assert_eq!(message.tag_value("20C"), Some(":SEME//REF123"));
        assert_eq!(
            message.trailer.as_ref().unwrap().get("CHK"),
            Some("123456789ABC")
        );
    }

    #[test]
    fn test_parse_message_text_only() {
        let message = parse_message("{4:\n:23G:NEWM\n-}").unwrap();
        assert!(message.basic_header.is_none());
        assert_eq!(message.tag_value("23G"), Some("NEWM"));
    }

    #[test]
    fn test_parse_message_empty_subfield_blocks_normalized() {
        let message = parse_message("{3:}{4:\n:23G:NEWM\n-}{5:}").unwrap();
        assert!(message.user_header.is_none());
        assert!(message.trailer.is_none());

        let written = crate::writer::write_message(&message);
        assert_eq!(parse_message(&written).unwrap(), message);
    }

    #[test]
    fn test_parse_message_propagates_header_errors() {
        assert!(parse_message("{1:F01SHORT}").is_err());
        assert!(parse_message("{2:X514BANKDEFFXXXXN}").is_err());
    }
}
