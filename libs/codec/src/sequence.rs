//! # Delimited Sequence Extraction
//!
//! ## Purpose
//!
//! Partitions a flat block 4 tag list into the named sequences the message
//! grammar defines. A sequence is the window between a `16R` tag carrying
//! the target qualifier and its matching `16S`:
//!
//! ```text
//! :16R:GENL          ┐
//! :20C::SEME//REF    │ GENL window
//! :16R:LINK  ┐ inner │
//! :20C::RELA//X      │
//! :16S:LINK  ┘       │
//! :16S:GENL          ┘
//! :16R:CONFDET  ← outside the GENL window, ignored by find_sequences(.., "GENL")
//! ```
//!
//! Extraction is a single forward pass: a matching `16R` opens a window, the
//! matching `16S` closes it, everything outside any window is ignored. Inner
//! `16R/16S` pairs with other qualifiers are kept as ordinary content; a
//! depth counter guards against a same-qualifier pair inside its own window.
//!
//! Two flavors exist, per the error-policy decision in DESIGN.md: the
//! lenient functions skip an unterminated trailing window (readable content
//! still reads), the strict one reports it as an error.

use crate::error::{CodecError, CodecResult};
use mt_types::{Field, Tag, TagListBlock, TypeError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One delimited sequence, boundary tags included.
///
/// The invariant "first tag is `16R:qualifier`, last tag is `16S:qualifier`"
/// holds for every value of this type: construction enforces it, and
/// deserialization goes through [`Sequence::from_tags`] so a hand-written
/// payload cannot smuggle in broken boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SequenceRepr")]
pub struct Sequence {
    qualifier: String,
    tags: TagListBlock,
}

/// Serialized shape of [`Sequence`]; checked on the way back in.
#[derive(Deserialize)]
struct SequenceRepr {
    qualifier: String,
    tags: TagListBlock,
}

impl TryFrom<SequenceRepr> for Sequence {
    type Error = CodecError;

    fn try_from(repr: SequenceRepr) -> Result<Self, Self::Error> {
        let sequence = Sequence::from_tags(repr.tags.into_iter().collect())?;
        if sequence.qualifier != repr.qualifier {
            return Err(CodecError::Type(TypeError::SequenceBoundaryMismatch {
                expected: repr.qualifier,
                start: sequence.tags.tags()[0].to_string(),
                end: sequence.tags.tags()[sequence.tags.len() - 1].to_string(),
            }));
        }
        Ok(sequence)
    }
}

impl Sequence {
    /// Create an empty sequence holding just its boundary pair.
    pub fn new(qualifier: &str) -> Self {
        let mut tags = TagListBlock::new();
        // Qualifier values are plain uppercase words; Tag::new only checks
        // the name, which is the literal 16R/16S here.
        tags.append(Tag::new(Tag::SEQUENCE_START, qualifier).expect("16R is a valid tag name"));
        tags.append(Tag::new(Tag::SEQUENCE_END, qualifier).expect("16S is a valid tag name"));
        Self {
            qualifier: qualifier.to_string(),
            tags,
        }
    }

    /// Build a sequence from tags that must already be boundary-complete.
    ///
    /// Unlike the lenient extraction path this validates the invariant and
    /// reports a mismatch instead of trusting the caller.
    pub fn from_tags(tags: Vec<Tag>) -> CodecResult<Self> {
        let (Some(first), Some(last)) = (tags.first(), tags.last()) else {
            return Err(CodecError::Type(TypeError::SequenceBoundaryMismatch {
                expected: String::new(),
                start: String::new(),
                end: String::new(),
            }));
        };
        if tags.len() < 2
            || !first.is_sequence_start()
            || !last.is_sequence_end()
            || first.value() != last.value()
        {
            return Err(CodecError::Type(TypeError::SequenceBoundaryMismatch {
                expected: first.value().to_string(),
                start: format!("{first}"),
                end: format!("{last}"),
            }));
        }
        let qualifier = first.value().to_string();
        Ok(Self {
            qualifier,
            tags: TagListBlock::from_tags(tags),
        })
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// All tags including the `16R`/`16S` boundaries.
    pub fn tags(&self) -> &TagListBlock {
        &self.tags
    }

    /// Tags between the boundaries.
    pub fn content(&self) -> &[Tag] {
        let all = self.tags.tags();
        &all[1..all.len() - 1]
    }

    /// Insert a tag just before the closing `16S`.
    pub fn append(&mut self, tag: Tag) -> &mut Self {
        let mut inner: Vec<Tag> = self.tags.tags().to_vec();
        inner.insert(inner.len() - 1, tag);
        self.tags = TagListBlock::from_tags(inner);
        self
    }

    /// First content tag with the given name.
    pub fn tag_by_name(&self, name: &str) -> Option<&Tag> {
        self.content().iter().find(|t| t.name() == name)
    }

    /// All content tags with the given name, in order.
    pub fn tags_by_name(&self, name: &str) -> Vec<&Tag> {
        self.content().iter().filter(|t| t.name() == name).collect()
    }

    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tag_by_name(name).map(Tag::value)
    }

    /// Decomposed form of the first content tag with the given name.
    pub fn field(&self, name: &str) -> Option<Field> {
        self.tag_by_name(name).map(Field::parse)
    }

    /// Nested sequences with the given qualifier inside this one.
    pub fn subsequences(&self, qualifier: &str) -> Vec<Sequence> {
        extract(self.content(), qualifier, Mode::Lenient).unwrap_or_default()
    }

    /// First nested sequence with the given qualifier.
    pub fn subsequence(&self, qualifier: &str) -> Option<Sequence> {
        self.subsequences(qualifier).into_iter().next()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Lenient,
    Strict,
}

/// Every sequence with the given qualifier, in message order.
///
/// Lenient: an unterminated trailing window is skipped (and logged), not an
/// error.
pub fn find_sequences(block: &TagListBlock, qualifier: &str) -> Vec<Sequence> {
    extract(block.tags(), qualifier, Mode::Lenient).unwrap_or_default()
}

/// First sequence with the given qualifier, for non-repeating sequences.
pub fn find_sequence(block: &TagListBlock, qualifier: &str) -> Option<Sequence> {
    // Full scan is acceptable: block 4 is tens of tags and the first window
    // usually starts near the front anyway.
    find_sequences(block, qualifier).into_iter().next()
}

/// Every sequence with the given qualifier, failing on an unterminated
/// window instead of skipping it.
pub fn find_sequences_strict(
    block: &TagListBlock,
    qualifier: &str,
) -> CodecResult<Vec<Sequence>> {
    extract(block.tags(), qualifier, Mode::Strict)
}

fn extract(tags: &[Tag], qualifier: &str, mode: Mode) -> CodecResult<Vec<Sequence>> {
    let mut sequences = Vec::new();
    let mut collected: Vec<Tag> = Vec::new();
    let mut start_index = 0usize;
    let mut depth = 0usize;

    for (index, tag) in tags.iter().enumerate() {
        if depth == 0 {
            // Tags outside every window are ignored, stray 16S included.
            if tag.starts_sequence(qualifier) {
                start_index = index;
                collected.push(tag.clone());
                depth = 1;
            }
            continue;
        }
        collected.push(tag.clone());
        if tag.starts_sequence(qualifier) {
            depth += 1;
        } else if tag.ends_sequence(qualifier) {
            depth -= 1;
            if depth == 0 {
                sequences.push(Sequence {
                    qualifier: qualifier.to_string(),
                    tags: TagListBlock::from_tags(std::mem::take(&mut collected)),
                });
            }
        }
    }

    if depth > 0 {
        match mode {
            Mode::Strict => {
                return Err(CodecError::UnterminatedSequence {
                    qualifier: qualifier.to_string(),
                    start_index,
                })
            }
            Mode::Lenient => {
                debug!(qualifier, start_index, "skipping unterminated sequence window");
            }
        }
    }

    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str, value: &str) -> Tag {
        Tag::new(name, value).unwrap()
    }

    fn block(tags: &[(&str, &str)]) -> TagListBlock {
        TagListBlock::from_tags(tags.iter().map(|(n, v)| tag(n, v)).collect())
    }

    #[test]
    fn test_find_single_sequence() {
        let b = block(&[
            ("16R", "GENL"),
            ("20C", ":SEME//REF123"),
            ("23G", "NEWM"),
            ("16S", "GENL"),
        ]);
        let seqs = find_sequences(&b, "GENL");
        assert_eq!(seqs.len(), 1);
        assert_eq!(seqs[0].qualifier(), "GENL");
        assert_eq!(seqs[0].content().len(), 2);
        assert_eq!(seqs[0].tag_value("20C"), Some(":SEME//REF123"));
    }

    #[test]
    fn test_tags_outside_window_ignored() {
        let b = block(&[
            ("23G", "NEWM"),
            ("16R", "LINK"),
            ("20C", ":RELA//PREV1"),
            ("16S", "LINK"),
            ("98A", ":PREP//20260827"),
        ]);
        let seqs = find_sequences(&b, "LINK");
        assert_eq!(seqs.len(), 1);
        assert_eq!(seqs[0].content().len(), 1);
        assert!(seqs[0].tag_by_name("23G").is_none());
        assert!(seqs[0].tag_by_name("98A").is_none());
    }

    #[test]
    fn test_repeated_sequences_in_order() {
        let b = block(&[
            ("16R", "LINK"),
            ("20C", ":RELA//PREV1"),
            ("16S", "LINK"),
            ("16R", "LINK"),
            ("20C", ":RELA//PREV2"),
            ("16S", "LINK"),
        ]);
        let seqs = find_sequences(&b, "LINK");
        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs[0].tag_value("20C"), Some(":RELA//PREV1"));
        assert_eq!(seqs[1].tag_value("20C"), Some(":RELA//PREV2"));
        assert_eq!(
            find_sequence(&b, "LINK").unwrap().tag_value("20C"),
            Some(":RELA//PREV1")
        );
    }

    #[test]
    fn test_nested_other_qualifier_kept_as_content() {
        let b = block(&[
            ("16R", "GENL"),
            ("20C", ":SEME//REF123"),
            ("16R", "LINK"),
            ("20C", ":RELA//PREV1"),
            ("16S", "LINK"),
            ("16S", "GENL"),
        ]);
        let genl = find_sequence(&b, "GENL").unwrap();
        assert_eq!(genl.content().len(), 4);

        let links = genl.subsequences("LINK");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].tag_value("20C"), Some(":RELA//PREV1"));
        assert_eq!(
            genl.subsequence("LINK").unwrap().tag_value("20C"),
            Some(":RELA//PREV1")
        );
    }

    #[test]
    fn test_same_qualifier_nesting_does_not_close_early() {
        // Not legal SWIFT, but the depth counter must not mispartition it.
        let b = block(&[
            ("16R", "GENL"),
            ("16R", "GENL"),
            ("20C", ":SEME//INNER"),
            ("16S", "GENL"),
            ("16S", "GENL"),
        ]);
        let seqs = find_sequences(&b, "GENL");
        assert_eq!(seqs.len(), 1);
        assert_eq!(seqs[0].tags().len(), 5);
    }

    #[test]
    fn test_empty_window_is_legal() {
        let b = block(&[("16R", "SETDET"), ("16S", "SETDET")]);
        let seqs = find_sequences(&b, "SETDET");
        assert_eq!(seqs.len(), 1);
        assert!(seqs[0].content().is_empty());
    }

    #[test]
    fn test_unterminated_window_lenient_vs_strict() {
        let b = block(&[
            ("16R", "LINK"),
            ("20C", ":RELA//PREV1"),
            ("16S", "LINK"),
            ("16R", "LINK"),
            ("20C", ":RELA//PREV2"),
        ]);
        // Lenient: closed window survives, trailing one is dropped.
        let seqs = find_sequences(&b, "LINK");
        assert_eq!(seqs.len(), 1);
        // Strict: the dangling 16R is an error.
        let err = find_sequences_strict(&b, "LINK").unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnterminatedSequence { start_index: 3, .. }
        ));
    }

    #[test]
    fn test_stray_sequence_end_ignored() {
        let b = block(&[
            ("16S", "GENL"),
            ("16R", "GENL"),
            ("20C", ":SEME//REF123"),
            ("16S", "GENL"),
        ]);
        let seqs = find_sequences(&b, "GENL");
        assert_eq!(seqs.len(), 1);
        assert_eq!(seqs[0].content().len(), 1);
    }

    #[test]
    fn test_no_match_returns_empty() {
        let b = block(&[("23G", "NEWM")]);
        assert!(find_sequences(&b, "GENL").is_empty());
        assert!(find_sequence(&b, "GENL").is_none());
    }

    #[test]
    fn test_from_tags_validates_boundaries() {
        let good = vec![tag("16R", "GENL"), tag("23G", "NEWM"), tag("16S", "GENL")];
        let seq = Sequence::from_tags(good).unwrap();
        assert_eq!(seq.qualifier(), "GENL");

        let mismatched = vec![tag("16R", "GENL"), tag("16S", "LINK")];
        assert!(Sequence::from_tags(mismatched).is_err());

        let no_boundaries = vec![tag("23G", "NEWM")];
        assert!(Sequence::from_tags(no_boundaries).is_err());

        assert!(Sequence::from_tags(vec![]).is_err());

        // A lone 16R cannot be both start and end.
        assert!(Sequence::from_tags(vec![tag("16R", "GENL")]).is_err());
    }

    #[test]
    fn test_deserialize_enforces_boundaries() {
        let mut seq = Sequence::new("GENL");
        seq.append(tag("20C", ":SEME//REF123"));
        let json = serde_json::to_string(&seq).unwrap();
        let back: Sequence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seq);

        // No 16R/16S pair at all.
        let unbounded = r#"{"qualifier":"GENL","tags":{"tags":[{"name":"20C","value":":SEME//X"}]}}"#;
        assert!(serde_json::from_str::<Sequence>(unbounded).is_err());

        // Boundaries disagree with the declared qualifier.
        let mismatched = r#"{"qualifier":"LINK","tags":{"tags":[{"name":"16R","value":"GENL"},{"name":"16S","value":"GENL"}]}}"#;
        assert!(serde_json::from_str::<Sequence>(mismatched).is_err());
    }

    #[test]
    fn test_new_and_append_keep_invariant() {
        let mut seq = Sequence::new("LINK");
        assert!(seq.content().is_empty());
        seq.append(tag("20C", ":RELA//PREV1"));
        seq.append(tag("20C", ":RELA//PREV2"));

        let all = seq.tags().tags();
        assert_eq!(all.len(), 4);
        assert!(all[0].starts_sequence("LINK"));
        assert!(all[3].ends_sequence("LINK"));
        assert_eq!(seq.tags_by_name("20C").len(), 2);
    }
}
