//! # Message Validator
//!
//! Checks a parsed [`MtMessage`] against its schema: presence of the text
//! block, balanced `16R`/`16S` boundaries, sequence cardinality per the
//! registry's grammar, and per-tag field formats. What is checked is
//! controlled by a [`ValidationPolicy`], so callers handling lenient
//! real-world traffic can switch individual layers off.

use crate::error::CodecError;
use crate::message::MtMessage;
use crate::schema::{MessageSchema, Repetition, SchemaRegistry, SequenceSpec};
use crate::sequence::{find_sequences, Sequence};
use crate::validation::format::{FormatSpec, FormatViolation};
use mt_types::TagListBlock;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Validation failures, one per finding.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// No application header, so the message type is unknown.
    #[error("message carries no application header, message type unknown")]
    MissingMessageType,

    /// Message type has no schema in the registry.
    #[error("no schema registered for message type {mt}")]
    UnknownMessageType { mt: String },

    /// Block 4 is absent.
    #[error("message has no text block (block 4)")]
    MissingTextBlock,

    /// A sequence the grammar requires is absent.
    #[error("mandatory sequence {qualifier} is missing")]
    MissingSequence { qualifier: String },

    /// A sequence occurs more often than the grammar allows.
    #[error("sequence {qualifier} occurs {count} times, grammar allows {allowed}")]
    SequenceCardinality {
        qualifier: String,
        count: usize,
        allowed: &'static str,
    },

    /// A `16S` does not match the innermost open `16R`.
    #[error("unbalanced sequence boundary {qualifier:?} at tag index {index}")]
    UnbalancedBoundary { qualifier: String, index: usize },

    /// A tag value does not match its field format.
    #[error("tag {tag} at index {index}: {violation}")]
    Format {
        tag: String,
        index: usize,
        #[source]
        violation: FormatViolation,
    },

    /// Structural error surfaced during validation.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Which validation layers run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Require block 4 to be present.
    pub require_text: bool,
    /// Check sequence presence and cardinality against the schema registry,
    /// and fail for message types the registry does not know.
    pub enforce_schema: bool,
    /// Check tag values against the field format table.
    pub check_formats: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            require_text: true,
            enforce_schema: true,
            check_formats: true,
        }
    }
}

impl ValidationPolicy {
    /// Boundary balance only; for reading lenient real-world traffic.
    pub fn lenient() -> Self {
        Self {
            require_text: false,
            enforce_schema: false,
            check_formats: false,
        }
    }
}

/// Field formats for the structural tags the schemas use. Tags not listed
/// here pass format validation untouched.
static FIELD_FORMATS: Lazy<HashMap<&'static str, FormatSpec>> = Lazy::new(|| {
    let table: &[(&str, &str)] = &[
        ("16R", "16c"),
        ("16S", "16c"),
        ("13A", ":4!c//3!c"),
        ("17B", ":4!c//1!a"),
        ("19A", ":4!c//[N]3!a15d"),
        ("20C", ":4!c//16x"),
        ("22F", ":4!c/[8c]/4!c"),
        ("22H", ":4!c//4!c"),
        ("23G", "4!c[/4!c]"),
        ("35B", "4*35x"),
        ("36B", ":4!c//4!c/15d"),
        ("70C", ":4!c//4*35x"),
        ("70E", ":4!c//10*35x"),
        ("92A", ":4!c//[N]15d"),
        ("95P", ":4!c//4!a2!a2!c[3!c]"),
        ("95Q", ":4!c//4*35x"),
        ("97A", ":4!c//35x"),
        ("98A", ":4!c//8!n"),
        ("98C", ":4!c//8!n6!n"),
    ];
    table
        .iter()
        .map(|(tag, pattern)| {
            let spec = FormatSpec::parse(pattern)
                .expect("field format table contains only valid patterns");
            (*tag, spec)
        })
        .collect()
});

/// Schema- and format-aware message validator.
#[derive(Debug, Default)]
pub struct MessageValidator {
    policy: ValidationPolicy,
}

impl MessageValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// First finding, if any.
    pub fn validate(&self, message: &MtMessage) -> Result<(), ValidationError> {
        match self.validate_all(message).into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Every finding, in document order per layer.
    pub fn validate_all(&self, message: &MtMessage) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let Some(text) = message.text() else {
            if self.policy.require_text {
                errors.push(ValidationError::MissingTextBlock);
            }
            return errors;
        };

        self.check_boundaries(text, &mut errors);

        if self.policy.enforce_schema {
            match message.mt_type() {
                None => errors.push(ValidationError::MissingMessageType),
                Some(mt) => match SchemaRegistry::schema_for(&mt) {
                    None => errors.push(ValidationError::UnknownMessageType {
                        mt: mt.to_string(),
                    }),
                    Some(schema) => self.check_schema(schema, text, &mut errors),
                },
            }
        }

        if self.policy.check_formats {
            self.check_formats(text, &mut errors);
        }

        debug!(
            findings = errors.len(),
            "message validation finished"
        );
        errors
    }

    /// Every `16S` must close the innermost open `16R`; every `16R` must be
    /// closed.
    fn check_boundaries(&self, text: &TagListBlock, errors: &mut Vec<ValidationError>) {
        let mut open: Vec<(usize, &str)> = Vec::new();
        for (index, tag) in text.iter().enumerate() {
            if tag.is_sequence_start() {
                open.push((index, tag.value()));
            } else if tag.is_sequence_end() {
                match open.last() {
                    Some((_, qualifier)) if *qualifier == tag.value() => {
                        open.pop();
                    }
                    _ => errors.push(ValidationError::UnbalancedBoundary {
                        qualifier: tag.value().to_string(),
                        index,
                    }),
                }
            }
        }
        for (start_index, qualifier) in open {
            errors.push(ValidationError::Codec(CodecError::UnterminatedSequence {
                qualifier: qualifier.to_string(),
                start_index,
            }));
        }
    }

    fn check_schema(
        &self,
        schema: &MessageSchema,
        text: &TagListBlock,
        errors: &mut Vec<ValidationError>,
    ) {
        for spec in schema.sequences {
            let found = find_sequences(text, spec.qualifier);
            Self::check_cardinality(spec, found.len(), errors);
            for parent in &found {
                for sub in spec.subsequences {
                    let count = parent.subsequences(sub.qualifier).len();
                    Self::check_cardinality(sub, count, errors);
                }
            }
        }
    }

    fn check_cardinality(spec: &SequenceSpec, count: usize, errors: &mut Vec<ValidationError>) {
        if spec.repetition.allows(count) {
            return;
        }
        if count == 0 {
            errors.push(ValidationError::MissingSequence {
                qualifier: spec.qualifier.to_string(),
            });
        } else {
            let allowed = match spec.repetition {
                Repetition::One => "exactly once",
                Repetition::AtMostOne => "at most once",
                Repetition::ZeroOrMore => unreachable!("zero-or-more allows any count"),
            };
            errors.push(ValidationError::SequenceCardinality {
                qualifier: spec.qualifier.to_string(),
                count,
                allowed,
            });
        }
    }

    fn check_formats(&self, text: &TagListBlock, errors: &mut Vec<ValidationError>) {
        for (index, tag) in text.iter().enumerate() {
            if let Some(spec) = FIELD_FORMATS.get(tag.name()) {
                if let Err(violation) = spec.validate(tag.value()) {
                    errors.push(ValidationError::Format {
                        tag: tag.name().to_string(),
                        index,
                        violation,
                    });
                }
            }
        }
    }
}

/// Sequences extracted with validation: unterminated windows are errors
/// here, unlike the lenient [`find_sequences`].
pub fn validated_sequences(
    message: &MtMessage,
    qualifier: &str,
) -> Result<Vec<Sequence>, ValidationError> {
    let Some(text) = message.text() else {
        return Err(ValidationError::MissingTextBlock);
    };
    Ok(crate::sequence::find_sequences_strict(text, qualifier)?)
}
