//! # Message Schema Registry
//!
//! ## Purpose
//!
//! Central table of the sequence grammar for each supported message type:
//! which delimited sequences a message may carry, whether they repeat, and
//! how they nest. The validator checks parsed messages against these tables,
//! and callers can introspect them to discover what a type supports.
//!
//! The tables are hand-maintained. The upstream standard publishes them as
//! message reference guides; only the types this crate ships accessors for
//! are listed.

use mt_types::{qualifiers, MtType};

/// How often a sequence may occur at its level of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetition {
    /// Exactly once.
    One,
    /// Optional, at most once.
    AtMostOne,
    /// Optional, any number of times.
    ZeroOrMore,
}

impl Repetition {
    /// Check an observed occurrence count against this rule.
    pub fn allows(&self, count: usize) -> bool {
        match self {
            Self::One => count == 1,
            Self::AtMostOne => count <= 1,
            Self::ZeroOrMore => true,
        }
    }
}

/// Grammar of one delimited sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceSpec {
    /// Qualifier carried by the 16R/16S boundary tags.
    pub qualifier: &'static str,
    pub repetition: Repetition,
    /// Sequences nested inside this one.
    pub subsequences: &'static [SequenceSpec],
}

/// Sequence grammar of one message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSchema {
    pub number: u16,
    /// Variant selected by the 119 user-header subfield, if the layout only
    /// applies to one.
    pub variant: Option<&'static str>,
    pub description: &'static str,
    pub sequences: &'static [SequenceSpec],
}

impl MessageSchema {
    /// Message type this schema applies to.
    pub fn mt_type(&self) -> MtType {
        match self.variant {
            Some(variant) => MtType::with_variant(self.number, variant),
            None => MtType::new(self.number),
        }
    }

    /// Top-level spec for a qualifier.
    pub fn sequence(&self, qualifier: &str) -> Option<&'static SequenceSpec> {
        self.sequences.iter().find(|s| s.qualifier == qualifier)
    }

    /// Whether a top-level sequence may occur more than once.
    pub fn repeats(&self, qualifier: &str) -> Option<bool> {
        self.sequence(qualifier)
            .map(|s| s.repetition == Repetition::ZeroOrMore)
    }
}

const LINKAGES: &[SequenceSpec] = &[SequenceSpec {
    qualifier: qualifiers::LINK,
    repetition: Repetition::ZeroOrMore,
    subsequences: &[],
}];

/// MT514: trade allocation instruction.
pub static MT514: MessageSchema = MessageSchema {
    number: 514,
    variant: None,
    description: "Trade Allocation Instruction",
    sequences: &[
        SequenceSpec {
            qualifier: qualifiers::GENL,
            repetition: Repetition::One,
            subsequences: LINKAGES,
        },
        SequenceSpec {
            qualifier: qualifiers::CONFDET,
            repetition: Repetition::One,
            subsequences: &[SequenceSpec {
                qualifier: qualifiers::CONFPRTY,
                repetition: Repetition::ZeroOrMore,
                subsequences: &[],
            }],
        },
        SequenceSpec {
            qualifier: qualifiers::SETDET,
            repetition: Repetition::AtMostOne,
            subsequences: &[SequenceSpec {
                qualifier: qualifiers::SETPRTY,
                repetition: Repetition::ZeroOrMore,
                subsequences: &[],
            }],
        },
        SequenceSpec {
            qualifier: qualifiers::OTHRPRTY,
            repetition: Repetition::ZeroOrMore,
            subsequences: &[],
        },
    ],
};

/// MT569: triparty collateral and exposure statement.
pub static MT569: MessageSchema = MessageSchema {
    number: 569,
    variant: None,
    description: "Triparty Collateral and Exposure Statement",
    sequences: &[
        SequenceSpec {
            qualifier: qualifiers::GENL,
            repetition: Repetition::One,
            subsequences: LINKAGES,
        },
        SequenceSpec {
            qualifier: qualifiers::SUMM,
            repetition: Repetition::AtMostOne,
            subsequences: &[SequenceSpec {
                qualifier: qualifiers::SUME,
                repetition: Repetition::ZeroOrMore,
                subsequences: &[],
            }],
        },
        SequenceSpec {
            qualifier: qualifiers::TRANSDET,
            repetition: Repetition::ZeroOrMore,
            subsequences: &[],
        },
    ],
};

/// MT574 in its W8BENO variant: IRS beneficial owner withholding statement.
pub static MT574_W8BENO: MessageSchema = MessageSchema {
    number: 574,
    variant: Some("W8BENO"),
    description: "IRS 1441 NRA Beneficial Owners' List (W-8BEN-O)",
    sequences: &[
        SequenceSpec {
            qualifier: qualifiers::GENL,
            repetition: Repetition::One,
            subsequences: LINKAGES,
        },
        SequenceSpec {
            qualifier: qualifiers::BENODET,
            repetition: Repetition::ZeroOrMore,
            subsequences: &[],
        },
    ],
};

/// MT577: statement of numbers.
pub static MT577: MessageSchema = MessageSchema {
    number: 577,
    variant: None,
    description: "Statement of Numbers",
    sequences: &[
        SequenceSpec {
            qualifier: qualifiers::GENL,
            repetition: Repetition::One,
            subsequences: LINKAGES,
        },
        SequenceSpec {
            qualifier: qualifiers::STATDET,
            repetition: Repetition::ZeroOrMore,
            subsequences: &[],
        },
    ],
};

static ALL_SCHEMAS: &[&MessageSchema] = &[&MT514, &MT569, &MT574_W8BENO, &MT577];

/// Lookup and introspection over the built-in schemas.
pub struct SchemaRegistry;

impl SchemaRegistry {
    /// Schema for a message type. A variant-specific schema only matches
    /// when the message carries that variant; a message carrying an
    /// unrelated validation flag falls back to the variant-free schema.
    pub fn schema_for(mt: &MtType) -> Option<&'static MessageSchema> {
        ALL_SCHEMAS
            .iter()
            .copied()
            .find(|s| s.number == mt.number() && s.variant == mt.variant())
            .or_else(|| {
                mt.variant().and_then(|_| {
                    ALL_SCHEMAS
                        .iter()
                        .copied()
                        .find(|s| s.number == mt.number() && s.variant.is_none())
                })
            })
    }

    /// Every message type with a built-in schema.
    pub fn supported_types() -> Vec<MtType> {
        ALL_SCHEMAS.iter().map(|s| s.mt_type()).collect()
    }

    pub fn is_supported(mt: &MtType) -> bool {
        Self::schema_for(mt).is_some()
    }
}
