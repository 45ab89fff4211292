//! Message type identification.
//!
//! An MT is named by a three-digit number plus an optional variant carried
//! in the user header's 119 subfield (e.g. `574` with `W8BENO` selects the
//! IRS beneficial-owner withholding statement layout of MT574).

use crate::error::{TypeError, TypeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A SWIFT message type identifier, e.g. `514` or `574/W8BENO`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MtType {
    number: u16,
    variant: Option<String>,
}

impl MtType {
    pub fn new(number: u16) -> Self {
        Self {
            number,
            variant: None,
        }
    }

    pub fn with_variant(number: u16, variant: impl Into<String>) -> Self {
        Self {
            number,
            variant: Some(variant.into()),
        }
    }

    pub fn number(&self) -> u16 {
        self.number
    }

    /// Variant from the 119 user-header subfield, if any.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Same numeric type, ignoring the variant.
    pub fn is_number(&self, number: u16) -> bool {
        self.number == number
    }
}

impl FromStr for MtType {
    type Err = TypeError;

    /// Parse the three-digit form from an application header, e.g. `514`.
    fn from_str(s: &str) -> TypeResult<Self> {
        if s.len() != 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypeError::InvalidMessageType {
                value: s.to_string(),
            });
        }
        // Three ASCII digits always fit in u16.
        Ok(Self::new(s.parse().unwrap()))
    }
}

impl fmt::Display for MtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Some(variant) => write!(f, "{:03}/{variant}", self.number),
            None => write!(f, "{:03}", self.number),
        }
    }
}
