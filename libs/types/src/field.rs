//! # Generic Field Decomposition
//!
//! ISO 15022 fields share one generic shape: an optional leading
//! `:QUALIFIER//VALUE` or `:QUALIFIER/ISSUER/VALUE`, with the remaining
//! value split across lines for multiline fields. [`Field`] decomposes a
//! single [`Tag`] into that shape once and offers typed readers on top, so
//! callers never re-split raw strings.
//!
//! Typed readers return `Option`: an absent or malformed component reads as
//! `None`, mirroring the accessor semantics of the tag list itself.

use crate::tag::Tag;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A decomposed field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    tag_name: String,
    qualifier: Option<String>,
    issuer: Option<String>,
    components: Vec<String>,
    raw: String,
}

impl Field {
    /// Decompose a tag. Never fails: values that do not follow the generic
    /// shape simply have no qualifier and keep their lines as components.
    pub fn parse(tag: &Tag) -> Self {
        let raw = tag.value().to_string();
        let (qualifier, issuer, rest) = Self::split_prefix(&raw);
        let components = rest.split('\n').map(str::to_string).collect();
        Self {
            tag_name: tag.name().to_string(),
            qualifier,
            issuer,
            components,
            raw,
        }
    }

    /// Split `:QUAL//rest` / `:QUAL/ISSUER/rest` into its parts. Returns
    /// the untouched value as `rest` when there is no leading colon.
    fn split_prefix(raw: &str) -> (Option<String>, Option<String>, &str) {
        let Some(after_colon) = raw.strip_prefix(':') else {
            return (None, None, raw);
        };
        let Some(slash) = after_colon.find('/') else {
            return (None, None, raw);
        };
        let qualifier = &after_colon[..slash];
        if qualifier.is_empty() || !qualifier.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return (None, None, raw);
        }
        let after_qual = &after_colon[slash + 1..];
        if let Some(rest) = after_qual.strip_prefix('/') {
            // :QUAL//rest
            return (Some(qualifier.to_string()), None, rest);
        }
        // :QUAL/ISSUER/rest
        if let Some(next_slash) = after_qual.find('/') {
            let issuer = &after_qual[..next_slash];
            return (
                Some(qualifier.to_string()),
                Some(issuer.to_string()),
                &after_qual[next_slash + 1..],
            );
        }
        // :QUAL/rest with no second slash; treat the remainder as the value.
        (Some(qualifier.to_string()), None, after_qual)
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// Component by zero-based index; components are the lines of the value
    /// after the qualifier prefix.
    pub fn component(&self, index: usize) -> Option<&str> {
        self.components.get(index).map(String::as_str)
    }

    /// First component, which is the whole post-qualifier value for
    /// single-line fields.
    pub fn value(&self) -> &str {
        self.components.first().map(String::as_str).unwrap_or("")
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Read component `index` as a `YYYYMMDD` date. The component may carry
    /// a non-numeric prefix (e.g. a date code); only the trailing eight
    /// digits are read.
    pub fn as_date(&self, index: usize) -> Option<NaiveDate> {
        let component = self.component(index)?;
        let digits: String = component
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if digits.len() < 8 {
            return None;
        }
        NaiveDate::parse_from_str(&digits[digits.len() - 8..], "%Y%m%d").ok()
    }

    /// Read component `index` as a SWIFT amount: optional currency prefix,
    /// digits with a comma decimal separator (`EUR1234,56`).
    pub fn as_amount(&self, index: usize) -> Option<Decimal> {
        let component = self.component(index)?;
        let start = component.find(|c: char| c.is_ascii_digit())?;
        let number = component[start..].replace(',', ".");
        // `500,` is a legal SWIFT amount; strip the dangling separator.
        Decimal::from_str(number.trim_end_matches('.')).ok()
    }

    /// Currency prefix of an amount component, if present.
    pub fn currency(&self, index: usize) -> Option<&str> {
        let component = self.component(index)?;
        let start = component.find(|c: char| c.is_ascii_digit())?;
        let prefix = &component[..start];
        (prefix.len() == 3 && prefix.bytes().all(|b| b.is_ascii_uppercase())).then_some(prefix)
    }
}
