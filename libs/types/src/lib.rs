//! # MT Types - ISO 15022 Message Data Model
//!
//! Pure data structures for SWIFT MT (FIN) messages: tags, blocks, the
//! generic field decomposition, and message type identifiers. No wire
//! parsing lives here; `mt-codec` turns FIN text into these types and back.
//!
//! ## Architecture Role
//!
//! ```text
//! mt-types  →  mt-codec  →  applications
//!    ↑             ↓
//! Pure Data   Parsing Rules
//! Tag/Block   Sequences/Validation
//! ```
//!
//! ## Design Notes
//!
//! - Tag order is significant in block 4, so [`TagListBlock`] is a vector
//!   with linear lookup, not a map.
//! - Typed readers ([`Field::as_amount`], [`Field::as_date`]) return
//!   `rust_decimal::Decimal` and `chrono::NaiveDate`; raw strings are never
//!   re-parsed at call sites.

pub mod block;
pub mod error;
pub mod field;
pub mod mt;
pub mod qualifiers;
pub mod tag;

pub use block::{ApplicationHeader, BasicHeader, SubfieldBlock, TagListBlock};
pub use error::{TypeError, TypeResult};
pub use field::Field;
pub use mt::MtType;
pub use tag::Tag;
