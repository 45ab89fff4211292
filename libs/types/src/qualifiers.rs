//! Sequence qualifier constants.
//!
//! Each constant is the value carried by the `16R`/`16S` boundary tags of a
//! delimited sequence. Only the qualifiers used by the built-in message
//! schemas are listed; field-level qualifiers (SEME, SETT, ...) travel as
//! plain strings through [`crate::Field`].

// ---------------------------------------------------------------------------
// Common sequences
// ---------------------------------------------------------------------------

/// General information sequence, the mandatory opening sequence of most
/// category 5 messages.
pub const GENL: &str = "GENL";

/// Linkages subsequence, repeats inside GENL.
pub const LINK: &str = "LINK";

// ---------------------------------------------------------------------------
// MT514 (trade allocation instruction)
// ---------------------------------------------------------------------------

/// Confirmation details sequence.
pub const CONFDET: &str = "CONFDET";

/// Confirmation parties subsequence, repeats inside CONFDET.
pub const CONFPRTY: &str = "CONFPRTY";

/// Settlement details sequence.
pub const SETDET: &str = "SETDET";

/// Settlement parties subsequence, repeats inside SETDET.
pub const SETPRTY: &str = "SETPRTY";

/// Other parties sequence.
pub const OTHRPRTY: &str = "OTHRPRTY";

// ---------------------------------------------------------------------------
// MT569 (triparty collateral and exposure statement)
// ---------------------------------------------------------------------------

/// Overall summary sequence.
pub const SUMM: &str = "SUMM";

/// Summary by exposure type subsequence.
pub const SUME: &str = "SUME";

/// Transaction details sequence.
pub const TRANSDET: &str = "TRANSDET";

// ---------------------------------------------------------------------------
// MT574/W8BENO (IRS beneficial owner withholding statement)
// ---------------------------------------------------------------------------

/// Beneficial owner details sequence.
pub const BENODET: &str = "BENODET";

// ---------------------------------------------------------------------------
// MT577 (statement of numbers)
// ---------------------------------------------------------------------------

/// Statement details sequence.
pub const STATDET: &str = "STATDET";
