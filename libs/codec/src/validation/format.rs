//! # Field Format Patterns
//!
//! ## Purpose
//!
//! Compiler and matcher for the SWIFT field-format notation used by message
//! reference guides:
//!
//! ```text
//! 16x          up to 16 characters from the x set
//! 4!c          exactly 4 uppercase alphanumerics
//! 8!n          exactly 8 digits
//! 15d          decimal up to 15 characters, comma separator
//! 4*35x        up to 4 lines of up to 35 characters
//! :4!c//8!n    literal ':' , qualifier, literal '//', date
//! [N]          optional part
//! ```
//!
//! A pattern is compiled once into a [`FormatSpec`] and matched greedily
//! left to right. An optional part may overlap what follows it (the sign
//! `[N]` against a currency starting with `N`), so the matcher tries the
//! remainder both with and without each optional and keeps the parse that
//! works.

use thiserror::Error;

/// A pattern that failed to compile.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid format pattern {pattern:?} at position {position}: {reason}")]
pub struct FormatError {
    pub pattern: String,
    pub position: usize,
    pub reason: String,
}

/// A value that failed to match its pattern.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("format violation at position {position}: {reason}")]
pub struct FormatViolation {
    pub position: usize,
    pub reason: String,
}

/// SWIFT character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharSet {
    /// `n`: digits 0-9.
    Numeric,
    /// `a`: uppercase letters.
    Alpha,
    /// `c`: uppercase letters and digits.
    Alnum,
    /// `x`: the SWIFT x character set (printable subset).
    Character,
    /// `d`: digits with a mandatory comma decimal separator.
    Decimal,
}

impl CharSet {
    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'n' => Some(Self::Numeric),
            'a' => Some(Self::Alpha),
            'c' => Some(Self::Alnum),
            'x' => Some(Self::Character),
            'd' => Some(Self::Decimal),
            _ => None,
        }
    }

    fn contains(&self, c: char) -> bool {
        match self {
            Self::Numeric => c.is_ascii_digit(),
            Self::Alpha => c.is_ascii_uppercase(),
            Self::Alnum => c.is_ascii_uppercase() || c.is_ascii_digit(),
            Self::Character => {
                c.is_ascii_alphanumeric()
                    || matches!(
                        c,
                        '/' | '-' | '?' | ':' | '(' | ')' | '.' | ',' | '\'' | '+' | ' '
                    )
            }
            // Decimal consumption is handled separately; per-char this is
            // the digit set.
            Self::Decimal => c.is_ascii_digit(),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Numeric => "digit",
            Self::Alpha => "uppercase letter",
            Self::Alnum => "uppercase alphanumeric",
            Self::Character => "x-set character",
            Self::Decimal => "decimal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// `16x` / `4!c`: a run from one character class.
    Run { max: usize, exact: bool, set: CharSet },
    /// `4*35x`: up to `lines` newline-separated lines of up to `width`.
    Multiline { lines: usize, width: usize, set: CharSet },
    /// Verbatim text between the counted items.
    Literal(String),
    /// `[...]`: tried, and skipped entirely when it does not match.
    Optional(Vec<Token>),
}

/// A compiled field format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    pattern: String,
    tokens: Vec<Token>,
}

impl FormatSpec {
    /// Compile a pattern.
    pub fn parse(pattern: &str) -> Result<Self, FormatError> {
        let chars: Vec<char> = pattern.chars().collect();
        let (tokens, consumed) = Self::parse_tokens(pattern, &chars, 0, false)?;
        debug_assert_eq!(consumed, chars.len());
        Ok(Self {
            pattern: pattern.to_string(),
            tokens,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn parse_tokens(
        pattern: &str,
        chars: &[char],
        start: usize,
        in_optional: bool,
    ) -> Result<(Vec<Token>, usize), FormatError> {
        let err = |position: usize, reason: &str| FormatError {
            pattern: pattern.to_string(),
            position,
            reason: reason.to_string(),
        };

        let mut tokens = Vec::new();
        let mut pos = start;
        while pos < chars.len() {
            match chars[pos] {
                '[' => {
                    let (inner, next) = Self::parse_tokens(pattern, chars, pos + 1, true)?;
                    if next >= chars.len() || chars[next] != ']' {
                        return Err(err(pos, "unterminated optional group"));
                    }
                    if inner.is_empty() {
                        return Err(err(pos, "empty optional group"));
                    }
                    tokens.push(Token::Optional(inner));
                    pos = next + 1;
                }
                ']' => {
                    if !in_optional {
                        return Err(err(pos, "']' without matching '['"));
                    }
                    return Ok((tokens, pos));
                }
                c if c.is_ascii_digit() => {
                    let (first, after_first) = Self::read_number(chars, pos);
                    let mut cursor = after_first;
                    if cursor < chars.len() && chars[cursor] == '*' {
                        // lines*width + charset
                        let (width, after_width) = Self::read_number(chars, cursor + 1);
                        if after_width == cursor + 1 {
                            return Err(err(cursor + 1, "expected line width after '*'"));
                        }
                        cursor = after_width;
                        let Some(set) =
                            chars.get(cursor).copied().and_then(CharSet::from_letter)
                        else {
                            return Err(err(cursor, "expected character class letter"));
                        };
                        if set == CharSet::Decimal {
                            return Err(err(cursor, "decimal class cannot be multiline"));
                        }
                        tokens.push(Token::Multiline {
                            lines: first,
                            width,
                            set,
                        });
                        pos = cursor + 1;
                    } else {
                        let exact = cursor < chars.len() && chars[cursor] == '!';
                        if exact {
                            cursor += 1;
                        }
                        let Some(set) =
                            chars.get(cursor).copied().and_then(CharSet::from_letter)
                        else {
                            return Err(err(cursor, "expected character class letter"));
                        };
                        if exact && set == CharSet::Decimal {
                            return Err(err(cursor, "decimal class cannot be exact-length"));
                        }
                        tokens.push(Token::Run {
                            max: first,
                            exact,
                            set,
                        });
                        pos = cursor + 1;
                    }
                }
                _ => {
                    // Literal run up to the next structural character.
                    let literal_start = pos;
                    while pos < chars.len()
                        && !chars[pos].is_ascii_digit()
                        && chars[pos] != '['
                        && chars[pos] != ']'
                    {
                        pos += 1;
                    }
                    tokens.push(Token::Literal(
                        chars[literal_start..pos].iter().collect(),
                    ));
                }
            }
        }
        if in_optional {
            return Err(err(chars.len(), "unterminated optional group"));
        }
        Ok((tokens, pos))
    }

    fn read_number(chars: &[char], start: usize) -> (usize, usize) {
        let mut pos = start;
        let mut value = 0usize;
        while pos < chars.len() && chars[pos].is_ascii_digit() {
            value = value * 10 + (chars[pos] as usize - '0' as usize);
            pos += 1;
        }
        (value, pos)
    }

    /// Validate a value against the pattern. The whole value must be
    /// consumed.
    pub fn validate(&self, value: &str) -> Result<(), FormatViolation> {
        let chars: Vec<char> = value.chars().collect();
        let end = Self::match_tokens(&self.tokens, &chars, 0)?;
        if end != chars.len() {
            return Err(FormatViolation {
                position: end,
                reason: format!("trailing content after pattern {:?}", self.pattern),
            });
        }
        Ok(())
    }

    /// True when the value matches.
    pub fn matches(&self, value: &str) -> bool {
        self.validate(value).is_ok()
    }

    fn match_tokens(
        tokens: &[Token],
        chars: &[char],
        start: usize,
    ) -> Result<usize, FormatViolation> {
        let mut pos = start;
        for (index, token) in tokens.iter().enumerate() {
            match token {
                Token::Literal(text) => {
                    for expected in text.chars() {
                        match chars.get(pos) {
                            Some(&c) if c == expected => pos += 1,
                            Some(&c) => {
                                return Err(FormatViolation {
                                    position: pos,
                                    reason: format!("expected {expected:?}, found {c:?}"),
                                })
                            }
                            None => {
                                return Err(FormatViolation {
                                    position: pos,
                                    reason: format!("expected {expected:?}, found end of value"),
                                })
                            }
                        }
                    }
                }
                Token::Run { max, exact, set } => {
                    if *set == CharSet::Decimal {
                        pos = Self::match_decimal(chars, pos, *max)?;
                        continue;
                    }
                    let run_start = pos;
                    while pos < chars.len() && pos - run_start < *max && set.contains(chars[pos]) {
                        pos += 1;
                    }
                    let consumed = pos - run_start;
                    if *exact && consumed != *max {
                        return Err(FormatViolation {
                            position: pos,
                            reason: format!(
                                "expected exactly {max} {}s, found {consumed}",
                                set.describe()
                            ),
                        });
                    }
                    if !*exact && consumed == 0 {
                        // `16x` means 1 to 16 characters; a zero-width match
                        // only ever happens through an optional group.
                        return Err(FormatViolation {
                            position: pos,
                            reason: format!("expected at least one {}", set.describe()),
                        });
                    }
                }
                Token::Multiline { lines, width, set } => {
                    pos = Self::match_multiline(chars, pos, *lines, *width, *set)?;
                }
                Token::Optional(inner) => {
                    // Taking the optional must not starve the tokens after
                    // it: `[N]3!a` against "NOK" keeps the N for the
                    // currency. Accept the optional only when the rest of
                    // the pattern still matches afterwards.
                    let rest = &tokens[index + 1..];
                    if let Ok(after_inner) = Self::match_tokens(inner, chars, pos) {
                        if let Ok(end) = Self::match_tokens(rest, chars, after_inner) {
                            return Ok(end);
                        }
                    }
                    return Self::match_tokens(rest, chars, pos);
                }
            }
        }
        Ok(pos)
    }

    /// `15d`: digits with exactly one comma, at least one digit before it,
    /// no more than `max` characters in total.
    fn match_decimal(chars: &[char], start: usize, max: usize) -> Result<usize, FormatViolation> {
        let mut pos = start;
        let mut commas = 0usize;
        let mut digits = 0usize;
        while pos < chars.len() && pos - start < max {
            match chars[pos] {
                c if c.is_ascii_digit() => digits += 1,
                ',' if commas == 0 => commas += 1,
                _ => break,
            }
            pos += 1;
        }
        if digits == 0 {
            return Err(FormatViolation {
                position: start,
                reason: "expected a decimal amount".to_string(),
            });
        }
        if commas != 1 {
            return Err(FormatViolation {
                position: pos,
                reason: "decimal amount requires a comma separator".to_string(),
            });
        }
        Ok(pos)
    }

    fn match_multiline(
        chars: &[char],
        start: usize,
        lines: usize,
        width: usize,
        set: CharSet,
    ) -> Result<usize, FormatViolation> {
        let mut pos = start;
        let mut line = 0usize;
        let mut column = 0usize;
        if pos >= chars.len() {
            return Err(FormatViolation {
                position: pos,
                reason: "expected at least one line of text".to_string(),
            });
        }
        while pos < chars.len() {
            let c = chars[pos];
            if c == '\n' {
                line += 1;
                if line >= lines {
                    return Err(FormatViolation {
                        position: pos,
                        reason: format!("more than {lines} lines"),
                    });
                }
                column = 0;
            } else {
                if column >= width {
                    return Err(FormatViolation {
                        position: pos,
                        reason: format!("line longer than {width} characters"),
                    });
                }
                if !set.contains(c) {
                    return Err(FormatViolation {
                        position: pos,
                        reason: format!("{c:?} is not a {}", set.describe()),
                    });
                }
                column += 1;
            }
            pos += 1;
        }
        Ok(pos)
    }
}
