//! Value coercion from untyped query-string input.
//!
//! Every function here is pure and deterministic: the same raw input always
//! produces the same typed output, and nothing performs I/O.

use regex::{Regex, RegexBuilder};

use crate::error::CoercionError;
use crate::value::{Number, RawValue};

/// Separator that turns a single value into a list.
pub const LIST_SEPARATOR: char = ',';

const TRUE_WORDS: [&str; 5] = ["true", "yes", "y", "1", ""];
const FALSE_WORDS: [&str; 4] = ["false", "no", "n", "0"];

/// Returns `true` if `value` looks like a number.
///
/// The first character must be a digit, `+` or `-`; the rest must be digits
/// with at most one decimal point. Exponents, `inf` and `nan` are rejected.
///
/// ```
/// use instant_filter::coerce::is_numeric;
///
/// assert!(is_numeric("42"));
/// assert!(is_numeric("-3.5"));
/// assert!(!is_numeric("1.2.3"));
/// assert!(!is_numeric("1e5"));
/// ```
pub fn is_numeric(value: &str) -> bool {
    let mut chars = value.chars();

    match chars.next() {
        Some(c) if c.is_ascii_digit() || c == '+' || c == '-' => {}
        _ => return false,
    }

    let mut dots = 0;
    for c in chars {
        if c == '.' {
            dots += 1;
            if dots > 1 {
                return false;
            }
        } else if !c.is_ascii_digit() {
            return false;
        }
    }

    true
}

/// Parses `value` as a number, integer first, falling back to floating point.
///
/// Returns `None` for anything [`is_numeric`] rejects, and for the sign-only
/// strings it accepts (`"+"`, `"-"`). Callers that need a default use
/// `as_number(v).unwrap_or(default)`.
pub fn as_number(value: &str) -> Option<Number> {
    if !is_numeric(value) {
        return None;
    }

    if let Ok(n) = value.parse::<i64>() {
        return Some(Number::I64(n));
    }
    if let Ok(n) = value.parse::<u64>() {
        return Some(Number::U64(n));
    }

    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(Number::F64)
}

/// Reads a raw value as a list of raw string tokens.
///
/// Lists pass through, a single value containing `,` is split, anything else
/// becomes a one-element list.
pub fn as_list(value: &RawValue) -> Vec<String> {
    match value {
        RawValue::List(items) => items.clone(),
        RawValue::Single(s) if s.contains(LIST_SEPARATOR) => {
            s.split(LIST_SEPARATOR).map(String::from).collect()
        }
        RawValue::Single(s) => vec![s.clone()],
    }
}

/// [`as_list`] with every token that parses as a number replaced by it.
pub fn as_list_with_numerics(value: &RawValue) -> Vec<serde_json::Value> {
    as_list(value)
        .into_iter()
        .map(|token| match as_number(&token) {
            Some(n) => n.into(),
            None => serde_json::Value::String(token),
        })
        .collect()
}

/// Parses a boolean from the case-insensitive vocabularies
/// `true/yes/y/1/""` and `false/no/n/0`. Any other numeric value maps to
/// `true`, or `false` when it is zero.
pub fn as_bool(value: &str) -> Result<bool, CoercionError> {
    let lowered = value.to_lowercase();

    if TRUE_WORDS.contains(&lowered.as_str()) {
        Ok(true)
    } else if FALSE_WORDS.contains(&lowered.as_str()) {
        Ok(false)
    } else if let Some(n) = as_number(value) {
        Ok(number_as_bool(n))
    } else {
        Err(CoercionError::InvalidBooleanValue(value.to_string()))
    }
}

fn number_as_bool(value: Number) -> bool {
    value.to_f64() != 0.0
}

/// A compiled regular expression and the flags it was built with.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    case_insensitive: bool,
}

impl Pattern {
    /// Returns the pattern source, without flags.
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns `true` if the pattern folds case.
    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Returns the compiled expression.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Pattern text as stored in the query document. Case folding is carried
    /// as an inline `(?i)` flag so the `$regex` mapping stays single-keyed.
    pub fn to_document_string(&self) -> String {
        if self.case_insensitive {
            format!("(?i){}", self.regex.as_str())
        } else {
            self.regex.as_str().to_string()
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source() == other.source() && self.case_insensitive == other.case_insensitive
    }
}

/// Compiles `value` into a [`Pattern`]. Anchoring is left to the caller.
pub fn as_pattern(value: &str, case_insensitive: bool) -> Result<Pattern, CoercionError> {
    let regex = RegexBuilder::new(value)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| CoercionError::InvalidPattern {
            pattern: value.to_string(),
            source,
        })?;

    Ok(Pattern {
        regex,
        case_insensitive,
    })
}
