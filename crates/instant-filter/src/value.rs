//! Value types flowing through filter compilation.
//!
//! [`RawValue`] is what the HTTP layer hands over: one string, or an ordered
//! list of strings when a key repeats in the query string. [`Number`] is the
//! typed result of numeric coercion, and converts into a JSON number for the
//! query document.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Undecoded filter value as it came out of the query string.
///
/// # Example
///
/// ```
/// use instant_filter::RawValue;
///
/// let single = RawValue::from("42");
/// assert_eq!(single.as_single(), Some("42"));
///
/// let repeated = RawValue::from(vec!["a".to_string(), "b".to_string()]);
/// assert!(repeated.is_list());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// A key that appeared once.
    Single(String),
    /// A key that appeared several times, in query-string order.
    List(Vec<String>),
}

impl RawValue {
    /// Returns the string if this is a single value.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            RawValue::Single(s) => Some(s),
            RawValue::List(_) => None,
        }
    }

    /// Returns `true` if the key was repeated.
    pub fn is_list(&self) -> bool {
        matches!(self, RawValue::List(_))
    }

    /// Returns `true` if the value should be read as a list: either a
    /// repeated key, or a single string containing the `,` separator.
    pub fn is_listable(&self) -> bool {
        match self {
            RawValue::Single(s) => s.contains(','),
            RawValue::List(_) => true,
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Single(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Single(s)
    }
}

impl From<&RawValue> for RawValue {
    fn from(v: &RawValue) -> Self {
        v.clone()
    }
}

impl From<Vec<String>> for RawValue {
    fn from(v: Vec<String>) -> Self {
        RawValue::List(v)
    }
}

impl From<Vec<&str>> for RawValue {
    fn from(v: Vec<&str>) -> Self {
        RawValue::List(v.into_iter().map(String::from).collect())
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Single(s) => write!(f, "{}", s),
            RawValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// Numeric value produced by coercion.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers that overflow `i64`
/// - `F64` for decimals
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point. Always finite.
    F64(f64),
}

impl Number {
    /// Converts the number to f64.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<Number> for serde_json::Value {
    fn from(n: Number) -> Self {
        match n {
            Number::I64(n) => serde_json::Value::from(n),
            Number::U64(n) => serde_json::Value::from(n),
            // from_f64 only fails on non-finite input, which coercion never yields
            Number::F64(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}
