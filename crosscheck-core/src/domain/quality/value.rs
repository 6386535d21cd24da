// crosscheck-core/src/domain/quality/value.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed scalar read from one system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ScalarValue {
    /// Numeric coercion: integers, decimals and numeric strings. Non-finite values don't count.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Self::Int(i) => *i as f64,
            Self::Float(f) => *f,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Null | Self::Bool(_) => return None,
        };
        n.is_finite().then_some(n)
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Result of a point lookup. `NotFound` means no row for the key in that system,
/// which is different from a row whose column is NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Found(ScalarValue),
    NotFound,
}

impl FetchOutcome {
    /// The value if a row exists and the column is not NULL.
    pub fn present(&self) -> Option<&ScalarValue> {
        match self {
            Self::Found(ScalarValue::Null) | Self::NotFound => None,
            Self::Found(value) => Some(value),
        }
    }

    pub fn into_value(self) -> Option<ScalarValue> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(ScalarValue::Int(-15).as_number(), Some(-15.0));
        assert_eq!(ScalarValue::Float(101.25).as_number(), Some(101.25));
        assert_eq!(ScalarValue::Text(" 42.5 ".into()).as_number(), Some(42.5));
        assert_eq!(ScalarValue::Text("abc".into()).as_number(), None);
        assert_eq!(ScalarValue::Text("NaN".into()).as_number(), None);
        assert_eq!(ScalarValue::Bool(true).as_number(), None);
        assert_eq!(ScalarValue::Null.as_number(), None);
    }

    #[test]
    fn test_present_distinguishes_null_and_missing_row() {
        assert!(FetchOutcome::NotFound.present().is_none());
        assert!(FetchOutcome::Found(ScalarValue::Null).present().is_none());
        assert_eq!(
            FetchOutcome::Found(ScalarValue::Int(3)).present(),
            Some(&ScalarValue::Int(3))
        );
        assert_eq!(FetchOutcome::NotFound.into_value(), None);
        assert_eq!(
            FetchOutcome::Found(ScalarValue::Null).into_value(),
            Some(ScalarValue::Null)
        );
    }
}
