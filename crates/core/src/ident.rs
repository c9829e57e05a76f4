//! Canonical BOM identifiers
//!
//! Exports mix numeric and textual ids ("123", "123.0", " 123 "). Every id is
//! normalized once, at ingestion, into a [`BomId`] so that all later equality
//! and hashing is done on one form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized BOM component identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BomId {
    /// Integer-like ids, including whole floats such as `123.0`
    Number(i64),
    /// Anything else, trimmed
    Text(String),
}

/// How strictly a source's identifier columns are normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdPolicy {
    /// Integer ids become `Number`, everything else becomes `Text`
    #[default]
    Lenient,
    /// Only integer ids are accepted
    Integer,
}

impl BomId {
    /// Normalize a raw cell value.
    ///
    /// Returns `None` for blank input, and for non-integer input under
    /// [`IdPolicy::Integer`].
    pub fn parse(raw: &str, policy: IdPolicy) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(n) = parse_integer(trimmed) {
            return Some(Self::Number(n));
        }

        match policy {
            IdPolicy::Lenient => Some(Self::Text(trimmed.to_string())),
            IdPolicy::Integer => None,
        }
    }
}

/// Parse `123`, `+123`, `123.0` and `1.23e2` as integers; reject fractions.
fn parse_integer(s: &str) -> Option<i64> {
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }

    let f = s.parse::<f64>().ok()?;
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl fmt::Display for BomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for BomId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for BomId {
    /// Lenient normalization; blank strings become an empty `Text` id, which
    /// never matches a graph node.
    fn from(s: &str) -> Self {
        Self::parse(s, IdPolicy::Lenient).unwrap_or_else(|| Self::Text(String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("123", Some(BomId::Number(123)))]
    #[case("123.0", Some(BomId::Number(123)))]
    #[case("  123 ", Some(BomId::Number(123)))]
    #[case("-7", Some(BomId::Number(-7)))]
    #[case("1.23e2", Some(BomId::Number(123)))]
    #[case("123.5", Some(BomId::Text("123.5".to_string())))]
    #[case(" PN-0042 ", Some(BomId::Text("PN-0042".to_string())))]
    #[case("", None)]
    #[case("   ", None)]
    fn test_parse_lenient(#[case] raw: &str, #[case] expected: Option<BomId>) {
        assert_eq!(BomId::parse(raw, IdPolicy::Lenient), expected);
    }

    #[rstest]
    #[case("123", Some(BomId::Number(123)))]
    #[case("123.0", Some(BomId::Number(123)))]
    #[case("123.5", None)]
    #[case("PN-0042", None)]
    #[case("nan", None)]
    #[case("inf", None)]
    fn test_parse_integer_policy(#[case] raw: &str, #[case] expected: Option<BomId>) {
        assert_eq!(BomId::parse(raw, IdPolicy::Integer), expected);
    }

    #[test]
    fn test_equivalent_spellings_collapse() {
        let a = BomId::parse("123", IdPolicy::Lenient);
        let b = BomId::parse("123.0", IdPolicy::Lenient);
        let c = BomId::parse(" 123", IdPolicy::Integer);
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_display() {
        assert_eq!(BomId::Number(42).to_string(), "42");
        assert_eq!(BomId::from("ABC ").to_string(), "ABC");
    }

    #[test]
    fn test_serializes_untagged() {
        assert_eq!(serde_json::to_string(&BomId::Number(5)).unwrap(), "5");
        assert_eq!(
            serde_json::to_string(&BomId::Text("X1".into())).unwrap(),
            "\"X1\""
        );
    }
}
