//! Single cell values

use std::cmp::Ordering;
use std::fmt;

/// A single value of one of the column element types.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// 64-bit float
    Float(f64),
    /// 64-bit signed integer
    Int(i64),
    /// UTF-8 text
    Text(String),
    /// Boolean
    Bool(bool),
}

impl Scalar {
    /// Returns the numeric value, promoting integers and booleans to float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Float(v) => Some(*v),
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Scalar::Text(_) => None,
        }
    }

    /// Returns the type name used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Scalar::Float(_) => "float",
            Scalar::Int(_) => "int",
            Scalar::Text(_) => "text",
            Scalar::Bool(_) => "bool",
        }
    }

    /// Compares two scalars of compatible kinds.
    ///
    /// Numbers compare numerically across int/float, text compares
    /// lexicographically. Mixed text/number and NaN comparisons return `None`.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Text(a), Scalar::Text(b)) => Some(a.cmp(b)),
            (Scalar::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
            (Scalar::Text(_), _) | (_, Scalar::Text(_)) => None,
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Text(v) => write!(f, "{}", v),
            Scalar::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(i64::from(v))
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_compare_across_kinds() {
        assert_eq!(
            Scalar::Int(2).compare(&Scalar::Float(1.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Scalar::Float(2.0).compare(&Scalar::Int(2)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_text_compare() {
        assert_eq!(
            Scalar::from("ip1").compare(&Scalar::from("ip3")),
            Some(Ordering::Less)
        );
        assert_eq!(Scalar::from("ip1").compare(&Scalar::Float(1.0)), None);
    }

    #[test]
    fn test_nan_is_unordered() {
        assert_eq!(Scalar::Float(f64::NAN).compare(&Scalar::Float(1.0)), None);
    }
}
