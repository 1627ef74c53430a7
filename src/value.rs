use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::data_type::DataType;

/// Represents a single data value stored in the database.
///
/// This enum wraps all supported Rust types into a single type that can be
/// passed around the engine. It includes support for SQL `NULL` values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// represents an empty or missing value.
    Null,
    /// A 64-bit signed integer value.
    Int(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A UTF-8 string value, wrapped in an [Arc] for efficient,
    /// thread-safe sharing and cheap cloning.
    Text(Arc<str>),
    /// A boolean value.
    Bool(bool),
}

impl Value {
    /// Returns `true` if the value is [Value::Null].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the inner integer value if this is a [Value::Int].
    /// Otherwise, returns `None`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the inner float value if this is a [Value::Float].
    /// Otherwise, returns `None`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns a reference to the inner string slice if this is a [Value::Text].
    /// Otherwise, returns `None`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the inner boolean value if this is a [Value::Bool].
    /// Otherwise, returns `None`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the storage [DataType] corresponding to this value.
    ///
    /// Returns `None` if the value is [Value::Null], because in this database
    /// engine, a standalone NULL value is untyped until it is placed in a column.
    /// Text values report [DataType::Text]; VARCHAR is a column-level refinement.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::Int(_) => Some(DataType::Integer),
            Self::Float(_) => Some(DataType::Float),
            Self::Text(_) => Some(DataType::Text),
            Self::Bool(_) => Some(DataType::Boolean),
        }
    }

    /// Short kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Int(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::Text(_) => "TEXT",
            Self::Bool(_) => "BOOLEAN",
        }
    }

    /// Kind-aware equality between two non-null values.
    ///
    /// Integers and floats compare numerically; an integer only equals a float
    /// holding exactly that integer. Values of different families are never
    /// equal. `Null` is only equal to `Null` here; the evaluator applies its
    /// own NULL rules before reaching this.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => {
                exact_int(*b) == Some(*a)
            }
            _ => self == other,
        }
    }

    /// Ordering between two values of the same family.
    ///
    /// Returns `None` for mixed families, for `Null`, and for NaN floats.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Returns `true` when both values belong to the same comparison family
    /// (numeric, text or boolean).
    pub fn is_comparable_with(&self, other: &Value) -> bool {
        matches!(
            (self, other),
            (Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_))
                | (Self::Text(_), Self::Text(_))
                | (Self::Bool(_), Self::Bool(_))
        )
    }
}

/// The integer a float represents exactly, if any.
/// `-0.0` maps to `0`.
pub(crate) fn exact_int(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range.
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(Arc::from(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_type::DataType;

    // ─────────────────────────────────────────────────────────────
    // Test 1 : is_null
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_is_null() {
        assert!(Value::Null.is_null());
        assert!(!Value::Int(1).is_null());
        assert!(!Value::Float(1.0).is_null());
        assert!(!Value::Text("x".into()).is_null());
        assert!(!Value::Bool(true).is_null());
    }

    // ─────────────────────────────────────────────────────────────
    // Test 2 : accessors
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(42).as_int(), Some(42));
        assert_eq!(Value::Float(1.0).as_int(), None);
        assert_eq!(Value::Float(2.5).as_float(), Some(2.5));
        assert_eq!(Value::Int(1).as_float(), None);
        assert_eq!(Value::from("hello").as_str(), Some("hello"));
        assert_eq!(Value::Null.as_str(), None);
        assert_eq!(Value::Bool(false).as_bool(), Some(false));
        assert_eq!(Value::Int(1).as_bool(), None);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 3 : data_type
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_data_type() {
        assert_eq!(Value::Null.data_type(), None);
        assert_eq!(Value::Int(1).data_type(), Some(DataType::Integer));
        assert_eq!(Value::Float(1.0).data_type(), Some(DataType::Float));
        assert_eq!(Value::Text("x".into()).data_type(), Some(DataType::Text));
        assert_eq!(Value::Bool(true).data_type(), Some(DataType::Boolean));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 4 : equals across numeric kinds
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_equals_numeric() {
        assert!(Value::Int(10).equals(&Value::Float(10.0)));
        assert!(Value::Float(10.0).equals(&Value::Int(10)));
        assert!(!Value::Int(10).equals(&Value::Float(10.5)));
        assert!(Value::Int(0).equals(&Value::Float(-0.0)));
        assert!(!Value::Float(f64::NAN).equals(&Value::Float(f64::NAN)));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 5 : equals never crosses families
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_equals_families() {
        assert!(!Value::Bool(true).equals(&Value::Int(1)));
        assert!(!Value::Int(1).equals(&Value::Bool(true)));
        assert!(!Value::from("1").equals(&Value::Int(1)));
        assert!(Value::from("abc").equals(&Value::from("abc")));
        assert!(!Value::from("abc").equals(&Value::from("ABC")));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 6 : compare
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_compare() {
        assert_eq!(Value::Int(1).compare(&Value::Int(2)), Some(Ordering::Less));
        assert_eq!(
            Value::Int(3).compare(&Value::Float(2.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::from("a").compare(&Value::from("b")),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::Bool(false).compare(&Value::Bool(true)),
            Some(Ordering::Less)
        );
        assert_eq!(Value::from("a").compare(&Value::Int(1)), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
        assert_eq!(Value::Float(f64::NAN).compare(&Value::Float(1.0)), None);
    }

    #[test]
    fn test_comparable_families() {
        assert!(Value::Int(1).is_comparable_with(&Value::Float(1.0)));
        assert!(!Value::Int(1).is_comparable_with(&Value::Bool(true)));
        assert!(!Value::Null.is_comparable_with(&Value::Null));
    }

    #[test]
    fn test_exact_int_bounds() {
        assert_eq!(exact_int(3.0), Some(3));
        assert_eq!(exact_int(3.5), None);
        assert_eq!(exact_int(f64::INFINITY), None);
        assert_eq!(exact_int(9.3e18), None);
    }

    #[test]
    fn test_display_and_from() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Int(-4).to_string(), "-4");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::from("hi").to_string(), "hi");
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(true)), Value::Bool(true));
    }
}
