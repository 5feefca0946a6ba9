#![deny(unsafe_code)]

//! Cell values and column types.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A single cell value.
///
/// Floats compare by bit pattern for `Eq`/`Hash` so values can key maps
/// (row labels are built from values). Use [`Value::loose_eq`] and
/// [`Value::compare`] for query semantics and [`Value::sort_cmp`] for ordering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(v) => v.hash(state),
            Self::Int(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Text(v) => v.hash(state),
        }
    }
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Null or a NaN float; sorting puts these last.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the value; `None` for non-numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn dtype(&self) -> Option<DType> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(DType::Bool),
            Self::Int(_) => Some(DType::Int),
            Self::Float(_) => Some(DType::Float),
            Self::Text(_) => Some(DType::Text),
        }
    }

    /// Parses free text the way a user types it into a cell.
    ///
    /// Empty input is null, `true`/`false` are booleans, anything that parses
    /// as a number becomes `Int` or `Float`, and the rest stays text.
    pub fn parse_literal(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Null;
        }
        if let Some(flag) = parse_bool(trimmed) {
            return Self::Bool(flag);
        }
        if let Ok(int) = trimmed.parse::<i64>() {
            return Self::Int(int);
        }
        if trimmed.chars().any(|ch| ch.is_ascii_digit())
            && let Ok(float) = trimmed.parse::<f64>()
        {
            return Self::Float(float);
        }
        Self::Text(raw.to_string())
    }

    /// Total order used for sorting. Nulls sort after every other value.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Int(a), Self::Float(b)) => cmp_int_float(*a, *b),
            (Self::Float(a), Self::Int(b)) => cmp_int_float(*b, *a).reverse(),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => self.rank().cmp(&other.rank()),
            },
        }
    }

    /// Partial comparison for predicates; `None` when the values are not comparable.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Int(_), Self::Float(f)) | (Self::Float(f), Self::Int(_)) if f.is_nan() => None,
            (Self::Int(a), Self::Float(b)) => Some(cmp_int_float(*a, *b)),
            (Self::Float(a), Self::Int(b)) => Some(cmp_int_float(*b, *a).reverse()),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }

    /// Equality for predicates: numbers compare numerically, null equals nothing.
    pub fn loose_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => false,
            (Self::Int(a), Self::Int(b)) => a == b,
            _ if self.is_numeric() && other.is_numeric() => self.as_f64() == other.as_f64(),
            _ => self == other,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Int(_) | Self::Float(_) => 1,
            Self::Text(_) => 2,
            Self::Null => 3,
        }
    }
}

/// Exact comparison of an integer with a float. NaN sorts after every
/// integer.
fn cmp_int_float(int: i64, float: f64) -> Ordering {
    // 2^63; every finite float at or above it exceeds i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if float.is_nan() || float >= LIMIT {
        return Ordering::Less;
    }
    if float < -LIMIT {
        return Ordering::Greater;
    }
    let whole = float.trunc();
    // in range, so the cast is exact
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(float - whole)).unwrap_or(Ordering::Equal),
        unequal => unequal,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Formats a floating-point number without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(v) => write!(f, "{}", if *v { "True" } else { "False" }),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&format_numeric(*v)),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Column storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Bool,
    Int,
    Float,
    Text,
    /// Heterogeneous column; accepts any value.
    Mixed,
}

impl DType {
    /// Short display name shown in column statistics.
    pub fn label(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int64",
            Self::Float => "float64",
            Self::Text => "string",
            Self::Mixed => "object",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }

    /// Smallest type able to hold values of both `self` and `other`.
    pub fn widen(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (Self::Int, Self::Float) | (Self::Float, Self::Int) => Self::Float,
            _ => Self::Mixed,
        }
    }

    /// Infers the type of a column from its values. All-null columns are `Mixed`.
    pub fn infer(values: &[Value]) -> Self {
        values
            .iter()
            .filter_map(Value::dtype)
            .reduce(Self::widen)
            .unwrap_or(Self::Mixed)
    }

    /// Converts `value` so it can be stored in a column of this type.
    ///
    /// Returns the original value as the error when it cannot be held
    /// without widening the column.
    pub fn coerce(self, value: Value) -> Result<Value, Value> {
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            (Self::Mixed, value) => Ok(value),
            (Self::Bool, Value::Bool(v)) => Ok(Value::Bool(v)),
            (Self::Bool, Value::Text(raw)) => parse_bool(raw.trim())
                .map(Value::Bool)
                .ok_or(Value::Text(raw)),
            (Self::Int, Value::Int(v)) => Ok(Value::Int(v)),
            (Self::Int, Value::Float(v))
                if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 =>
            {
                Ok(Value::Int(v as i64))
            }
            (Self::Int, Value::Text(raw)) => match raw.trim().parse::<i64>() {
                Ok(v) => Ok(Value::Int(v)),
                Err(_) => Err(Value::Text(raw)),
            },
            (Self::Float, Value::Float(v)) => Ok(Value::Float(v)),
            (Self::Float, Value::Int(v)) => Ok(Value::Float(v as f64)),
            (Self::Float, Value::Text(raw)) => match raw.trim().parse::<f64>() {
                Ok(v) => Ok(Value::Float(v)),
                Err(_) => Err(Value::Text(raw)),
            },
            (Self::Text, Value::Text(v)) => Ok(Value::Text(v)),
            (Self::Text, other) => Ok(Value::Text(other.to_string())),
            (_, other) => Err(other),
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_float_order_is_exact() {
        let big = 9_007_199_254_740_993_i64; // 2^53 + 1
        let float = Value::Float(9_007_199_254_740_992.0);
        assert_eq!(Value::Int(big).sort_cmp(&float), Ordering::Greater);
        assert_eq!(float.sort_cmp(&Value::Int(big)), Ordering::Less);
        assert_eq!(Value::Int(big - 1).sort_cmp(&float), Ordering::Equal);
        assert_eq!(Value::Int(-2).sort_cmp(&Value::Float(-2.5)), Ordering::Greater);
        assert_eq!(Value::Int(2).sort_cmp(&Value::Float(2.5)), Ordering::Less);
        assert_eq!(Value::Int(i64::MAX).sort_cmp(&Value::Float(1e19)), Ordering::Less);
        assert_eq!(Value::Int(3).compare(&Value::Float(f64::NAN)), None);
    }

    #[test]
    fn nan_is_missing() {
        assert!(Value::Float(f64::NAN).is_missing());
        assert!(Value::Null.is_missing());
        assert!(!Value::Float(0.0).is_missing());
    }

    #[test]
    fn parse_literal_detects_types() {
        assert_eq!(Value::parse_literal(""), Value::Null);
        assert_eq!(Value::parse_literal("42"), Value::Int(42));
        assert_eq!(Value::parse_literal("4.5"), Value::Float(4.5));
        assert_eq!(Value::parse_literal("True"), Value::Bool(true));
        assert_eq!(Value::parse_literal("inf"), Value::text("inf"));
        assert_eq!(Value::parse_literal("abc"), Value::text("abc"));
    }

    #[test]
    fn nulls_sort_last() {
        let mut values = vec![Value::Null, Value::Int(3), Value::Float(1.5), Value::Int(2)];
        values.sort_by(Value::sort_cmp);
        assert_eq!(
            values,
            vec![Value::Float(1.5), Value::Int(2), Value::Int(3), Value::Null]
        );
    }

    #[test]
    fn loose_eq_mixes_numbers() {
        assert!(Value::Int(2).loose_eq(&Value::Float(2.0)));
        assert!(!Value::Null.loose_eq(&Value::Null));
        assert!(!Value::text("2").loose_eq(&Value::Int(2)));
    }

    #[test]
    fn widen_and_coerce() {
        assert_eq!(DType::Int.widen(DType::Float), DType::Float);
        assert_eq!(DType::Int.widen(DType::Text), DType::Mixed);
        assert_eq!(DType::Int.coerce(Value::text("7")), Ok(Value::Int(7)));
        assert_eq!(DType::Int.coerce(Value::Float(7.0)), Ok(Value::Int(7)));
        assert_eq!(DType::Int.coerce(Value::Float(7.5)), Err(Value::Float(7.5)));
        assert_eq!(DType::Text.coerce(Value::Int(3)), Ok(Value::text("3")));
    }

    #[test]
    fn infer_all_null_is_mixed() {
        assert_eq!(DType::infer(&[Value::Null]), DType::Mixed);
        assert_eq!(DType::infer(&[Value::Int(1), Value::Null]), DType::Int);
    }

    #[test]
    fn float_display_strips_zeros() {
        assert_eq!(Value::Float(2.50).to_string(), "2.5");
        assert_eq!(Value::Float(3.0).to_string(), "3");
    }
}
