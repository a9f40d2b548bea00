use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A single cell of a dataset.
///
/// `Nested` holds a JSON array or object that ended up in a cell position.
/// It is kept so the dataset can still be built; statistics over a column
/// containing one fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Nested(Value),
}

/// Hashable identity of a scalar used for distinct counts and frequencies.
///
/// Integers and floats share one numeric identity (`1 == 1.0`), other types
/// never compare equal across variants. Integers are keyed exactly; a float
/// only shares an `Int` key when it holds an integral value in `i64` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKey<'a> {
    Bool(bool),
    Int(i64),
    /// Bit pattern of a non-integral float.
    Float(u64),
    Text(&'a str),
}

impl Scalar {
    /// Null and NaN are both treated as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Numeric value of an integer or float cell. Booleans are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Scalar::Int(_) | Scalar::Float(_))
    }

    /// Identity for counting, `None` for missing values and nested values.
    pub fn key(&self) -> Option<ScalarKey<'_>> {
        match self {
            Scalar::Null | Scalar::Nested(_) => None,
            Scalar::Bool(b) => Some(ScalarKey::Bool(*b)),
            Scalar::Int(i) => Some(ScalarKey::Int(*i)),
            Scalar::Float(f) if f.is_nan() => None,
            Scalar::Float(f) => Some(float_key(*f)),
            Scalar::Text(s) => Some(ScalarKey::Text(s)),
        }
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "boolean",
            Scalar::Int(_) => "integer",
            Scalar::Float(_) => "number",
            Scalar::Text(_) => "string",
            Scalar::Nested(Value::Array(_)) => "array",
            Scalar::Nested(_) => "object",
        }
    }
}

fn float_key(f: f64) -> ScalarKey<'static> {
    // -2^63 converts exactly; 2^63 is already out of range
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        // also folds -0.0 into 0
        ScalarKey::Int(f as i64)
    } else {
        ScalarKey::Float(f.to_bits())
    }
}

impl From<&Value> for Scalar {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Scalar::Null,
            Value::Bool(b) => Scalar::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Scalar::Int(i),
                None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Scalar::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Scalar::Nested(value.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(v) if v.is_nan() => Ok(()),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Nested(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Scalar::Float(_) => serializer.serialize_unit(),
            Scalar::Text(s) => serializer.serialize_str(s),
            Scalar::Nested(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Scalar::from(&value))
    }
}
