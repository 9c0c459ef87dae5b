//! Type descriptors and the type-erased cell value.
//!
//! Every column stores a single native type, but the generic `get`/`set`
//! surface of columns, tables and tuples exchanges [`Value`]s. `Value` is a
//! closed enum so that coercion rules stay exhaustively matched: adding a
//! new column type forces every conversion site to be revisited.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format used when rendering and parsing date values.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Data types supported by table columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int,
    Long,
    Float,
    Double,
    Boolean,
    String,
    Date,
    /// Fallback column type that holds any value, including null.
    Object,
}

impl DataType {
    pub const ALL: [DataType; 8] = [
        DataType::Int,
        DataType::Long,
        DataType::Float,
        DataType::Double,
        DataType::Boolean,
        DataType::String,
        DataType::Date,
        DataType::Object,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Long => "long",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::Boolean => "boolean",
            DataType::String => "string",
            DataType::Date => "date",
            DataType::Object => "object",
        }
    }

    /// Look up a type by name. Accepts a few common aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" | "i32" => Some(DataType::Int),
            "long" | "bigint" | "i64" => Some(DataType::Long),
            "float" | "real" | "f32" => Some(DataType::Float),
            "double" | "f64" => Some(DataType::Double),
            "boolean" | "bool" => Some(DataType::Boolean),
            "string" | "varchar" | "text" => Some(DataType::String),
            "date" | "timestamp" => Some(DataType::Date),
            "object" | "any" => Some(DataType::Object),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int | DataType::Long | DataType::Float | DataType::Double
        )
    }

    /// Only object columns can hold null.
    pub fn accepts_null(&self) -> bool {
        matches!(self, DataType::Object)
    }

    /// Whether a value of this type can be read or stored as `target`
    /// without an explicit conversion.
    ///
    /// Integers widen to every wider numeric type (int -> float uses the
    /// IEEE-754 round-to-nearest conversion). Non-numeric types only widen
    /// to themselves. Everything widens to `Object`.
    pub fn widens_to(&self, target: DataType) -> bool {
        if *self == target || target == DataType::Object {
            return true;
        }
        matches!(
            (self, target),
            (DataType::Int, DataType::Long)
                | (DataType::Int, DataType::Float)
                | (DataType::Int, DataType::Double)
                | (DataType::Long, DataType::Float)
                | (DataType::Long, DataType::Double)
                | (DataType::Float, DataType::Double)
        )
    }

    /// Value a freshly allocated cell of this type holds when no explicit
    /// default is given.
    pub fn default_value(&self) -> Value {
        match self {
            DataType::Int => Value::Int(0),
            DataType::Long => Value::Long(0),
            DataType::Float => Value::Float(0.0),
            DataType::Double => Value::Double(0.0),
            DataType::Boolean => Value::Boolean(false),
            DataType::String => Value::String(String::new()),
            DataType::Date => Value::Date(epoch()),
            DataType::Object => Value::Null,
        }
    }

    /// Numeric promotion rank used by arithmetic and comparisons.
    pub(crate) fn numeric_rank(&self) -> Option<u8> {
        match self {
            DataType::Int => Some(0),
            DataType::Long => Some(1),
            DataType::Float => Some(2),
            DataType::Double => Some(3),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values that can be stored in a table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
    Date(NaiveDateTime),
}

impl Value {
    /// Get the data type of this value
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Int(_) => Some(DataType::Int),
            Value::Long(_) => Some(DataType::Long),
            Value::Float(_) => Some(DataType::Float),
            Value::Double(_) => Some(DataType::Double),
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::String(_) => Some(DataType::String),
            Value::Date(_) => Some(DataType::Date),
        }
    }

    /// Name of the value's category, used in error messages.
    pub fn type_name(&self) -> &'static str {
        self.data_type().map_or("null", |t| t.as_str())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_numeric(&self) -> bool {
        self.data_type().is_some_and(|t| t.is_numeric())
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Int(v) => Some(*v as f32),
            Value::Long(v) => Some(*v as f32),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(f64::from(*v)),
            Value::Long(v) => Some(*v as f64),
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(v) => Some(*v),
            _ => None,
        }
    }
}

/// Parse a date in `YYYY-MM-DD HH:MM:SS[.fff]` or `YYYY-MM-DD` form.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// The Unix epoch, used as the default value of date columns.
pub fn epoch() -> NaiveDateTime {
    NaiveDateTime::default()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
