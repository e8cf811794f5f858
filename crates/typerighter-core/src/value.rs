//! Dynamic values flowing through the engine
//!
//! [`Value`] is both the raw (primitive) input and the converted (native)
//! output of every type. [`Native`] names the in-memory representation a type
//! coerces into.

use std::fmt::{self, Display, Formatter};

use chrono::{FixedOffset, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Insertion-ordered mapping of field name to value
pub type Map = IndexMap<String, Value>;

/// A dynamically typed value
///
/// `Unset` means "no value supplied yet"; `Null` means "explicitly no value".
/// Both count as falsy for most checks, but only `Unset` trips `required`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Field has no value yet
    #[default]
    Unset,
    /// Field explicitly has no value
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text
    Str(String),
    /// Ordered sequence
    List(Vec<Value>),
    /// Ordered mapping
    Map(Map),
    /// Date and time of day, optionally with a UTC offset
    DateTime(Timestamp),
    /// Time of day
    Time(NaiveTime),
}

/// A date-time that may or may not carry a fixed UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    /// Wall-clock date and time
    pub local: NaiveDateTime,
    /// Offset from UTC, `None` for naive timestamps
    pub offset: Option<FixedOffset>,
}

impl Timestamp {
    /// Create naive timestamp
    #[inline]
    #[must_use]
    pub fn naive(local: NaiveDateTime) -> Self {
        Self {
            local,
            offset: None,
        }
    }

    /// Create timestamp with a UTC offset
    #[inline]
    #[must_use]
    pub fn with_offset(local: NaiveDateTime, offset: FixedOffset) -> Self {
        Self {
            local,
            offset: Some(offset),
        }
    }

    /// Render as `%Y-%m-%dT%H:%M:%S.ffffff` plus `±hhmm` when an offset is set
    #[must_use]
    pub fn to_iso8601(&self) -> String {
        let mut out = self.local.format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
        if let Some(offset) = self.offset {
            let seconds = offset.local_minus_utc();
            let sign = if seconds < 0 { '-' } else { '+' };
            let minutes = seconds.abs() / 60;
            out.push_str(&format!("{sign}{:02}{:02}", minutes / 60, minutes % 60));
        }
        out
    }
}

/// The in-memory representation a type converts values into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Native {
    /// No coercion; every value already matches
    Identity,
    /// `Value::Bool`
    Bool,
    /// `Value::Int`
    Int,
    /// `Value::Float`
    Float,
    /// `Value::Str`
    Str,
    /// `Value::List`
    List,
    /// `Value::Map`
    Map,
    /// `Value::DateTime`
    DateTime,
    /// `Value::Time`
    Time,
}

impl Native {
    /// Check if a value is already in this representation
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Identity, _)
                | (Self::Bool, Value::Bool(_))
                | (Self::Int, Value::Int(_))
                | (Self::Float, Value::Float(_))
                | (Self::Str, Value::Str(_))
                | (Self::List, Value::List(_))
                | (Self::Map, Value::Map(_))
                | (Self::DateTime, Value::DateTime(_))
                | (Self::Time, Value::Time(_))
        )
    }

    /// Lowercase name used in messages and schematics
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::Float => "float",
            Self::Str => "string",
            Self::List => "list",
            Self::Map => "mapping",
            Self::DateTime => "datetime",
            Self::Time => "time",
        }
    }
}

impl Value {
    /// Check for `Unset`
    #[inline]
    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Check for `Null`
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check for `Unset` or `Null`
    #[inline]
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Unset | Self::Null)
    }

    /// Size of sized values (strings count characters)
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Str(s) => Some(s.chars().count()),
            Self::List(items) => Some(items.len()),
            Self::Map(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Check if a sized value has zero length
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Borrow as text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as mapping
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow as list
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Read a boolean
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Read a number as `f64`
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Short name of the variant, for messages
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "mapping",
            Self::DateTime(_) => "datetime",
            Self::Time(_) => "time",
        }
    }

    /// Convert to JSON; `Unset` becomes null and is dropped from objects
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Unset | Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(i) => JsonValue::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(JsonValue::Null, JsonValue::Number),
            Self::Str(s) => JsonValue::String(s.clone()),
            Self::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => JsonValue::Object(
                map.iter()
                    .filter(|(_, v)| !v.is_unset())
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::DateTime(ts) => JsonValue::String(ts.to_iso8601()),
            Self::Time(t) => JsonValue::String(format_time(*t)),
        }
    }
}

/// ISO time of day, with microseconds only when non-zero
#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    use chrono::Timelike;
    if time.nanosecond() / 1_000 == 0 {
        time.format("%H:%M:%S").to_string()
    } else {
        time.format("%H:%M:%S%.6f").to_string()
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "Unset"),
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Self::DateTime(ts) => write!(f, "{}", ts.to_iso8601()),
            Self::Time(t) => write!(f, "{}", format_time(*t)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Int),
            JsonValue::String(s) => Self::Str(s),
            JsonValue::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            JsonValue::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or(Self::Float(n as f64), Self::Int)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Map(map)
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Self::DateTime(ts)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Self::Time(t)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}
