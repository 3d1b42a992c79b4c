//! Typed scalar values stored in table columns.
//!
//! `EntityValue` is a tagged union where exactly one variant is present. Each
//! variant renders as a literal of the table filter grammar.

use std::cmp::Ordering;
use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Storage data kinds with a defined encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    /// UTF-8 string.
    String,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// IEEE 754 double.
    Double,
    /// Boolean.
    Boolean,
    /// Opaque bytes.
    Binary,
    /// UTC timestamp.
    DateTime,
    /// 128-bit GUID.
    Guid,
}

impl DataKind {
    /// Returns the EDM type name (e.g., `Edm.Int64`).
    #[must_use]
    pub fn edm_type(&self) -> &'static str {
        match self {
            Self::String => "Edm.String",
            Self::Int32 => "Edm.Int32",
            Self::Int64 => "Edm.Int64",
            Self::Double => "Edm.Double",
            Self::Boolean => "Edm.Boolean",
            Self::Binary => "Edm.Binary",
            Self::DateTime => "Edm.DateTime",
            Self::Guid => "Edm.Guid",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.edm_type())
    }
}

/// A typed column value.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityValue {
    /// String value.
    String(String),
    /// 32-bit integer.
    Int32(i32),
    /// 64-bit integer.
    Int64(i64),
    /// Double precision float.
    Double(f64),
    /// Boolean value.
    Boolean(bool),
    /// Binary value.
    Binary(Bytes),
    /// UTC timestamp.
    DateTime(DateTime<Utc>),
    /// GUID value.
    Guid(Uuid),
}

impl EntityValue {
    /// Returns the data kind of this value.
    #[must_use]
    pub fn kind(&self) -> DataKind {
        match self {
            Self::String(_) => DataKind::String,
            Self::Int32(_) => DataKind::Int32,
            Self::Int64(_) => DataKind::Int64,
            Self::Double(_) => DataKind::Double,
            Self::Boolean(_) => DataKind::Boolean,
            Self::Binary(_) => DataKind::Binary,
            Self::DateTime(_) => DataKind::DateTime,
            Self::Guid(_) => DataKind::Guid,
        }
    }

    /// Returns the string if this is a `String` variant.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value of an `Int32` or `Int64` variant.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int32(n) => Some(i64::from(*n)),
            Self::Int64(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns a numeric value as `f64` (integers are widened).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int32(n) => Some(f64::from(*n)),
            Self::Int64(n) => Some(*n as f64),
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `Boolean` variant.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Compare two values of compatible kinds.
    ///
    /// Integers and doubles compare numerically across widths; strings by
    /// UTF-8 bytes; binary byte-wise unsigned. Returns `None` when the kinds
    /// are not comparable.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::String(a), Self::String(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::Binary(a), Self::Binary(b)) => Some(a.as_ref().cmp(b.as_ref())),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::Guid(a), Self::Guid(b)) => Some(a.cmp(b)),
            (Self::Double(_), _) | (_, Self::Double(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            _ => Some(self.as_i64()?.cmp(&other.as_i64()?)),
        }
    }

    /// Plain text rendering, as produced by a `ToString` call.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Int32(n) => n.to_string(),
            Self::Int64(n) => n.to_string(),
            Self::Double(d) => d.to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Binary(b) => hex::encode(b),
            Self::DateTime(dt) => format_datetime(dt),
            Self::Guid(g) => g.hyphenated().to_string(),
        }
    }

    /// Render the value as a filter grammar literal.
    ///
    /// Strings are single-quoted with embedded quotes doubled, 64-bit
    /// integers carry an `L` suffix, binary is `X'<hex>'`, timestamps are
    /// `datetime'<fixed form>'` and GUIDs are `guid'<hyphenated>'`.
    #[must_use]
    pub fn filter_literal(&self) -> String {
        match self {
            Self::String(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Int32(n) => n.to_string(),
            Self::Int64(n) => format!("{n}L"),
            Self::Double(d) => format!("{d:?}"),
            Self::Boolean(b) => b.to_string(),
            Self::Binary(b) => format!("X'{}'", hex::encode(b)),
            Self::DateTime(dt) => format!("datetime'{}'", format_datetime(dt)),
            Self::Guid(g) => format!("guid'{}'", g.hyphenated()),
        }
    }
}

/// Format a timestamp in the fixed lexical form used by the filter grammar:
/// `yyyy-MM-ddTHH:mm:ss.fffffffZ` (seven fractional digits, UTC).
#[must_use]
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    format!(
        "{}.{:07}Z",
        dt.format("%Y-%m-%dT%H:%M:%S"),
        dt.timestamp_subsec_nanos() / 100
    )
}

impl fmt::Display for EntityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filter_literal())
    }
}

impl From<&str> for EntityValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for EntityValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i32> for EntityValue {
    fn from(value: i32) -> Self {
        Self::Int32(value)
    }
}

impl From<i64> for EntityValue {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<f64> for EntityValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for EntityValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<u8> for EntityValue {
    fn from(value: u8) -> Self {
        Self::Int32(i32::from(value))
    }
}

impl From<Vec<u8>> for EntityValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(value))
    }
}

impl From<Bytes> for EntityValue {
    fn from(value: Bytes) -> Self {
        Self::Binary(value)
    }
}

impl From<DateTime<Utc>> for EntityValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<Uuid> for EntityValue {
    fn from(value: Uuid) -> Self {
        Self::Guid(value)
    }
}
