use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ---------------------------------------------------------------------------
// MetadataValue – a single cell in a metadata table
// ---------------------------------------------------------------------------

/// A dynamically-typed metadata value.
/// Lives in `BTreeSet`s (unique values, filters), so it must be `Ord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MetadataValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// A level of a categorical field.
    Category(String),
    Null,
}

/// Broad type of a metadata field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldKind {
    Numeric,
    Text,
    Boolean,
    Categorical,
    Null,
}

/// One record of a metadata table: field name → value.
pub type Record = BTreeMap<String, MetadataValue>;

// -- Comparison --
//
// Equality, ordering and hashing all go through `CmpKey`, so they agree by
// construction. Variant order of `CmpKey` is the cross-kind order.

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
enum CmpKey<'a> {
    Null,
    Bool(bool),
    Integer(i64),
    /// Bits of the float reordered so integer order matches `f64::total_cmp`.
    Float(i64),
    Text(&'a str),
    Category(&'a str),
}

fn float_key(v: f64) -> i64 {
    let bits = v.to_bits() as i64;
    bits ^ ((((bits >> 63) as u64) >> 1) as i64)
}

impl MetadataValue {
    fn cmp_key(&self) -> CmpKey<'_> {
        match self {
            MetadataValue::Null => CmpKey::Null,
            MetadataValue::Bool(b) => CmpKey::Bool(*b),
            MetadataValue::Integer(i) => CmpKey::Integer(*i),
            MetadataValue::Float(v) => CmpKey::Float(float_key(*v)),
            MetadataValue::Text(s) => CmpKey::Text(s),
            MetadataValue::Category(s) => CmpKey::Category(s),
        }
    }
}

impl PartialEq for MetadataValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_key() == other.cmp_key()
    }
}

impl Eq for MetadataValue {}

impl PartialOrd for MetadataValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetadataValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_key().cmp(&other.cmp_key())
    }
}

impl Hash for MetadataValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cmp_key().hash(state);
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(s) | MetadataValue::Category(s) => write!(f, "{s}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}"),
                None => write!(f, "{v}"),
            },
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Null => write!(f, "<null>"),
        }
    }
}

impl MetadataValue {
    /// Interpret the value as an `f64` when it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Float(v) => Some(*v),
            MetadataValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) | MetadataValue::Category(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, MetadataValue::Null)
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            MetadataValue::Integer(_) | MetadataValue::Float(_) => FieldKind::Numeric,
            MetadataValue::Text(_) => FieldKind::Text,
            MetadataValue::Bool(_) => FieldKind::Boolean,
            MetadataValue::Category(_) => FieldKind::Categorical,
            MetadataValue::Null => FieldKind::Null,
        }
    }

    /// Shorthand for a categorical level.
    pub fn category(level: impl Into<String>) -> Self {
        MetadataValue::Category(level.into())
    }
}

// -- Conversions from plain Rust scalars --

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::Text(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::Text(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        MetadataValue::Integer(i)
    }
}

impl From<i32> for MetadataValue {
    fn from(i: i32) -> Self {
        MetadataValue::Integer(i as i64)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Float(v)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Bool(b)
    }
}

impl<T: Into<MetadataValue>> From<Option<T>> for MetadataValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(MetadataValue::Null, Into::into)
    }
}

impl From<&JsonValue> for MetadataValue {
    fn from(val: &JsonValue) -> Self {
        match val {
            JsonValue::String(s) => MetadataValue::Text(s.clone()),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    MetadataValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    MetadataValue::Float(f)
                } else {
                    MetadataValue::Text(n.to_string())
                }
            }
            JsonValue::Bool(b) => MetadataValue::Bool(*b),
            JsonValue::Null => MetadataValue::Null,
            other => MetadataValue::Text(other.to_string()),
        }
    }
}
