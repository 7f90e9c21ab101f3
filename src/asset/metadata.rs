//! Asset metadata
//!
//! Free-form metadata attached to an asset is a nested map whose leaves are
//! scalars. Before a record leaves the builder the map is flattened into
//! dotted paths, e.g. `{"a": {"b": "c"}}` becomes `{"a.b": "c"}`.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Nested metadata map, ordered by key
pub type MetaMap = BTreeMap<String, MetaValue>;

/// A metadata leaf
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    List(Vec<Scalar>),
}

/// A metadata node: either a leaf or a further nested map
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Scalar(Scalar),
    Map(MetaMap),
}

impl Scalar {
    /// Convert to the JSON value written on the wire
    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Int(i) => Value::from(*i),
            Scalar::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Scalar::String(s) => Value::String(s.clone()),
            Scalar::Timestamp(t) => Value::String(t.to_rfc3339()),
            Scalar::List(items) => Value::Array(items.iter().map(Scalar::to_json).collect()),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(value: DateTime<Utc>) -> Self {
        Scalar::Timestamp(value)
    }
}

macro_rules! meta_value_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for MetaValue {
                fn from(value: $ty) -> Self {
                    MetaValue::Scalar(value.into())
                }
            }
        )*
    };
}

meta_value_from_scalar!(&str, String, bool, i64, DateTime<Utc>);

impl From<Scalar> for MetaValue {
    fn from(value: Scalar) -> Self {
        MetaValue::Scalar(value)
    }
}

impl From<MetaMap> for MetaValue {
    fn from(value: MetaMap) -> Self {
        MetaValue::Map(value)
    }
}

impl From<&Value> for MetaValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Object(map) => MetaValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), MetaValue::from(v)))
                    .collect(),
            ),
            other => MetaValue::Scalar(scalar_from_json(other)),
        }
    }
}

fn scalar_from_json(value: &Value) -> Scalar {
    match value {
        Value::Null => Scalar::Null,
        Value::Bool(b) => Scalar::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Scalar::Int(i),
            None => Scalar::Float(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => Scalar::String(s.clone()),
        Value::Array(items) => Scalar::List(items.iter().map(scalar_from_json).collect()),
        // Objects nested inside arrays have no dotted path; keep them as text
        Value::Object(_) => Scalar::String(value.to_string()),
    }
}

/// Flatten a nested metadata map into dotted paths.
///
/// Every leaf appears under exactly one path. Empty nested maps produce no
/// keys. If two paths collide (a key that itself contains a dot), the one
/// visited last in key order wins and a warning is logged.
pub fn flatten(map: &MetaMap) -> BTreeMap<String, Scalar> {
    let mut out = BTreeMap::new();
    flatten_into(map, None, &mut out);
    out
}

fn flatten_into(map: &MetaMap, prefix: Option<&str>, out: &mut BTreeMap<String, Scalar>) {
    for (key, value) in map {
        let path = match prefix {
            Some(p) => format!("{}.{}", p, key),
            None => key.clone(),
        };

        match value {
            MetaValue::Map(nested) => flatten_into(nested, Some(&path), out),
            MetaValue::Scalar(scalar) => {
                if out.insert(path.clone(), scalar.clone()).is_some() {
                    tracing::warn!("Metadata path '{}' collides after flattening, keeping last value", path);
                }
            }
        }
    }
}
