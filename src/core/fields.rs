//! Structured key-value fields attached to log entries and scoped loggers

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// Value type for structured logging fields
///
/// A closed set of serializable kinds so every formatter renders them
/// deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Convert to `serde_json::Value`.
    ///
    /// Returns `None` if the value (or anything nested in it) is a
    /// non-finite float, which JSON cannot represent.
    #[must_use]
    pub fn to_json_value(&self) -> Option<serde_json::Value> {
        use serde_json::Value;

        Some(match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::Number((*i).into()),
            FieldValue::Float(f) => Value::Number(serde_json::Number::from_f64(*f)?),
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(FieldValue::to_json_value)
                    .collect::<Option<Vec<_>>>()?,
            ),
            FieldValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| v.to_json_value().map(|v| (k.clone(), v)))
                    .collect::<Option<serde_json::Map<_, _>>>()?,
            ),
        })
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::String(s) => f.write_str(s),
            FieldValue::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            FieldValue::Map(map) => {
                f.write_str("map[")?;
                for (idx, (k, v)) in map.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}:{}", k, v)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::String(s.clone())
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(i: $ty) -> Self {
                    FieldValue::Int(i64::from(i))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for FieldValue {
    fn from(i: u64) -> Self {
        i64::try_from(i)
            .map(FieldValue::Int)
            .unwrap_or(FieldValue::Float(i as f64))
    }
}

impl From<usize> for FieldValue {
    fn from(i: usize) -> Self {
        FieldValue::from(i as u64)
    }
}

impl From<f32> for FieldValue {
    fn from(f: f32) -> Self {
        FieldValue::Float(f64::from(f))
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Fields> for FieldValue {
    fn from(fields: Fields) -> Self {
        FieldValue::Map(fields.0)
    }
}

/// A set of structured fields with unique keys.
///
/// Keys are kept sorted so that rendering is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add a field, replacing any previous value under the same key
    #[must_use]
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Add a field (mutable version)
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
        self.0.iter()
    }

    /// Copy of `self` overlaid with `overlay`; `overlay` wins on key collision.
    ///
    /// Neither input is modified.
    #[must_use]
    pub fn merged(&self, overlay: &Fields) -> Fields {
        if overlay.is_empty() {
            return self.clone();
        }
        let mut merged = self.0.clone();
        merged.extend(overlay.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        Fields(merged)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Fields(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_creation() {
        let fields = Fields::new();
        assert!(fields.is_empty());

        let fields = Fields::new()
            .with("user_id", 123)
            .with("username", "john_doe")
            .with("active", true);
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get("user_id"), Some(&FieldValue::Int(123)));
    }

    #[test]
    fn test_merged_overlay_wins() {
        let base = Fields::new().with("service", "api").with("key", "base");
        let overlay = Fields::new().with("key", "call").with("status", 200);

        let merged = base.merged(&overlay);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get("key"), Some(&FieldValue::from("call")));
        assert_eq!(merged.get("service"), Some(&FieldValue::from("api")));
        // inputs untouched
        assert_eq!(base.get("key"), Some(&FieldValue::from("base")));
        assert!(!base.contains_key("status"));
        assert_eq!(overlay.len(), 2);
    }

    #[test]
    fn test_nested_display() {
        let value = FieldValue::from(vec![1, 2, 3]);
        assert_eq!(value.to_string(), "[1 2 3]");

        let value = FieldValue::from(Fields::new().with("a", 1).with("b", "x"));
        assert_eq!(value.to_string(), "map[a:1 b:x]");

        assert_eq!(FieldValue::from(None::<i32>).to_string(), "null");
    }

    #[test]
    fn test_to_json_value_rejects_non_finite() {
        assert_eq!(
            FieldValue::from(1.5).to_json_value(),
            Some(serde_json::json!(1.5))
        );
        assert!(FieldValue::Float(f64::NAN).to_json_value().is_none());
        assert!(FieldValue::from(vec![1.0, f64::INFINITY])
            .to_json_value()
            .is_none());
    }

    #[test]
    fn test_large_unsigned_falls_back_to_float() {
        assert_eq!(FieldValue::from(7_u64), FieldValue::Int(7));
        assert!(matches!(FieldValue::from(u64::MAX), FieldValue::Float(_)));
    }

    #[test]
    fn test_serde_untagged() {
        let fields: Fields =
            serde_json::from_str(r#"{"status":200,"path":"/health","tags":["a"]}"#).unwrap();
        assert_eq!(fields.get("status"), Some(&FieldValue::Int(200)));
        assert_eq!(fields.get("path"), Some(&FieldValue::from("/health")));
        assert_eq!(fields.get("tags"), Some(&FieldValue::from(vec!["a"])));
    }
}
