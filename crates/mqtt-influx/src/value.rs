// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field values and field sets.
//!
//! A [`FieldSet`] is a flat, insertion-ordered map of dot-path keys to
//! [`FieldValue`]s. Payload interpretation yields [`FieldSets`]: either a
//! single set, or one set per row when a JSON payload fans out.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// A value stored in a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit floating point.
    Float(f64),
    /// 64-bit signed integer.
    Integer(i64),
    /// UTF-8 string.
    String(String),
    /// Boolean value.
    Boolean(bool),
    /// Array of primitives, kept verbatim.
    Array(Vec<Value>),
}

impl FieldValue {
    /// Convert a scalar JSON value. Returns `None` for `null`, objects and arrays.
    pub fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(FieldValue::Integer(i))
                } else {
                    n.as_f64().map(FieldValue::Float)
                }
            }
            Value::String(s) => Some(FieldValue::String(s.clone())),
            Value::Bool(b) => Some(FieldValue::Boolean(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Placeholder used to pad rows that lack a key.
    pub fn empty() -> Self {
        FieldValue::String(String::new())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::String(v) => f.write_str(v),
            FieldValue::Boolean(v) => write!(f, "{}", v),
            FieldValue::Array(items) => write!(f, "{}", Value::Array(items.clone())),
        }
    }
}

/// Flat, insertion-ordered field map.
///
/// Inserting an existing key replaces its value in place, keeping the
/// original position. Lookups go through a key-to-position index.
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    entries: Vec<(String, FieldValue)>,
    index: HashMap<String, usize>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    /// Merge `other` into this set; keys from `other` win.
    pub fn extend(&mut self, other: FieldSet) {
        self.entries.reserve(other.len());
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// The index is derived from `entries`, so only entries are compared.
impl PartialEq for FieldSet {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FieldSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

impl IntoIterator for FieldSet {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Result of payload interpretation: one field set, or one per fan-out row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSets {
    Single(FieldSet),
    Rows(Vec<FieldSet>),
}

impl FieldSets {
    /// Number of records these field sets will produce.
    pub fn len(&self) -> usize {
        match self {
            FieldSets::Single(_) => 1,
            FieldSets::Rows(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_fan_out(&self) -> bool {
        matches!(self, FieldSets::Rows(_))
    }

    pub fn single(&self) -> Option<&FieldSet> {
        match self {
            FieldSets::Single(set) => Some(set),
            FieldSets::Rows(_) => None,
        }
    }

    pub fn rows(&self) -> Option<&[FieldSet]> {
        match self {
            FieldSets::Single(_) => None,
            FieldSets::Rows(rows) => Some(rows),
        }
    }

    /// Flatten into a list, regardless of variant.
    pub fn into_vec(self) -> Vec<FieldSet> {
        match self {
            FieldSets::Single(set) => vec![set],
            FieldSets::Rows(rows) => rows,
        }
    }
}

impl From<FieldSet> for FieldSets {
    fn from(set: FieldSet) -> Self {
        FieldSets::Single(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_scalar() {
        assert_eq!(FieldValue::from_scalar(&json!(42)), Some(FieldValue::Integer(42)));
        assert_eq!(FieldValue::from_scalar(&json!(1.5)), Some(FieldValue::Float(1.5)));
        assert_eq!(
            FieldValue::from_scalar(&json!("hello")),
            Some(FieldValue::String("hello".into()))
        );
        assert_eq!(FieldValue::from_scalar(&json!(true)), Some(FieldValue::Boolean(true)));
        assert_eq!(FieldValue::from_scalar(&json!(null)), None);
        assert_eq!(FieldValue::from_scalar(&json!({"a": 1})), None);
        assert_eq!(FieldValue::from_scalar(&json!([1, 2])), None);
    }

    #[test]
    fn test_field_set_insert_replaces_in_place() {
        let mut set = FieldSet::new();
        set.insert("a", 1i64);
        set.insert("b", 2i64);
        set.insert("a", "x");

        assert_eq!(set.len(), 2);
        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(set.get("a"), Some(&FieldValue::String("x".into())));
    }

    #[test]
    fn test_field_set_wide_insert_and_lookup() {
        let mut set = FieldSet::with_capacity(50_000);
        for i in 0..50_000i64 {
            set.insert(format!("k{}", i), i);
        }
        for i in (0..50_000i64).step_by(7) {
            set.insert(format!("k{}", i), "x");
        }

        assert_eq!(set.len(), 50_000);
        assert_eq!(set.get("k49999"), Some(&FieldValue::Integer(49_999)));
        assert_eq!(set.get("k49997"), Some(&FieldValue::String("x".into())));
        assert_eq!(set.keys().nth(49_997), Some("k49997"));
        assert!(!set.contains_key("k50000"));
    }

    #[test]
    fn test_field_set_equality_follows_order() {
        let ab: FieldSet = [("a", 1i64), ("b", 2i64)].into_iter().collect();
        let ba: FieldSet = [("b", 2i64), ("a", 1i64)].into_iter().collect();
        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn test_field_set_extend() {
        let mut base: FieldSet = [("a", "1"), ("b", "2")].into_iter().collect();
        let other: FieldSet = [("b", "3"), ("c", "4")].into_iter().collect();
        base.extend(other);

        assert_eq!(base.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(base.get("b").and_then(FieldValue::as_str), Some("3"));
    }

    #[test]
    fn test_field_sets_len_and_into_vec() {
        let single = FieldSets::from(FieldSet::new());
        assert_eq!(single.len(), 1);
        assert!(!single.is_fan_out());

        let rows = FieldSets::Rows(vec![FieldSet::new(), FieldSet::new()]);
        assert_eq!(rows.len(), 2);
        assert!(rows.is_fan_out());
        assert_eq!(rows.into_vec().len(), 2);
    }

    #[test]
    fn test_display_array() {
        let v = FieldValue::Array(vec![json!("a"), json!(1)]);
        assert_eq!(v.to_string(), r#"["a",1]"#);
    }
}
