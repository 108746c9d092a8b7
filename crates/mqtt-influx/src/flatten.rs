// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recursive flattening of nested JSON payloads into dot-path field sets.
//!
//! ```text
//! {"a": {"x": "0"}, "field": [{"attrA": "1"}, {"attrA": "2"}]}
//!
//!   row 0: a.x = "0", field.attrA = "1"
//!   row 1: a.x = "0", field.attrA = "2"
//! ```
//!
//! Scalars and arrays of primitives land in a *base* set shared by every row.
//! Each array of objects (or nested object that itself fanned out) becomes a
//! *sibling array* of rows. Sibling arrays are zipped by position: row `j`
//! takes element `j` of every sibling, or empty strings when a sibling is
//! shorter. Arrays of different origin are paired purely by index, never by
//! content.
//!
//! Recursion depth follows payload depth. Payloads parsed from text are
//! bounded by the JSON parser's own nesting limit; structured payloads are
//! checked against [`MAX_DEPTH`] before flattening.

use crate::value::{FieldSet, FieldSets, FieldValue};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashSet;

const SEPARATOR: char = '.';

/// Deepest container nesting accepted for flattening. Matches the nesting
/// limit serde_json applies when parsing text.
pub const MAX_DEPTH: usize = 128;

/// Container nesting depth of `value`: 0 for scalars, 1 for a flat object.
///
/// Walks with an explicit stack, so it is safe on documents of any depth.
pub fn nesting_depth(value: &Value) -> usize {
    let mut max = 0;
    let mut stack = vec![(value, 0usize)];
    while let Some((value, depth)) = stack.pop() {
        let children: Box<dyn Iterator<Item = &Value>> = match value {
            Value::Object(object) => Box::new(object.values()),
            Value::Array(items) => Box::new(items.iter()),
            _ => continue,
        };
        max = max.max(depth + 1);
        stack.extend(children.map(|child| (child, depth + 1)));
    }
    max
}

/// Reduces nested JSON objects to flat field sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFlattener;

impl RecordFlattener {
    pub fn new() -> Self {
        Self
    }

    /// Flatten `object`, prefixing every key with `prefix` (empty for none).
    ///
    /// Returns a single set when no array of objects occurs at any depth,
    /// otherwise one set per zipped row. All rows share the same key set.
    pub fn flatten(&self, object: &Map<String, Value>, prefix: &str) -> FieldSets {
        self.flatten_entries(object_entries(object), prefix)
    }

    /// Flatten an arbitrary JSON document root.
    ///
    /// Arrays are walked like objects keyed by element index. Scalars and
    /// `null` carry no keys and yield an empty set.
    pub fn flatten_value(&self, value: &Value, prefix: &str) -> FieldSets {
        match value {
            Value::Object(object) => self.flatten(object, prefix),
            Value::Array(items) => self.flatten_entries(index_entries(items), prefix),
            _ => FieldSets::Single(FieldSet::new()),
        }
    }

    fn flatten_entries(&self, entries: Vec<(Cow<'_, str>, &Value)>, prefix: &str) -> FieldSets {
        let mut base = FieldSet::new();
        let mut siblings: Vec<Vec<FieldSet>> = Vec::new();

        for (key, value) in entries {
            let full_key = join_key(prefix, &key);

            match value {
                Value::Array(items) if is_primitive_array(items) => {
                    base.insert(full_key, FieldValue::Array(items.clone()));
                }
                Value::Array(items) => {
                    siblings.push(self.flatten_elements(items, &full_key));
                }
                Value::Object(object) => match self.flatten(object, &full_key) {
                    FieldSets::Single(set) => base.extend(set),
                    FieldSets::Rows(rows) => siblings.push(rows),
                },
                scalar => {
                    // null has no field representation
                    if let Some(v) = FieldValue::from_scalar(scalar) {
                        base.insert(full_key, v);
                    }
                }
            }
        }

        zip_rows(base, siblings)
    }

    /// One or more rows per element of an array of objects.
    fn flatten_elements(&self, items: &[Value], full_key: &str) -> Vec<FieldSet> {
        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let flattened = match item {
                Value::Object(object) => self.flatten(object, full_key),
                Value::Array(inner) => self.flatten_entries(index_entries(inner), full_key),
                scalar => {
                    let mut set = FieldSet::new();
                    if let Some(v) = FieldValue::from_scalar(scalar) {
                        set.insert(full_key, v);
                    }
                    FieldSets::Single(set)
                }
            };
            match flattened {
                FieldSets::Single(set) => rows.push(set),
                FieldSets::Rows(nested) => rows.extend(nested),
            }
        }
        rows
    }
}

/// Positional zip of the sibling arrays onto the base set.
fn zip_rows(base: FieldSet, siblings: Vec<Vec<FieldSet>>) -> FieldSets {
    let max_len = siblings.iter().map(Vec::len).max().unwrap_or(0);
    if max_len == 0 {
        return FieldSets::Single(base);
    }

    let sibling_keys: Vec<Vec<String>> = siblings.iter().map(|rows| key_union(rows)).collect();

    let rows = (0..max_len)
        .map(|j| {
            let mut row = base.clone();
            for (sibling, keys) in siblings.iter().zip(&sibling_keys) {
                let element = sibling.get(j);
                for key in keys {
                    let value = element
                        .and_then(|e| e.get(key))
                        .cloned()
                        .unwrap_or_else(FieldValue::empty);
                    row.insert(key.as_str(), value);
                }
            }
            row
        })
        .collect();

    FieldSets::Rows(rows)
}

/// Keys of all rows, in first-seen order.
fn key_union(rows: &[FieldSet]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();
    for row in rows {
        for key in row.keys() {
            if seen.insert(key) {
                keys.push(key.to_string());
            }
        }
    }
    keys
}

fn is_primitive_array(items: &[Value]) -> bool {
    items.iter().all(|v| !v.is_object() && !v.is_array())
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        let mut full = String::with_capacity(prefix.len() + 1 + key.len());
        full.push_str(prefix);
        full.push(SEPARATOR);
        full.push_str(key);
        full
    }
}

fn object_entries(object: &Map<String, Value>) -> Vec<(Cow<'_, str>, &Value)> {
    object
        .iter()
        .map(|(k, v)| (Cow::Borrowed(k.as_str()), v))
        .collect()
}

fn index_entries(items: &[Value]) -> Vec<(Cow<'_, str>, &Value)> {
    items
        .iter()
        .enumerate()
        .map(|(i, v)| (Cow::Owned(i.to_string()), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flatten(value: Value) -> FieldSets {
        RecordFlattener::new().flatten_value(&value, "")
    }

    fn text(set: &FieldSet, key: &str) -> String {
        match set.get(key) {
            Some(FieldValue::String(s)) => s.clone(),
            other => panic!("expected string at {}, got {:?}", key, other),
        }
    }

    #[test]
    fn test_flatten_simple_object() {
        let out = flatten(json!({"field": "123"}));
        let set = out.single().expect("single");
        assert_eq!(text(set, "field"), "123");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_flatten_nested_object() {
        let out = flatten(json!({"field": {"attrA": "1", "attrB": "2"}}));
        let set = out.single().expect("single");
        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["field.attrA", "field.attrB"]);
        assert_eq!(text(set, "field.attrA"), "1");
        assert_eq!(text(set, "field.attrB"), "2");
    }

    #[test]
    fn test_flatten_primitive_array_kept_verbatim() {
        let out = flatten(json!({"field": ["123", "321"], "empty": []}));
        let set = out.single().expect("single");
        assert_eq!(
            set.get("field"),
            Some(&FieldValue::Array(vec![json!("123"), json!("321")]))
        );
        assert_eq!(set.get("empty"), Some(&FieldValue::Array(vec![])));
    }

    #[test]
    fn test_flatten_array_of_objects_fans_out() {
        let out = flatten(json!({
            "field": [{"attrA": "123", "attrB": "111"}, {"attrA": "321", "attrB": "222"}]
        }));
        let rows = out.rows().expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(text(&rows[0], "field.attrA"), "123");
        assert_eq!(text(&rows[0], "field.attrB"), "111");
        assert_eq!(text(&rows[1], "field.attrA"), "321");
        assert_eq!(text(&rows[1], "field.attrB"), "222");
    }

    #[test]
    fn test_flatten_base_fields_repeated_on_every_row() {
        let out = flatten(json!({
            "fieldAlpha": {"gama": "000", "beta": "999"},
            "field": [{"attrA": "123"}, {"attrA": "321"}]
        }));
        let rows = out.rows().expect("rows");
        assert_eq!(rows.len(), 2);
        for row in rows {
            assert_eq!(text(row, "fieldAlpha.gama"), "000");
            assert_eq!(text(row, "fieldAlpha.beta"), "999");
        }
        assert_eq!(
            rows[0].keys().collect::<Vec<_>>(),
            vec!["fieldAlpha.gama", "fieldAlpha.beta", "field.attrA"]
        );
    }

    #[test]
    fn test_flatten_nested_fan_out_bubbles_up() {
        let out = flatten(json!({
            "user": {"name": "n"},
            "analysis": {
                "timestamp": "t",
                "processes": [
                    {"name": "a", "isActive": "false"},
                    {"name": "b", "isActive": "true"},
                    {"name": "c", "isActive": "false"}
                ]
            }
        }));
        let rows = out.rows().expect("rows");
        assert_eq!(rows.len(), 3);
        assert_eq!(text(&rows[1], "user.name"), "n");
        assert_eq!(text(&rows[1], "analysis.timestamp"), "t");
        assert_eq!(text(&rows[1], "analysis.processes.name"), "b");
        assert_eq!(text(&rows[1], "analysis.processes.isActive"), "true");
    }

    #[test]
    fn test_flatten_unequal_siblings_padded_with_empty_string() {
        let out = flatten(json!({
            "long": [{"v": "1"}, {"v": "2"}, {"v": "3"}],
            "short": [{"w": "x"}]
        }));
        let rows = out.rows().expect("rows");
        assert_eq!(rows.len(), 3);
        assert_eq!(text(&rows[0], "short.w"), "x");
        assert_eq!(text(&rows[1], "short.w"), "");
        assert_eq!(text(&rows[2], "short.w"), "");
        assert_eq!(text(&rows[2], "long.v"), "3");
    }

    #[test]
    fn test_flatten_rows_share_key_set() {
        let out = flatten(json!({
            "items": [{"a": 1}, {"b": 2}],
            "more": [{"c": 3}, {"c": 4}, {"c": 5}]
        }));
        let rows = out.rows().expect("rows");
        let first: Vec<_> = rows[0].keys().collect();
        for row in rows {
            assert_eq!(row.keys().collect::<Vec<_>>(), first);
        }
        assert_eq!(rows[0].get("b"), None);
        assert_eq!(text(&rows[0], "items.b"), "");
        assert_eq!(rows[1].get("items.b"), Some(&FieldValue::Integer(2)));
        assert_eq!(text(&rows[2], "items.a"), "");
    }

    #[test]
    fn test_flatten_zip_is_positional() {
        let out = flatten(json!({
            "names": [{"n": "alpha"}, {"n": "beta"}],
            "ids": [{"id": 2}, {"id": 1}]
        }));
        let rows = out.rows().expect("rows");
        assert_eq!(text(&rows[0], "names.n"), "alpha");
        assert_eq!(rows[0].get("ids.id"), Some(&FieldValue::Integer(2)));
    }

    #[test]
    fn test_flatten_already_flat_is_unchanged() {
        let input = json!({"a": "1", "b": 2, "c": true, "d": 1.5, "e": [1, 2]});
        let out = flatten(input.clone());
        let set = out.single().expect("single");
        let object = input.as_object().unwrap();
        assert_eq!(set.keys().collect::<Vec<_>>(), object.keys().map(String::as_str).collect::<Vec<_>>());
        for (k, v) in object {
            let expected = match v {
                Value::Array(items) => FieldValue::Array(items.clone()),
                other => FieldValue::from_scalar(other).unwrap(),
            };
            assert_eq!(set.get(k), Some(&expected));
        }
    }

    #[test]
    fn test_flatten_with_prefix() {
        let object = json!({"x": {"y": 1}});
        let out = RecordFlattener::new().flatten(object.as_object().unwrap(), "root");
        let set = out.single().expect("single");
        assert_eq!(set.get("root.x.y"), Some(&FieldValue::Integer(1)));
    }

    #[test]
    fn test_flatten_empty_inputs() {
        assert_eq!(flatten(json!({})), FieldSets::Single(FieldSet::new()));
        assert_eq!(flatten(json!(42)), FieldSets::Single(FieldSet::new()));
        assert_eq!(flatten(json!(null)), FieldSets::Single(FieldSet::new()));
    }

    #[test]
    fn test_flatten_null_skipped() {
        let out = flatten(json!({"a": null, "b": "1"}));
        let set = out.single().expect("single");
        assert!(!set.contains_key("a"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_flatten_array_elements_that_are_arrays_or_scalars() {
        let out = flatten(json!({"m": [[1, 2], {"k": "v"}, 7]}));
        let rows = out.rows().expect("rows");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("m.0"), Some(&FieldValue::Integer(1)));
        assert_eq!(rows[0].get("m.1"), Some(&FieldValue::Integer(2)));
        assert_eq!(text(&rows[1], "m.k"), "v");
        assert_eq!(rows[2].get("m"), Some(&FieldValue::Integer(7)));
        assert_eq!(text(&rows[2], "m.0"), "");
    }

    #[test]
    fn test_flatten_element_fan_out_extends_sibling() {
        let out = flatten(json!({
            "groups": [
                {"g": "a", "members": [{"m": 1}, {"m": 2}]},
                {"g": "b", "members": [{"m": 3}]}
            ]
        }));
        let rows = out.rows().expect("rows");
        assert_eq!(rows.len(), 3);
        assert_eq!(text(&rows[0], "groups.g"), "a");
        assert_eq!(rows[1].get("groups.members.m"), Some(&FieldValue::Integer(2)));
        assert_eq!(text(&rows[2], "groups.g"), "b");
        assert_eq!(rows[2].get("groups.members.m"), Some(&FieldValue::Integer(3)));
    }

    #[test]
    fn test_nesting_depth() {
        assert_eq!(nesting_depth(&json!(1)), 0);
        assert_eq!(nesting_depth(&json!({"a": 1})), 1);
        assert_eq!(nesting_depth(&json!({"a": [1, {"b": {}}], "c": 2})), 4);

        let mut deep = json!(0);
        for _ in 0..10_000 {
            deep = json!([deep]);
        }
        assert_eq!(nesting_depth(&deep), 10_000);
        // dropping a deeply nested value recurses too
        std::mem::forget(deep);
    }

    #[test]
    fn test_flatten_wide_object() {
        let object: Map<String, Value> = (0..20_000).map(|i| (format!("k{}", i), json!(i))).collect();
        let out = RecordFlattener::new().flatten(&object, "");
        let set = out.single().expect("single");
        assert_eq!(set.len(), 20_000);
        assert_eq!(set.get("k19999"), Some(&FieldValue::Integer(19_999)));
    }

    #[test]
    fn test_flatten_wide_sibling_rows() {
        let rows: Vec<Value> = (0..500)
            .map(|i| {
                let mut row = Map::new();
                row.insert(format!("k{}", i), json!(i));
                Value::Object(row)
            })
            .collect();
        let out = flatten(json!({"rows": rows}));
        let rows = out.rows().expect("rows");
        assert_eq!(rows.len(), 500);
        assert!(rows.iter().all(|r| r.len() == 500));
        assert_eq!(rows[5].get("rows.k5"), Some(&FieldValue::Integer(5)));
        assert_eq!(text(&rows[5], "rows.k6"), "");
    }

    #[test]
    fn test_flatten_root_array_keyed_by_index() {
        let out = flatten(json!([{"a": 1}, {"a": 2}]));
        let set = out.single().expect("single");
        assert_eq!(set.get("0.a"), Some(&FieldValue::Integer(1)));
        assert_eq!(set.get("1.a"), Some(&FieldValue::Integer(2)));
    }
}
