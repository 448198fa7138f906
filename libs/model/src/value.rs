//! Dynamic value graph
//!
//! `Value` is the object graph the navigation engine walks: scalars, three
//! sequence shapes with different write semantics, string-keyed mappings and
//! typed records. Absence is not a value; a missing mapping key or record
//! field is simply not present.

use crate::error::{Error, Result};
use crate::types::{Shape, TypeDescriptor};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// A node in a dynamic object graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Str(Arc<str>),
    /// Growable ordered sequence.
    List(Vec<Value>),
    /// Fixed-size ordered sequence. Cannot grow; writes replace the container.
    Tuple(Box<[Value]>),
    /// Unordered collection. Iteration order is not part of its contract, so
    /// numeric addressing goes through a synthetic ordered view.
    Bag(Vec<Value>),
    /// String-keyed mapping.
    Map(BTreeMap<Arc<str>, Value>),
    /// Typed record instance. Declared field types live in the schema, not here.
    Record(Record),
}

/// A record instance: a record type name plus named fields.
///
/// A field missing from the table is absent. The set of declared fields (and
/// their types) is the schema provider's business.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_name: Arc<str>,
    fields: BTreeMap<Arc<str>, Value>,
}

impl Record {
    pub fn new(type_name: impl Into<Arc<str>>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Assign a field, returning the previous value if any.
    pub fn set_field(&mut self, name: impl Into<Arc<str>>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &Arc<str>> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builder-style field assignment, for fixtures and defaults.
    pub fn with_field(mut self, name: impl Into<Arc<str>>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    pub fn decimal(d: Decimal) -> Self {
        Value::Decimal(d)
    }

    pub fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            Value::Int(n) => Some(Decimal::from(*n)),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// The value's shape, used for segment dispatch. Resolved once per node,
    /// not re-tested ad hoc.
    pub fn shape(&self) -> Shape {
        match self {
            Value::Bool(_) | Value::Int(_) | Value::Decimal(_) | Value::Str(_) => Shape::Scalar,
            Value::List(_) => Shape::Sequence,
            Value::Tuple(_) => Shape::FixedSequence,
            Value::Bag(_) => Shape::Bag,
            Value::Map(_) => Shape::Mapping,
            Value::Record(_) => Shape::Record,
        }
    }

    /// Best-effort runtime type descriptor. Container element types are not
    /// carried by instances, so sequence and mapping shapes come back with
    /// `Any` components.
    pub fn type_descriptor(&self) -> TypeDescriptor {
        match self {
            Value::Bool(_) => TypeDescriptor::Bool,
            Value::Int(_) => TypeDescriptor::Int,
            Value::Decimal(_) => TypeDescriptor::Decimal,
            Value::Str(_) => TypeDescriptor::Str,
            Value::List(_) => TypeDescriptor::list(TypeDescriptor::Any),
            Value::Tuple(items) => TypeDescriptor::tuple(TypeDescriptor::Any, Some(items.len())),
            Value::Bag(_) => TypeDescriptor::bag(TypeDescriptor::Any),
            Value::Map(_) => TypeDescriptor::map(TypeDescriptor::Any),
            Value::Record(r) => TypeDescriptor::record(r.type_name.clone()),
        }
    }

    /// Shallow structural hash identifying a root object across calls.
    ///
    /// Stable under mutation of contained values: only the shape, the record
    /// type name, and mapping/record key sets participate. Two distinct roots
    /// may collide; the cache invalidation sweep keeps that safe.
    pub fn identity_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        std::mem::discriminant(self).hash(&mut hasher);
        match self {
            Value::Bool(b) => b.hash(&mut hasher),
            Value::Int(n) => n.hash(&mut hasher),
            Value::Decimal(d) => d.hash(&mut hasher),
            Value::Str(s) => s.hash(&mut hasher),
            Value::List(_) | Value::Bag(_) => {}
            Value::Tuple(items) => items.len().hash(&mut hasher),
            Value::Map(entries) => {
                for key in entries.keys() {
                    key.hash(&mut hasher);
                }
            }
            Value::Record(r) => {
                r.type_name.hash(&mut hasher);
                for name in r.fields.keys() {
                    name.hash(&mut hasher);
                }
            }
        }
        hasher.finish()
    }

    /// Deep content hash, used to detect mutation between calls.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash_content(&mut hasher);
        hasher.finish()
    }

    fn hash_content<H: Hasher>(&self, hasher: &mut H) {
        std::mem::discriminant(self).hash(hasher);
        match self {
            Value::Bool(b) => b.hash(hasher),
            Value::Int(n) => n.hash(hasher),
            Value::Decimal(d) => d.hash(hasher),
            Value::Str(s) => s.hash(hasher),
            Value::List(items) | Value::Bag(items) => {
                items.len().hash(hasher);
                for item in items {
                    item.hash_content(hasher);
                }
            }
            Value::Tuple(items) => {
                items.len().hash(hasher);
                for item in items.iter() {
                    item.hash_content(hasher);
                }
            }
            Value::Map(entries) => {
                entries.len().hash(hasher);
                for (key, value) in entries {
                    key.hash(hasher);
                    value.hash_content(hasher);
                }
            }
            Value::Record(r) => {
                r.type_name.hash(hasher);
                r.fields.len().hash(hasher);
                for (name, value) in &r.fields {
                    name.hash(hasher);
                    value.hash_content(hasher);
                }
            }
        }
    }

    /// Build a value graph from JSON. Objects become mappings, arrays become
    /// growable sequences. A `null` object member is dropped (absence); `null`
    /// anywhere else has no representation and is rejected.
    pub fn from_json(json: &serde_json::Value) -> Result<Value> {
        match json {
            serde_json::Value::Null => Err(Error::UnsupportedJson(
                "null has no value representation".into(),
            )),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else {
                    Decimal::from_str(&n.to_string())
                        .map(Value::Decimal)
                        .map_err(|e| Error::UnsupportedJson(format!("number {}: {}", n, e)))
                }
            }
            serde_json::Value::String(s) => Ok(Value::string(s.as_str())),
            serde_json::Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    list.push(Value::from_json(item)?);
                }
                Ok(Value::List(list))
            }
            serde_json::Value::Object(entries) => {
                let mut map = BTreeMap::new();
                for (key, value) in entries {
                    if value.is_null() {
                        continue;
                    }
                    map.insert(Arc::from(key.as_str()), Value::from_json(value)?);
                }
                Ok(Value::Map(map))
            }
        }
    }

    /// Render the graph as JSON. Lossy for record type names and for the
    /// distinction between the three sequence shapes.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::Number((*n).into()),
            Value::Decimal(d) => d
                .to_f64()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(d.to_string())),
            Value::Str(s) => serde_json::Value::String(s.to_string()),
            Value::List(items) | Value::Bag(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Tuple(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
            Value::Record(r) => serde_json::Value::Object(
                r.fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_shapes() {
        let value = Value::from_json(&json!({
            "name": "Ada",
            "age": 36,
            "scores": [1, 2, 3],
            "active": true
        }))
        .unwrap();

        let Value::Map(entries) = &value else {
            panic!("expected mapping, got {:?}", value);
        };
        assert_eq!(entries.get("name").and_then(|v| v.as_str()), Some("Ada"));
        assert_eq!(entries.get("age").and_then(|v| v.as_int()), Some(36));
        assert!(matches!(entries.get("scores"), Some(Value::List(_))));
    }

    #[test]
    fn test_null_members_are_absent() {
        let value = Value::from_json(&json!({ "name": null })).unwrap();
        let Value::Map(entries) = &value else {
            panic!("expected mapping");
        };
        assert!(entries.is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let json = json!({ "a": { "b": [1, 2] }, "s": "x" });
        let value = Value::from_json(&json).unwrap();
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn test_identity_hash_stable_under_value_mutation() {
        let mut root = Value::Map(BTreeMap::from([(Arc::from("name"), Value::string("ada"))]));
        let before = root.identity_hash();
        let content_before = root.content_hash();

        if let Value::Map(entries) = &mut root {
            entries.insert(Arc::from("name"), Value::string("grace"));
        }

        assert_eq!(root.identity_hash(), before);
        assert_ne!(root.content_hash(), content_before);
    }

    #[test]
    fn test_record_fields() {
        let mut record = Record::new("Customer").with_field("name", Value::string("Ada"));
        assert_eq!(record.field("name").and_then(|v| v.as_str()), Some("Ada"));
        assert!(record.field("missing").is_none());

        let previous = record.set_field("name", Value::string("Grace"));
        assert_eq!(previous.and_then(|v| v.as_str().map(str::to_owned)).as_deref(), Some("Ada"));
    }

    #[test]
    fn test_shape_dispatch() {
        assert_eq!(Value::int(1).shape(), Shape::Scalar);
        assert_eq!(Value::List(vec![]).shape(), Shape::Sequence);
        assert_eq!(Value::Tuple(Box::from([])).shape(), Shape::FixedSequence);
        assert_eq!(Value::Bag(vec![]).shape(), Shape::Bag);
        assert_eq!(Value::Map(BTreeMap::new()).shape(), Shape::Mapping);
        assert_eq!(Value::Record(Record::new("T")).shape(), Shape::Record);
    }
}
