use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TypeError;
use crate::iri::Iri;

/// An opaque, serializable value stored by the server.
///
/// The store only ever looks at two properties: `id`, which keys the
/// resource, and `type`, which the classifier consults for well-known
/// collection slots. Everything else is carried through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(Map<String, Value>);

impl Resource {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a JSON value. Only objects are resources.
    pub fn from_value(value: Value) -> Result<Self, TypeError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err(TypeError::NotAnObject("null")),
            Value::Bool(_) => Err(TypeError::NotAnObject("boolean")),
            Value::Number(_) => Err(TypeError::NotAnObject("number")),
            Value::String(_) => Err(TypeError::NotAnObject("string")),
            Value::Array(_) => Err(TypeError::NotAnObject("array")),
        }
    }

    /// Parse from serialized JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| TypeError::Serialization(e.to_string()))?;
        Self::from_value(value)
    }

    /// Serialize to JSON bytes.
    pub fn to_vec(&self) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec(&self.0).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Builder-style setter for `id`.
    pub fn with_id(mut self, id: &Iri) -> Self {
        self.set_id(id);
        self
    }

    pub fn set_id(&mut self, id: &Iri) {
        self.0.insert("id".into(), Value::String(id.to_string()));
    }

    /// The raw `id` string, if present and non-empty.
    pub fn id_str(&self) -> Option<&str> {
        self.0
            .get("id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// The parsed `id`. Missing, empty, or unparseable ids all yield `None`.
    pub fn id(&self) -> Option<Iri> {
        self.id_str().and_then(|s| Iri::parse(s).ok())
    }

    /// The `type` property, which may be a single string or an array.
    pub fn kinds(&self) -> Vec<&str> {
        match self.0.get("type") {
            Some(Value::String(kind)) => vec![kind.as_str()],
            Some(Value::Array(kinds)) => kinds.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kinds().contains(&kind)
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a property, returning the previous value.
    pub fn set_property(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove_property(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// An empty `OrderedCollection` with the given id.
    pub fn ordered_collection(id: &Iri) -> Self {
        let mut map = Map::new();
        map.insert("id".into(), Value::String(id.to_string()));
        map.insert("type".into(), Value::String("OrderedCollection".into()));
        map.insert("totalItems".into(), Value::from(0u64));
        map.insert("orderedItems".into(), Value::Array(Vec::new()));
        Self(map)
    }

    /// Items of an ordered collection, as IRIs or embedded object ids.
    pub fn ordered_item_ids(&self) -> Vec<&str> {
        self.0
            .get("orderedItems")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(item_id).collect())
            .unwrap_or_default()
    }

    pub fn contains_ordered_item(&self, item: &Iri) -> bool {
        self.ordered_item_ids().contains(&item.as_str())
    }

    /// Insert `item` at the front of `orderedItems` (newest first) and keep
    /// `totalItems` in sync.
    pub fn prepend_ordered_item(&mut self, item: &Iri) {
        let items = self
            .0
            .entry("orderedItems")
            .or_insert_with(|| Value::Array(Vec::new()));
        if !items.is_array() {
            *items = Value::Array(Vec::new());
        }
        let total = match items {
            Value::Array(list) => {
                list.insert(0, Value::String(item.to_string()));
                list.len()
            }
            _ => 0,
        };
        self.0.insert("totalItems".into(), Value::from(total as u64));
    }
}

fn item_id(item: &Value) -> Option<&str> {
    match item {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.get("id").and_then(Value::as_str),
        _ => None,
    }
}

impl TryFrom<Value> for Resource {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Resource> for Value {
    fn from(resource: Resource) -> Self {
        resource.into_value()
    }
}
