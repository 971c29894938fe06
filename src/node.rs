use serde::ser::SerializeMap;
use serde::Serialize;

use crate::token::Token;

/// A value held by a node property (or spliced into a parent result).
///
/// Whether a slot holds a `Seq` is decided once per alias when the grammar is
/// compiled — a symbol marked `many`, or an alias shared by several symbols of
/// one alternative, is sequence-typed even if a single match occurs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Token(Token),
    Node(Node),
    Seq(Vec<Value>),
}

impl Value {
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Value::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }
}

/// A node of the abstract syntax tree. Named after the production rule that
/// matched it; children live in an insertion-ordered property map keyed by
/// symbol alias.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub name: String,
    pub properties: Properties,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Node {
        Node {
            name: name.into(),
            properties: Properties::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.properties.get(key).is_some()
    }

    pub fn token(&self, key: &str) -> Option<&Token> {
        self.get(key).and_then(Value::as_token)
    }

    pub fn child(&self, key: &str) -> Option<&Node> {
        self.get(key).and_then(Value::as_node)
    }

    pub fn items(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_seq)
    }
}

/// Property map preserving insertion order. Lookups are exact-case; the maps
/// stay small enough that a vector beats hashing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Vec<(String, Value)>);

impl Properties {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// The sequence stored under `key`, created empty on first use. An
    /// existing scalar is demoted into a one-element sequence first.
    pub(crate) fn seq_mut(&mut self, key: &str) -> &mut Vec<Value> {
        if self.get(key).is_none() {
            self.0.push((key.to_string(), Value::Seq(Vec::new())));
        }
        let slot = self
            .0
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
            .unwrap();
        if !matches!(slot, Value::Seq(_)) {
            let scalar = std::mem::replace(slot, Value::Seq(Vec::new()));
            match slot {
                Value::Seq(items) => items.push(scalar),
                _ => unreachable!(),
            }
        }
        match slot {
            Value::Seq(items) => items,
            _ => unreachable!(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Properties {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Appends `value` to a sequence slot, flattening one level so that a spliced
/// sub-sequence merges into its parent instead of nesting.
pub(crate) fn append_flat(items: &mut Vec<Value>, value: Value) {
    match value {
        Value::Seq(inner) => items.extend(inner),
        value => items.push(value),
    }
}
