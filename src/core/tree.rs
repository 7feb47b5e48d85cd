//! Ordered document tree.
//!
//! A parsed document is a [`Map`] whose values are [`Node`]s. Maps keep
//! insertion order so a document survives a parse/serialize round trip
//! with its keys where the author put them.

use std::fmt;

/// A scalar leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Scalar {
    /// Type tag used in encrypted values.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "str",
            Self::Int(_) | Self::UInt(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Null => "null",
        }
    }

    /// Rebuild a scalar from its rendered text and type tag.
    pub fn parse_typed(text: &str, type_name: &str) -> Option<Self> {
        match type_name {
            "str" => Some(Self::String(text.to_string())),
            "int" => text
                .parse()
                .map(Self::Int)
                .or_else(|_| text.parse().map(Self::UInt))
                .ok(),
            "float" => text.parse().ok().map(Self::Float),
            "bool" => match text {
                "true" | "True" => Some(Self::Bool(true)),
                "false" | "False" => Some(Self::Bool(false)),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{}", i),
            Self::UInt(u) => write!(f, "{}", u),
            Self::Float(x) => write!(f, "{}", x),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Null => Ok(()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    List(Vec<Node>),
    Map(Map),
}

impl Node {
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Convert into a JSON value, keeping key order.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Scalar(Scalar::String(s)) => Value::String(s.clone()),
            Self::Scalar(Scalar::Int(i)) => Value::from(*i),
            Self::Scalar(Scalar::UInt(u)) => Value::from(*u),
            Self::Scalar(Scalar::Float(x)) => serde_json::Number::from_f64(*x)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Self::Scalar(Scalar::Null) => Value::Null,
            Self::List(items) => Value::Array(items.iter().map(Node::to_json).collect()),
            Self::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Build from a JSON value.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Scalar(Scalar::Null),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(*b)),
            Value::Number(n) => Self::Scalar(number(n.as_i64(), n.as_u64(), n.as_f64())),
            Value::String(s) => Self::Scalar(Scalar::String(s.clone())),
            Value::Array(items) => Self::List(items.iter().map(Node::from_json).collect()),
            Value::Object(obj) => {
                let mut map = Map::new();
                for (k, v) in obj {
                    map.insert(k.clone(), Node::from_json(v));
                }
                Self::Map(map)
            }
        }
    }

    /// Convert into a YAML value, keeping key order.
    pub fn to_yaml(&self) -> serde_yaml_ng::Value {
        use serde_yaml_ng::Value;
        match self {
            Self::Scalar(Scalar::String(s)) => Value::String(s.clone()),
            Self::Scalar(Scalar::Int(i)) => Value::Number((*i).into()),
            Self::Scalar(Scalar::UInt(u)) => Value::Number((*u).into()),
            Self::Scalar(Scalar::Float(x)) => Value::Number((*x).into()),
            Self::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Self::Scalar(Scalar::Null) => Value::Null,
            Self::List(items) => Value::Sequence(items.iter().map(Node::to_yaml).collect()),
            Self::Map(map) => {
                let mut mapping = serde_yaml_ng::Mapping::new();
                for (k, v) in map.iter() {
                    mapping.insert(Value::String(k.to_string()), v.to_yaml());
                }
                Value::Mapping(mapping)
            }
        }
    }

    /// Build from a YAML value. Non-string keys are stringified.
    pub fn from_yaml(value: &serde_yaml_ng::Value) -> Self {
        use serde_yaml_ng::Value;
        match value {
            Value::Null => Self::Scalar(Scalar::Null),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(*b)),
            Value::Number(n) => Self::Scalar(number(n.as_i64(), n.as_u64(), n.as_f64())),
            Value::String(s) => Self::Scalar(Scalar::String(s.clone())),
            Value::Sequence(items) => Self::List(items.iter().map(Node::from_yaml).collect()),
            Value::Mapping(mapping) => {
                let mut map = Map::new();
                for (k, v) in mapping {
                    map.insert(yaml_key(k), Node::from_yaml(v));
                }
                Self::Map(map)
            }
            Value::Tagged(tagged) => Node::from_yaml(&tagged.value),
        }
    }
}

/// Integers stay exact, signed first; anything else is a float.
fn number(signed: Option<i64>, unsigned: Option<u64>, float: Option<f64>) -> Scalar {
    match (signed, unsigned) {
        (Some(i), _) => Scalar::Int(i),
        (None, Some(u)) => Scalar::UInt(u),
        (None, None) => Scalar::Float(float.unwrap_or(f64::NAN)),
    }
}

fn yaml_key(key: &serde_yaml_ng::Value) -> String {
    use serde_yaml_ng::Value;
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml_ng::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

impl From<Scalar> for Node {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::from(s))
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Self::Scalar(Scalar::from(s))
    }
}

impl From<Map> for Node {
    fn from(m: Map) -> Self {
        Self::Map(m)
    }
}

/// An ordered key/value mapping with unique keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map {
    entries: Vec<(String, Node)>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing in place if the key already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Node>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Map {
    type Item = (String, Node);
    type IntoIter = std::vec::IntoIter<(String, Node)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<Node>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
