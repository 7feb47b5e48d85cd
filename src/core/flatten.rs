//! Flattening nested documents into dotted keys and back.
//!
//! `{db: {user: alice}, hosts: [a, b]}` flattens to `db.user = alice`,
//! `hosts.0 = a`, `hosts.1 = b`. A [`Flat`] built by [`flatten`] also
//! records the shape of every container, empty ones included, so
//! [`unflatten`] rebuilds the exact document. Keys with no recorded shape
//! fall back to treating a level keyed exactly `0..n` as a list.

use std::collections::HashMap;

use crate::core::constants::DOTTED_SEPARATOR;
use crate::core::tree::{Map, Node, Scalar};

/// Kind of container found at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    List,
    Map,
}

/// Ordered dotted-path to scalar mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flat {
    entries: Vec<(String, Scalar)>,
    /// Container paths in document order, each with the count of leaves
    /// emitted before it.
    shapes: Vec<(usize, String, Shape)>,
}

impl Flat {
    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shape of the container at `key`, if one was recorded.
    pub fn shape(&self, key: &str) -> Option<Shape> {
        self.shapes
            .iter()
            .find(|(_, k, _)| k == key)
            .map(|(_, _, shape)| *shape)
    }

    /// Rendered as a flat JSON object of strings.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.to_string())))
                .collect(),
        )
    }
}

impl IntoIterator for Flat {
    type Item = (String, Scalar);
    type IntoIter = std::vec::IntoIter<(String, Scalar)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, Scalar)> for Flat {
    fn from_iter<I: IntoIterator<Item = (String, Scalar)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            shapes: Vec::new(),
        }
    }
}

/// Flatten a document using `.` between segments.
pub fn flatten(map: &Map) -> Flat {
    flatten_with(map, DOTTED_SEPARATOR)
}

/// Flatten a document using a custom separator.
pub fn flatten_with(map: &Map, sep: &str) -> Flat {
    let mut flat = Flat::default();
    for (key, node) in map.iter() {
        walk(key.to_string(), node, sep, &mut flat);
    }
    flat
}

fn walk(prefix: String, node: &Node, sep: &str, out: &mut Flat) {
    match node {
        Node::Scalar(s) => out.entries.push((prefix, s.clone())),
        Node::List(items) => {
            out.shapes.push((out.entries.len(), prefix.clone(), Shape::List));
            for (i, item) in items.iter().enumerate() {
                walk(format!("{}{}{}", prefix, sep, i), item, sep, out);
            }
        }
        Node::Map(map) => {
            out.shapes.push((out.entries.len(), prefix.clone(), Shape::Map));
            for (key, child) in map.iter() {
                walk(format!("{}{}{}", prefix, sep, key), child, sep, out);
            }
        }
    }
}

/// Rebuild the document a dotted [`flatten`] came from, using the recorded
/// shapes.
pub fn unflatten(flat: &Flat) -> Map {
    let split = |key: &str| -> Vec<String> {
        key.split(DOTTED_SEPARATOR).map(str::to_string).collect()
    };
    let mut root = Map::new();
    let mut shapes = flat.shapes.iter().peekable();
    for (i, (key, value)) in flat.entries.iter().enumerate() {
        while let Some((_, path, _)) = shapes.next_if(|(at, _, _)| *at <= i) {
            insert_path(&mut root, &split(path), Node::Map(Map::new()));
        }
        insert_path(&mut root, &split(key), Node::Scalar(value.clone()));
    }
    for (_, path, _) in shapes {
        insert_path(&mut root, &split(path), Node::Map(Map::new()));
    }

    let kinds: HashMap<&str, Shape> = flat
        .shapes
        .iter()
        .map(|(_, path, shape)| (path.as_str(), *shape))
        .collect();
    root.into_iter()
        .map(|(k, v)| {
            let node = restore(v, &k, &kinds);
            (k, node)
        })
        .collect()
}

/// Rebuild a nested document from keys joined with `sep`.
pub fn unflatten_with<'a, I>(entries: I, sep: &str) -> Map
where
    I: IntoIterator<Item = (&'a str, &'a Scalar)>,
{
    let mut root = Map::new();
    for (key, value) in entries {
        let segments: Vec<&str> = key.split(sep).collect();
        insert_path(&mut root, &segments, Node::Scalar(value.clone()));
    }
    let none = HashMap::new();
    root.into_iter()
        .map(|(k, v)| {
            let node = restore(v, &k, &none);
            (k, node)
        })
        .collect()
}

fn insert_path<S: AsRef<str>>(map: &mut Map, segments: &[S], value: Node) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    let head = head.as_ref();
    let is_map = matches!(map.get(head), Some(Node::Map(_)));
    if rest.is_empty() {
        // An already-built container keeps its children.
        if !(is_map && matches!(value, Node::Map(_))) {
            map.insert(head, value);
        }
        return;
    }
    if !is_map {
        map.insert(head, Node::Map(Map::new()));
    }
    if let Some(Node::Map(child)) = map.get_mut(head) {
        insert_path(child, rest, value);
    }
}

/// Turn intermediate maps into lists where `kinds` says so, or where the
/// keys are exactly `0..n` and no shape was recorded.
fn restore(node: Node, path: &str, kinds: &HashMap<&str, Shape>) -> Node {
    let Node::Map(map) = node else {
        return node;
    };
    let shape = kinds.get(path).copied().unwrap_or_else(|| {
        let indexed = !map.is_empty()
            && map
                .keys()
                .enumerate()
                .all(|(i, k)| k.parse::<usize>().ok() == Some(i));
        if indexed {
            Shape::List
        } else {
            Shape::Map
        }
    });
    let children = map.into_iter().map(|(k, v)| {
        let child = restore(v, &format!("{}{}{}", path, DOTTED_SEPARATOR, k), kinds);
        (k, child)
    });
    match shape {
        Shape::List => Node::List(children.map(|(_, v)| v).collect()),
        Shape::Map => Node::Map(children.collect()),
    }
}

/// Look up the node at a dotted path. Numeric segments index into lists.
pub fn lookup<'a>(map: &'a Map, dotted: &str) -> Option<&'a Node> {
    let mut segments = dotted.split(DOTTED_SEPARATOR);
    let mut node = map.get(segments.next()?)?;
    for segment in segments {
        node = match node {
            Node::Map(m) => m.get(segment)?,
            Node::List(items) => items.get(segment.parse::<usize>().ok()?)?,
            Node::Scalar(_) => return None,
        };
    }
    Some(node)
}

/// Render `{last_segment: node}` as YAML, keeping the nested shape of `node`.
pub fn yaml_snippet(dotted: &str, node: &Node) -> std::result::Result<String, serde_yaml_ng::Error> {
    let leaf_key = dotted.rsplit(DOTTED_SEPARATOR).next().unwrap_or(dotted);
    let mut map = Map::new();
    map.insert(leaf_key, node.clone());
    serde_yaml_ng::to_string(&Node::Map(map).to_yaml())
}
