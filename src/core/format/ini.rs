//! INI documents.
//!
//! Keys before the first `[section]` live at the top level; each section
//! becomes a nested mapping of strings. `;` and `#` start comments.

use super::dotenv::{escape_value, needs_quotes, parse_value};
use crate::core::tree::{Map, Node, Scalar};
use crate::error::{FormatError, Result};

pub(super) fn parse(bytes: &[u8]) -> Result<Map> {
    let contents = std::str::from_utf8(bytes).map_err(|e| FormatError::Malformed {
        format: "ini",
        reason: e.to_string(),
    })?;
    let mut root = Map::new();
    let mut section: Option<(String, Map)> = None;

    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            if let Some((name, map)) = section.take() {
                root.insert(name, map);
            }
            section = Some((name.trim().to_string(), Map::new()));
            continue;
        }

        let (key, value) = line.split_once('=').ok_or_else(|| FormatError::Malformed {
            format: "ini",
            reason: format!("line {}: expected key = value", lineno + 1),
        })?;
        let key = key.trim();
        let value = Node::Scalar(Scalar::String(parse_value(value.trim())));
        match section.as_mut() {
            Some((_, map)) => map.insert(key, value),
            None => root.insert(key, value),
        }
    }

    if let Some((name, map)) = section {
        root.insert(name, map);
    }

    Ok(root)
}

pub(super) fn serialize(map: &Map) -> Result<Vec<u8>> {
    let mut output = String::new();

    for (key, node) in map.iter() {
        if let Node::Scalar(s) = node {
            push_entry(&mut output, key, s);
        }
    }

    for (name, node) in map.iter() {
        match node {
            Node::Scalar(_) => {}
            Node::Map(section) => {
                if !output.is_empty() {
                    output.push('\n');
                }
                output.push_str(&format!("[{}]\n", name));
                for (key, value) in section.iter() {
                    match value {
                        Node::Scalar(s) => push_entry(&mut output, key, s),
                        _ => {
                            return Err(FormatError::Unrepresentable {
                                format: "ini",
                                path: format!("{}.{}", name, key),
                            }
                            .into())
                        }
                    }
                }
            }
            Node::List(_) => {
                return Err(FormatError::Unrepresentable {
                    format: "ini",
                    path: name.to_string(),
                }
                .into())
            }
        }
    }

    Ok(output.into_bytes())
}

fn push_entry(output: &mut String, key: &str, value: &Scalar) {
    let value = value.to_string();
    if needs_quotes(&value) {
        output.push_str(&format!("{} = \"{}\"\n", key, escape_value(&value)));
    } else {
        output.push_str(&format!("{} = {}\n", key, value));
    }
}
