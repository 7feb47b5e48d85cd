//! dotenv documents.
//!
//! Flat `KEY=value` lines. Blank lines and `#` comments are skipped, an
//! optional `export ` prefix is accepted, and quoted values are unquoted.
//! Every value is a string.

use crate::core::tree::{Map, Node, Scalar};
use crate::error::{FormatError, Result};

pub(super) fn parse(bytes: &[u8]) -> Result<Map> {
    let contents = std::str::from_utf8(bytes).map_err(|e| FormatError::Malformed {
        format: "dotenv",
        reason: e.to_string(),
    })?;
    let mut map = Map::new();

    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);
        let (key, value) = line.split_once('=').ok_or_else(|| FormatError::Malformed {
            format: "dotenv",
            reason: format!("line {}: expected KEY=value", lineno + 1),
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(FormatError::Malformed {
                format: "dotenv",
                reason: format!("line {}: empty key", lineno + 1),
            }
            .into());
        }
        map.insert(key, Node::Scalar(Scalar::String(parse_value(value.trim()))));
    }

    Ok(map)
}

pub(super) fn serialize(map: &Map) -> Result<Vec<u8>> {
    let mut output = String::new();

    for (key, node) in map.iter() {
        let value = match node {
            Node::Scalar(s) => s.to_string(),
            _ => {
                return Err(FormatError::Unrepresentable {
                    format: "dotenv",
                    path: key.to_string(),
                }
                .into())
            }
        };
        if needs_quotes(&value) {
            output.push_str(&format!("{}=\"{}\"\n", key, escape_value(&value)));
        } else {
            output.push_str(&format!("{}={}\n", key, value));
        }
    }

    Ok(output.into_bytes())
}

pub(super) fn parse_value(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return unescape_double_quoted(&raw[1..raw.len() - 1]);
    }

    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return raw[1..raw.len() - 1].to_string();
    }

    raw.to_string()
}

fn unescape_double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

pub(super) fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.chars().any(|ch| ch.is_whitespace())
        || value.contains('#')
        || value.contains('=')
        || value.contains('"')
        || value.contains('\'')
        || value.contains('\\')
}

pub(super) fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(ch),
        }
    }

    escaped
}
