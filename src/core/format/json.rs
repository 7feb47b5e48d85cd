//! JSON documents.

use crate::core::tree::{Map, Node};
use crate::error::{FormatError, Result};

pub(super) fn parse(bytes: &[u8]) -> Result<Map> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| FormatError::Malformed {
            format: "json",
            reason: e.to_string(),
        })?;
    match Node::from_json(&value) {
        Node::Map(map) => Ok(map),
        _ => Err(FormatError::NotAMapping.into()),
    }
}

pub(super) fn serialize(map: &Map) -> Result<Vec<u8>> {
    let value = Node::Map(map.clone()).to_json();
    let mut out = serde_json::to_vec_pretty(&value).map_err(|e| FormatError::Malformed {
        format: "json",
        reason: e.to_string(),
    })?;
    out.push(b'\n');
    Ok(out)
}
