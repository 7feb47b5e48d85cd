//! YAML documents.

use crate::core::tree::{Map, Node};
use crate::error::{FormatError, Result};

pub(super) fn parse(bytes: &[u8]) -> Result<Map> {
    let value: serde_yaml_ng::Value =
        serde_yaml_ng::from_slice(bytes).map_err(|e| FormatError::Malformed {
            format: "yaml",
            reason: e.to_string(),
        })?;
    match Node::from_yaml(&value) {
        Node::Map(map) => Ok(map),
        // empty document
        Node::Scalar(crate::core::tree::Scalar::Null) => Ok(Map::new()),
        _ => Err(FormatError::NotAMapping.into()),
    }
}

pub(super) fn serialize(map: &Map) -> Result<Vec<u8>> {
    let value = Node::Map(map.clone()).to_yaml();
    serde_yaml_ng::to_string(&value)
        .map(String::into_bytes)
        .map_err(|e| {
            FormatError::Malformed {
                format: "yaml",
                reason: e.to_string(),
            }
            .into()
        })
}
