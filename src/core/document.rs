//! Encrypted artifact model.
//!
//! An artifact is the encrypted tree plus the metadata envelope under the
//! reserved `sops` key, serialized in the same format as the plaintext:
//!
//! - json/yaml: `sops` is a nested mapping.
//! - dotenv: metadata is flattened to `sops_<seg>__<seg>=...` lines.
//! - ini: a `[sops]` section holds `<seg>__<seg> = ...` keys.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::trace;

use crate::core::constants::{DOTENV_METADATA_PREFIX, METADATA_KEY, METADATA_SEPARATOR};
use crate::core::flatten::{flatten_with, unflatten_with};
use crate::core::format::Format;
use crate::core::metadata::Metadata;
use crate::core::tree::{Map, Node, Scalar};
use crate::error::{Error, FormatError, Result};

/// Reject a plaintext that already carries artifact metadata.
///
/// # Errors
///
/// Returns `Error::AlreadyEncrypted` if the reserved key (or, for dotenv,
/// the reserved prefix) is present at the top level.
pub fn ensure_no_metadata(tree: &Map, format: Format) -> Result<()> {
    let reserved = |key: &str| {
        key == METADATA_KEY
            || (format == Format::Dotenv && key.starts_with(DOTENV_METADATA_PREFIX))
    };
    if tree.keys().any(reserved) {
        return Err(Error::AlreadyEncrypted { key: METADATA_KEY });
    }
    Ok(())
}

/// Lowercase hex SHA-256 of serialized artifact bytes.
pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Whether `bytes` still hash to `expected`.
pub fn verify_checksum(bytes: &[u8], expected: &str) -> bool {
    checksum(bytes).eq_ignore_ascii_case(expected.trim())
}

/// An encrypted tree together with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct EncryptedDocument {
    pub tree: Map,
    pub metadata: Metadata,
    /// Where the artifact came from or is headed. Never serialized.
    pub file_path: PathBuf,
}

impl EncryptedDocument {
    pub fn new(tree: Map, metadata: Metadata, file_path: impl Into<PathBuf>) -> Self {
        Self {
            tree,
            metadata,
            file_path: file_path.into(),
        }
    }

    /// Serialize tree and metadata into `format`.
    ///
    /// # Errors
    ///
    /// Returns `FormatError` if the tree can't be represented in `format`.
    pub fn emit(&self, format: Format) -> Result<Vec<u8>> {
        let mut out = self.tree.clone();
        let meta = self.metadata.to_node()?;
        let meta = meta
            .as_map()
            .ok_or_else(|| FormatError::InvalidMetadata("not a mapping".to_string()))?;

        match format {
            Format::Json | Format::Yaml => {
                out.insert(METADATA_KEY, Node::Map(meta.clone()));
            }
            Format::Dotenv => {
                for (key, value) in flatten_with(meta, METADATA_SEPARATOR) {
                    out.insert(format!("{}{}", DOTENV_METADATA_PREFIX, key), value);
                }
            }
            Format::Ini => {
                let section: Map = flatten_with(meta, METADATA_SEPARATOR).into_iter().collect();
                out.insert(METADATA_KEY, section);
            }
        }

        trace!(format = %format, path = %self.file_path.display(), "emitting artifact");
        format.serialize(&out)
    }

    /// Parse an artifact, splitting off its metadata.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::MissingMetadata` if the document carries no
    /// metadata, `FormatError::InvalidMetadata` if it can't be read, or the
    /// format's parse error.
    pub fn load(bytes: &[u8], format: Format, file_path: impl AsRef<Path>) -> Result<Self> {
        let mut tree = format.parse(bytes)?;

        let meta_node = match format {
            Format::Json | Format::Yaml => tree
                .remove(METADATA_KEY)
                .ok_or(FormatError::MissingMetadata)?,
            Format::Dotenv => {
                let keys: Vec<String> = tree
                    .keys()
                    .filter(|k| k.starts_with(DOTENV_METADATA_PREFIX))
                    .map(str::to_string)
                    .collect();
                if keys.is_empty() {
                    return Err(FormatError::MissingMetadata.into());
                }
                let mut entries = Vec::with_capacity(keys.len());
                for key in keys {
                    if let Some(Node::Scalar(value)) = tree.remove(&key) {
                        let stripped = key[DOTENV_METADATA_PREFIX.len()..].to_string();
                        entries.push((stripped, value));
                    }
                }
                unflatten_entries(&entries)
            }
            Format::Ini => match tree.remove(METADATA_KEY) {
                Some(Node::Map(section)) => {
                    let entries: Vec<(String, Scalar)> = section
                        .into_iter()
                        .filter_map(|(k, v)| match v {
                            Node::Scalar(s) => Some((k, s)),
                            _ => None,
                        })
                        .collect();
                    unflatten_entries(&entries)
                }
                Some(_) => {
                    return Err(FormatError::InvalidMetadata(
                        "sops must be a section".to_string(),
                    )
                    .into())
                }
                None => return Err(FormatError::MissingMetadata.into()),
            },
        };

        let metadata = Metadata::from_node(&meta_node)?;
        trace!(
            format = %format,
            age = metadata.age.len(),
            kms = metadata.kms.len(),
            "artifact loaded"
        );
        Ok(Self::new(tree, metadata, file_path.as_ref()))
    }
}

fn unflatten_entries(entries: &[(String, Scalar)]) -> Node {
    Node::Map(unflatten_with(
        entries.iter().map(|(k, v)| (k.as_str(), v)),
        METADATA_SEPARATOR,
    ))
}
