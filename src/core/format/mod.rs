//! Document formats.
//!
//! Parses bytes into an ordered [`Map`] and serializes it back. json and
//! yaml support arbitrary nesting; dotenv is flat and ini allows one level
//! of `[section]` nesting.

mod dotenv;
mod ini;
mod json;
mod yaml;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::trace;

use crate::core::tree::Map;
use crate::error::{FormatError, Result};

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Dotenv,
    Ini,
}

impl Format {
    /// Resolve the format from an explicit name, falling back to the file extension.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::UnsupportedExtension` when no explicit format is
    /// given and the extension is not one of `.json`, `.yaml`, `.yml`,
    /// `.env`, `.ini`.
    pub fn from_path(path: impl AsRef<Path>, explicit: Option<&str>) -> Result<Self> {
        if let Some(name) = explicit.filter(|s| !s.is_empty()) {
            return name.parse();
        }

        let path = path.as_ref();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let format = match ext.as_str() {
            ".json" => Self::Json,
            ".yaml" | ".yml" => Self::Yaml,
            ".env" => Self::Dotenv,
            ".ini" => Self::Ini,
            _ => {
                // `.env` has no extension according to Path
                if path.file_name().and_then(|n| n.to_str()) == Some(".env") {
                    Self::Dotenv
                } else {
                    return Err(FormatError::UnsupportedExtension(ext).into());
                }
            }
        };
        trace!(path = %path.display(), format = %format, "inferred format");
        Ok(format)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Dotenv => "dotenv",
            Self::Ini => "ini",
        }
    }

    /// Parse a document.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Malformed` if the input is not valid for this
    /// format, or `FormatError::NotAMapping` if the root is not a mapping.
    pub fn parse(&self, bytes: &[u8]) -> Result<Map> {
        trace!(format = %self, len = bytes.len(), "parsing document");
        match self {
            Self::Json => json::parse(bytes),
            Self::Yaml => yaml::parse(bytes),
            Self::Dotenv => dotenv::parse(bytes),
            Self::Ini => ini::parse(bytes),
        }
    }

    /// Serialize a document.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Unrepresentable` when the tree has a shape the
    /// format cannot hold (nesting in dotenv, deep nesting in ini).
    pub fn serialize(&self, map: &Map) -> Result<Vec<u8>> {
        match self {
            Self::Json => json::serialize(map),
            Self::Yaml => yaml::serialize(map),
            Self::Dotenv => dotenv::serialize(map),
            Self::Ini => ini::serialize(map),
        }
    }
}

impl FromStr for Format {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "dotenv" | "env" => Ok(Self::Dotenv),
            "ini" => Ok(Self::Ini),
            other => Err(FormatError::UnknownFormat(other.to_string()).into()),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
