//! Age private key sources.
//!
//! Decryption with age needs the private half of a recipient. Keys come
//! from inline text or from a key file in the `age-keygen` layout (one
//! `AGE-SECRET-KEY-...` per line, `#` comments allowed). The library never
//! reads the process environment itself; [`AgeKeySource::from_env`] is for
//! the binary to call at its boundary.

use std::fs;
use std::path::{Path, PathBuf};

use age::x25519;
use tracing::{debug, warn};

use crate::core::constants::{AGE_KEY_ENV, AGE_KEY_FILE_ENV};
use crate::error::{ConfigError, Result};

/// Where to find age private keys.
#[derive(Debug, Clone, Default)]
pub struct AgeKeySource {
    inline: Option<String>,
    file: Option<PathBuf>,
}

impl AgeKeySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys given as text.
    pub fn inline(mut self, keys: impl Into<String>) -> Self {
        self.inline = Some(keys.into());
        self
    }

    /// Keys read from a file.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Read `SOPS_AGE_KEY` and `SOPS_AGE_KEY_FILE`.
    pub fn from_env() -> Self {
        Self {
            inline: std::env::var(AGE_KEY_ENV).ok().filter(|s| !s.is_empty()),
            file: std::env::var(AGE_KEY_FILE_ENV)
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inline.is_none() && self.file.is_none()
    }

    /// Load every identity this source points at.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` if the key file can't be read, or
    /// `ConfigError::InvalidValue` if a key line doesn't parse.
    pub fn load(&self) -> Result<Vec<x25519::Identity>> {
        let mut identities = Vec::new();

        if let Some(text) = &self.inline {
            identities.extend(parse_identities(text)?);
        }

        if let Some(path) = &self.file {
            identities.extend(load_file(path)?);
        }

        debug!(count = identities.len(), "age identities loaded");
        Ok(identities)
    }
}

fn load_file(path: &Path) -> Result<Vec<x25519::Identity>> {
    debug!(path = %path.display(), "loading age key file");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = fs::metadata(path) {
            let mode = meta.permissions().mode() & 0o777;
            if mode & 0o077 != 0 {
                warn!(
                    path = %path.display(),
                    mode = %format!("{:o}", mode),
                    "insecure key file permissions"
                );
            }
        }
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
    parse_identities(&contents)
}

/// Parse identities from key file text.
pub fn parse_identities(text: &str) -> Result<Vec<x25519::Identity>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            line.parse::<x25519::Identity>()
                .map_err(|e: &str| {
                    ConfigError::InvalidValue {
                        field: "age key",
                        reason: e.to_string(),
                    }
                    .into()
                })
        })
        .collect()
}
