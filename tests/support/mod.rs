//! Test support utilities for sealfile integration tests.
//!
//! Provides an isolated working directory with an age key pair, plus an
//! in-memory KMS for library-level tests.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
pub mod kms;
pub mod skip;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use kms::MemoryKms;

use std::path::PathBuf;

use age::secrecy::ExposeSecret;
use age::x25519;
use tempfile::TempDir;

/// Test environment with an isolated temp directory and an age key pair.
///
/// Child processes get `.current_dir()` and explicit env vars, so tests can
/// run in parallel without touching process-global state.
pub struct Test {
    /// Temporary working directory
    pub dir: TempDir,
    /// Public key matching `key_file`
    pub recipient: String,
    /// File holding the age private key
    pub key_file: PathBuf,
}

impl Test {
    /// Create a new environment with a fresh age key pair on disk.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let identity = x25519::Identity::generate();
        let recipient = identity.to_public().to_string();
        let key_file = dir.path().join("keys.txt");
        std::fs::write(
            &key_file,
            format!(
                "# public key: {}\n{}\n",
                recipient,
                identity.to_string().expose_secret()
            ),
        )
        .expect("failed to write key file");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&key_file, std::fs::Permissions::from_mode(0o600))
                .expect("failed to restrict key file");
        }

        Self {
            dir,
            recipient,
            key_file,
        }
    }

    /// Path inside the working directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a file into the working directory.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).expect("failed to write file");
        path
    }

    /// Read a file from the working directory.
    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path(name)).expect("failed to read file")
    }
}

/// A generated age identity and its recipient string.
pub fn age_pair() -> (x25519::Identity, String) {
    let identity = x25519::Identity::generate();
    let recipient = identity.to_public().to_string();
    (identity, recipient)
}
