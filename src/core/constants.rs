//! Constants used throughout sealfile.
//!
//! Centralizes magic strings and configuration values.

/// Reserved top-level key holding the metadata envelope.
pub const METADATA_KEY: &str = "sops";

/// Key prefix used for flattened metadata in dotenv artifacts.
pub const DOTENV_METADATA_PREFIX: &str = "sops_";

/// Separator between flattened metadata path segments (dotenv and ini).
pub const METADATA_SEPARATOR: &str = "__";

/// Separator for flattened output keys (e.g. `db.user`).
pub const DOTTED_SEPARATOR: &str = ".";

/// Format version written into every artifact.
pub const FORMAT_VERSION: &str = "3.7.3";

/// Size of the data key in bytes.
pub const DATA_KEY_SIZE: usize = 32;

/// AES-GCM nonce size in bytes.
pub const NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// Environment variable holding inline age private keys.
pub const AGE_KEY_ENV: &str = "SOPS_AGE_KEY";

/// Environment variable pointing at an age private key file.
pub const AGE_KEY_FILE_ENV: &str = "SOPS_AGE_KEY_FILE";

/// Provider defaults file name.
pub const CONFIG_FILE: &str = "sealfile.toml";

/// Logging filter environment variable.
pub const LOG_ENV: &str = "SEALFILE_LOG";
