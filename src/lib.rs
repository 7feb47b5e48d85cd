//! Sealfile - envelope encryption for configuration documents.
//!
//! Every scalar in a JSON, YAML, dotenv or INI document is encrypted on
//! its own under one random data key, bound to its path in the tree. The
//! data key is wrapped once per recipient (AWS KMS keys and age public
//! keys); any single recipient can decrypt.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── encrypt       # Plaintext file -> artifact
//! │   ├── decrypt       # Raw or flattened output
//! │   ├── get           # Single value by dotted key
//! │   └── check         # Checksum drift detection
//! └── core/             # Core library components
//!     ├── config        # Typed configuration, sealfile.toml
//!     ├── tree          # Ordered document tree
//!     ├── flatten       # Dotted keys and YAML snippets
//!     ├── format/       # json, yaml, dotenv, ini codecs
//!     ├── cipher/       # Master keys
//!     │   ├── mod       # MasterKey, KeyGroup, KeyServices
//!     │   ├── age       # age recipients
//!     │   ├── kms       # KmsClient trait and KMS keys
//!     │   └── aws       # AWS KMS client (feature `aws`)
//!     ├── keys          # age private key sources
//!     ├── keygroup      # Key group resolution
//!     ├── datakey       # Data key generation and recovery
//!     ├── tree_cipher   # Per-leaf AES-256-GCM and MAC
//!     ├── metadata      # Metadata envelope
//!     ├── document      # Artifact emit/load, checksum
//!     └── pipeline      # Sealer: encrypt and decrypt
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use sealfile::core::cipher::KeyServices;
//! use sealfile::core::config::{AgeConfig, EncryptRequest, Mode};
//! use sealfile::core::pipeline::{Artifact, Sealer};
//!
//! # fn main() -> sealfile::error::Result<()> {
//! let sealer = Sealer::new(KeyServices::new());
//! let request = EncryptRequest::new(Mode::Age, "secrets.yaml")
//!     .with_age(AgeConfig::parse("age1..."));
//! let sealed = sealer.encrypt(b"db:\n  pass: s3cr3t\n", &request)?;
//!
//! let entry = sealer.decrypt_value(
//!     Artifact::new(&sealed.bytes, Path::new("secrets.yaml")),
//!     "db.pass",
//! )?;
//! println!("{}", entry.yaml);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod error;
