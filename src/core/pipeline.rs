//! Encrypt and decrypt pipelines.
//!
//! Both directions are linear: parse, get the data key, transform the
//! tree, serialize or project. A stage either completes or the whole call
//! fails; nothing partial is returned. The encrypted artifact is built in
//! memory and handed back as bytes for the caller to write once.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, debug_span, Dispatch};

use crate::core::cipher::KeyServices;
use crate::core::config::{EncryptRequest, ProviderDefaults};
use crate::core::datakey::DataKeyManager;
use crate::core::document::{self, EncryptedDocument};
use crate::core::flatten::{self, Flat};
use crate::core::format::Format;
use crate::core::keygroup;
use crate::core::metadata::Metadata;
use crate::core::tree::{Map, Node, Scalar};
use crate::core::tree_cipher::TreeCipher;
use crate::error::{Error, FormatError, Result};

/// Shared flag aborting an in-flight operation.
///
/// Clones observe the same flag, so a caller can keep one and hand the
/// other to a [`Sealer`].
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// # Errors
    ///
    /// Returns `Error::Cancelled` once [`cancel`](Self::cancel) was called.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

/// An encrypted artifact, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub bytes: Vec<u8>,
    /// Hex SHA-256 of `bytes`, for drift detection.
    pub checksum: String,
}

/// An artifact to decrypt.
#[derive(Debug, Clone, Copy)]
pub struct Artifact<'a> {
    pub bytes: &'a [u8],
    /// Used for format inference.
    pub path: &'a Path,
    /// Explicit format name, wins over the extension.
    pub format: Option<&'a str>,
}

impl<'a> Artifact<'a> {
    pub fn new(bytes: &'a [u8], path: &'a Path) -> Self {
        Self {
            bytes,
            path,
            format: None,
        }
    }

    pub fn with_format(mut self, format: &'a str) -> Self {
        self.format = Some(format);
        self
    }
}

/// A single decrypted value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueEntry {
    /// The dotted key that was asked for.
    pub key: String,
    /// The flat scalar, or `None` when the key names a subtree.
    pub value: Option<Scalar>,
    /// The node at the key, nested shape intact.
    pub node: Node,
    /// `{last_segment: node}` rendered as YAML.
    pub yaml: String,
}

/// Encrypts plaintext documents and decrypts artifacts.
///
/// Holds everything an operation needs: key services, provider defaults,
/// the log sink and a cancellation flag. Nothing is read from process
/// state.
#[derive(Debug)]
pub struct Sealer {
    services: KeyServices,
    defaults: ProviderDefaults,
    log: Dispatch,
    cancel: CancelFlag,
}

impl Sealer {
    pub fn new(services: KeyServices) -> Self {
        Self {
            services,
            defaults: ProviderDefaults::default(),
            log: Dispatch::none(),
            cancel: CancelFlag::new(),
        }
    }

    /// Provider-level defaults for calls that carry no keys of their own.
    pub fn with_defaults(mut self, defaults: ProviderDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Send this sealer's events to `log`. Silent by default.
    pub fn with_logger(mut self, log: Dispatch) -> Self {
        self.log = log;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Encrypt `plaintext` as described by `request`.
    ///
    /// # Errors
    ///
    /// - `FormatError` if the format can't be determined or the input is malformed
    /// - `Error::AlreadyEncrypted` if the input already has metadata; no key
    ///   is generated in that case
    /// - `ConfigError` if the recipients can't be resolved
    /// - `CryptoError::AllWrapsFailed` if no recipient can wrap the data key
    /// - `Error::Cancelled` if the operation was cancelled
    pub fn encrypt(&self, plaintext: &[u8], request: &EncryptRequest) -> Result<Sealed> {
        tracing::dispatcher::with_default(&self.log, || {
            let _span = debug_span!("encrypt", path = %request.path.display()).entered();
            self.run_encrypt(plaintext, request)
        })
    }

    /// Decrypt an artifact back into plaintext bytes in its own format.
    ///
    /// # Errors
    ///
    /// See [`decrypt_tree`](Self::decrypt_tree).
    pub fn decrypt_raw(&self, artifact: Artifact<'_>) -> Result<Vec<u8>> {
        self.with_log("decrypt_raw", artifact.path, || {
            let (format, tree) = self.run_decrypt(artifact)?;
            format.serialize(&tree)
        })
    }

    /// Decrypt an artifact and flatten it into dotted keys.
    ///
    /// # Errors
    ///
    /// See [`decrypt_tree`](Self::decrypt_tree).
    pub fn decrypt_flattened(&self, artifact: Artifact<'_>) -> Result<Flat> {
        self.with_log("decrypt_flattened", artifact.path, || {
            let (_, tree) = self.run_decrypt(artifact)?;
            Ok(flatten::flatten(&tree))
        })
    }

    /// Decrypt an artifact and return the value at `dotted_key`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the key is absent, otherwise see
    /// [`decrypt_tree`](Self::decrypt_tree).
    pub fn decrypt_value(&self, artifact: Artifact<'_>, dotted_key: &str) -> Result<ValueEntry> {
        self.with_log("decrypt_value", artifact.path, || {
            let (_, tree) = self.run_decrypt(artifact)?;
            let node = flatten::lookup(&tree, dotted_key).ok_or_else(|| Error::NotFound {
                key: dotted_key.to_string(),
            })?;
            let yaml = flatten::yaml_snippet(dotted_key, node).map_err(|e| {
                FormatError::Malformed {
                    format: "yaml",
                    reason: e.to_string(),
                }
            })?;
            Ok(ValueEntry {
                key: dotted_key.to_string(),
                value: node.as_scalar().cloned(),
                node: node.clone(),
                yaml,
            })
        })
    }

    /// Decrypt an artifact into its plaintext tree.
    ///
    /// # Errors
    ///
    /// - `FormatError` if the artifact can't be parsed or has no metadata
    /// - `CryptoError::NoRecipient` if no recipient can recover the data key
    /// - `CryptoError::Integrity` if any leaf fails to authenticate
    /// - `CryptoError::MacMismatch` if the document was edited
    /// - `Error::Cancelled` if the operation was cancelled
    pub fn decrypt_tree(&self, artifact: Artifact<'_>) -> Result<Map> {
        self.with_log("decrypt", artifact.path, || {
            self.run_decrypt(artifact).map(|(_, tree)| tree)
        })
    }

    fn with_log<T>(&self, op: &str, path: &Path, f: impl FnOnce() -> Result<T>) -> Result<T> {
        tracing::dispatcher::with_default(&self.log, || {
            let _span = debug_span!("decrypt", op, path = %path.display()).entered();
            f()
        })
    }

    fn run_encrypt(&self, plaintext: &[u8], request: &EncryptRequest) -> Result<Sealed> {
        let format = Format::from_path(&request.path, request.format.as_deref())?;
        let tree = format.parse(plaintext)?;
        document::ensure_no_metadata(&tree, format)?;
        request.rules.validate()?;
        self.cancel.check()?;

        let mut group = keygroup::resolve(
            request.mode,
            request.kms.as_ref(),
            request.age.as_ref(),
            &self.defaults,
        )?;
        let data_key = DataKeyManager::new(&self.services).generate_and_wrap(&mut group)?;
        self.cancel.check()?;

        let cipher = TreeCipher::new(&data_key, &request.rules)?.with_cancel(&self.cancel);
        let (sealed_tree, mac) = cipher.encrypt_tree(&tree)?;

        let mut metadata = Metadata::new(&group, request.rules.clone(), Utc::now());
        metadata.mac = cipher.seal_mac(&mac, &metadata.lastmodified)?;

        let doc = EncryptedDocument::new(sealed_tree, metadata, &request.path);
        let bytes = doc.emit(format)?;
        self.cancel.check()?;

        let checksum = document::checksum(&bytes);
        debug!(format = %format, bytes = bytes.len(), checksum = %checksum, "artifact built");
        Ok(Sealed { bytes, checksum })
    }

    fn run_decrypt(&self, artifact: Artifact<'_>) -> Result<(Format, Map)> {
        let format = Format::from_path(artifact.path, artifact.format)?;
        let doc = EncryptedDocument::load(artifact.bytes, format, artifact.path)?;
        doc.metadata.validate()?;
        self.cancel.check()?;

        let group = doc.metadata.key_group()?;
        let data_key = DataKeyManager::new(&self.services).recover(&group)?;
        self.cancel.check()?;

        let cipher = TreeCipher::new(&data_key, &doc.metadata.rules)?.with_cancel(&self.cancel);
        let (tree, mac) = cipher.decrypt_tree(&doc.tree)?;
        cipher.verify_mac(&doc.metadata.mac, &mac, &doc.metadata.lastmodified)?;

        debug!(format = %format, keys = tree.len(), "artifact decrypted");
        Ok((format, tree))
    }
}
