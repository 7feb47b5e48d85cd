//! Per-leaf tree encryption.
//!
//! Every scalar leaf is sealed on its own with AES-256-GCM under the
//! document's data key. The additional authenticated data is the leaf's
//! path from the root, each segment prefixed with its byte length, so a
//! ciphertext moved to another path no longer opens. Map shape, key names
//! and list lengths stay in cleartext.
//!
//! An encrypted leaf is stored as a string:
//!
//! ```text
//! ENC[AES256_GCM,data:<b64>,iv:<b64>,tag:<b64>,type:<str|int|float|bool>]
//! ```
//!
//! Walking the tree also feeds every leaf's plaintext into a SHA-256
//! digest. The digest is sealed into the metadata as the document MAC.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::core::config::SelectionRules;
use crate::core::constants::{NONCE_SIZE, TAG_SIZE};
use crate::core::datakey::DataKey;
use crate::core::pipeline::CancelFlag;
use crate::core::tree::{Map, Node, Scalar};
use crate::error::{ConfigError, CryptoError, FormatError, Result};

const ENC_PREFIX: &str = "ENC[AES256_GCM,";
const ENC_SUFFIX: &str = "]";

/// Decides, key by key, whether a subtree is encrypted.
#[derive(Debug, Clone)]
enum Selection {
    All,
    UnencryptedSuffix(String),
    EncryptedSuffix(String),
    UnencryptedRegex(Regex),
    EncryptedRegex(Regex),
}

impl Selection {
    fn from_rules(rules: &SelectionRules) -> Result<Self> {
        rules.validate()?;
        let set = |r: &Option<String>| r.clone().filter(|s| !s.is_empty());
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| ConfigError::InvalidValue {
                field: "regex",
                reason: e.to_string(),
            })
        };

        Ok(if let Some(s) = set(&rules.unencrypted_suffix) {
            Self::UnencryptedSuffix(s)
        } else if let Some(s) = set(&rules.encrypted_suffix) {
            Self::EncryptedSuffix(s)
        } else if let Some(r) = set(&rules.unencrypted_regex) {
            Self::UnencryptedRegex(compile(r)?)
        } else if let Some(r) = set(&rules.encrypted_regex) {
            Self::EncryptedRegex(compile(r)?)
        } else {
            Self::All
        })
    }

    /// State at the root: with an `encrypted_*` rule nothing is encrypted
    /// until a key matches.
    fn initial(&self) -> bool {
        !matches!(self, Self::EncryptedSuffix(_) | Self::EncryptedRegex(_))
    }

    /// State for the subtree under `key`. A match sticks for the whole subtree.
    fn descend(&self, key: &str, current: bool) -> bool {
        match self {
            Self::All => current,
            Self::UnencryptedSuffix(s) => current && !key.ends_with(s.as_str()),
            Self::UnencryptedRegex(r) => current && !r.is_match(key),
            Self::EncryptedSuffix(s) => current || key.ends_with(s.as_str()),
            Self::EncryptedRegex(r) => current || r.is_match(key),
        }
    }
}

/// Seals and opens the leaves of one document.
pub struct TreeCipher<'a> {
    aead: Aes256Gcm,
    selection: Selection,
    cancel: Option<&'a CancelFlag>,
}

/// Hex digest of all leaf plaintexts, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mac(String);

impl Mac {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Walk state: current path and running digest.
struct Walk {
    path: Vec<String>,
    hasher: Sha256,
    leaves: usize,
}

impl Walk {
    fn new() -> Self {
        Self {
            path: Vec::new(),
            hasher: Sha256::new(),
            leaves: 0,
        }
    }

    /// Additional data for the current leaf: `<len>:<seg>:` per segment,
    /// `len` in bytes, so no two distinct paths share an encoding.
    fn aad(&self) -> String {
        aad_for(&self.path)
    }

    fn dotted(&self) -> String {
        self.path.join(".")
    }

    fn finish(self) -> Mac {
        Mac(hex::encode_upper(self.hasher.finalize()))
    }
}

fn aad_for<S: AsRef<str>>(path: &[S]) -> String {
    let mut aad = String::new();
    for segment in path {
        let segment = segment.as_ref();
        aad.push_str(&segment.len().to_string());
        aad.push(':');
        aad.push_str(segment);
        aad.push(':');
    }
    aad
}

impl<'a> TreeCipher<'a> {
    /// Build a cipher for `data_key` applying `rules`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the rules conflict or a regex
    /// does not compile.
    pub fn new(data_key: &DataKey, rules: &SelectionRules) -> Result<Self> {
        let aead = Aes256Gcm::new_from_slice(data_key.as_bytes()).map_err(|e| {
            ConfigError::InvalidValue {
                field: "data key",
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            aead,
            selection: Selection::from_rules(rules)?,
            cancel: None,
        })
    }

    /// Abort the walk as soon as `cancel` is raised.
    pub fn with_cancel(mut self, cancel: &'a CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Encrypt every selected leaf of `plain`.
    ///
    /// Returns the encrypted tree and the MAC over all leaf plaintexts.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Encrypt` naming the leaf that failed, or
    /// `Error::Cancelled`.
    pub fn encrypt_tree(&self, plain: &Map) -> Result<(Map, Mac)> {
        let mut walk = Walk::new();
        let tree = self.encrypt_map(plain, self.selection.initial(), &mut walk)?;
        debug!(leaves = walk.leaves, "tree encrypted");
        Ok((tree, walk.finish()))
    }

    /// Decrypt every encrypted leaf of `sealed`.
    ///
    /// Nothing is returned unless every leaf opens.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Integrity` at the first leaf that fails to
    /// authenticate or that should be encrypted but is not,
    /// `FormatError::InvalidCiphertext` for a malformed `ENC[...]` value, or
    /// `Error::Cancelled`.
    pub fn decrypt_tree(&self, sealed: &Map) -> Result<(Map, Mac)> {
        let mut walk = Walk::new();
        let tree = self.decrypt_map(sealed, self.selection.initial(), &mut walk)?;
        debug!(leaves = walk.leaves, "tree decrypted");
        Ok((tree, walk.finish()))
    }

    /// Seal the MAC, bound to the `lastmodified` timestamp.
    pub fn seal_mac(&self, mac: &Mac, lastmodified: &str) -> Result<String> {
        self.seal(mac.as_str(), "str", lastmodified)
            .map_err(|_| CryptoError::Encrypt { path: "mac".into() }.into())
    }

    /// Open the stored MAC and compare it with `computed`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::MacMismatch` if the stored MAC does not open or
    /// differs.
    pub fn verify_mac(&self, stored: &str, computed: &Mac, lastmodified: &str) -> Result<()> {
        let opened = self
            .open(stored, lastmodified, "mac")
            .map_err(|_| CryptoError::MacMismatch)?;
        match opened {
            Scalar::String(ref s) if s == computed.as_str() => {
                trace!("mac verified");
                Ok(())
            }
            _ => Err(CryptoError::MacMismatch.into()),
        }
    }

    fn check_cancel(&self) -> Result<()> {
        match self.cancel {
            Some(flag) => flag.check(),
            None => Ok(()),
        }
    }

    fn encrypt_map(&self, map: &Map, encrypt: bool, walk: &mut Walk) -> Result<Map> {
        let mut out = Map::new();
        for (key, child) in map.iter() {
            let state = self.selection.descend(key, encrypt);
            walk.path.push(key.to_string());
            let node = self.encrypt_node(child, state, walk)?;
            walk.path.pop();
            out.insert(key, node);
        }
        Ok(out)
    }

    fn encrypt_node(&self, node: &Node, encrypt: bool, walk: &mut Walk) -> Result<Node> {
        match node {
            Node::Map(map) => Ok(Node::Map(self.encrypt_map(map, encrypt, walk)?)),
            Node::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    walk.path.push(i.to_string());
                    out.push(self.encrypt_node(item, encrypt, walk)?);
                    walk.path.pop();
                }
                Ok(Node::List(out))
            }
            Node::Scalar(Scalar::Null) => Ok(node.clone()),
            Node::Scalar(scalar) => {
                self.check_cancel()?;
                let text = scalar.to_string();
                walk.hasher.update(text.as_bytes());
                walk.leaves += 1;
                if !encrypt {
                    return Ok(node.clone());
                }
                let sealed = self
                    .seal(&text, scalar.type_name(), &walk.aad())
                    .map_err(|_| CryptoError::Encrypt {
                        path: walk.dotted(),
                    })?;
                Ok(Node::Scalar(Scalar::String(sealed)))
            }
        }
    }

    fn decrypt_map(&self, map: &Map, encrypt: bool, walk: &mut Walk) -> Result<Map> {
        let mut out = Map::new();
        for (key, child) in map.iter() {
            let state = self.selection.descend(key, encrypt);
            walk.path.push(key.to_string());
            let node = self.decrypt_node(child, state, walk)?;
            walk.path.pop();
            out.insert(key, node);
        }
        Ok(out)
    }

    fn decrypt_node(&self, node: &Node, encrypted: bool, walk: &mut Walk) -> Result<Node> {
        match node {
            Node::Map(map) => Ok(Node::Map(self.decrypt_map(map, encrypted, walk)?)),
            Node::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    walk.path.push(i.to_string());
                    out.push(self.decrypt_node(item, encrypted, walk)?);
                    walk.path.pop();
                }
                Ok(Node::List(out))
            }
            Node::Scalar(Scalar::Null) => Ok(node.clone()),
            Node::Scalar(scalar) => {
                self.check_cancel()?;
                walk.leaves += 1;
                let plain = if encrypted {
                    let path = walk.dotted();
                    match scalar {
                        Scalar::String(s) if s.starts_with(ENC_PREFIX) => {
                            self.open(s, &walk.aad(), &path)?
                        }
                        _ => return Err(CryptoError::Integrity { path }.into()),
                    }
                } else {
                    scalar.clone()
                };
                walk.hasher.update(plain.to_string().as_bytes());
                Ok(Node::Scalar(plain))
            }
        }
    }

    fn seal(&self, text: &str, type_name: &str, aad: &str) -> Result<String> {
        let mut iv = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut iv);

        let payload = Payload {
            msg: text.as_bytes(),
            aad: aad.as_bytes(),
        };
        let mut sealed = self
            .aead
            .encrypt(Nonce::from_slice(&iv), payload)
            .map_err(|_| CryptoError::Encrypt {
                path: aad.to_string(),
            })?;
        let tag = sealed.split_off(sealed.len() - TAG_SIZE);

        Ok(format!(
            "{}data:{},iv:{},tag:{},type:{}{}",
            ENC_PREFIX,
            BASE64.encode(&sealed),
            BASE64.encode(iv),
            BASE64.encode(tag),
            type_name,
            ENC_SUFFIX
        ))
    }

    fn open(&self, value: &str, aad: &str, path: &str) -> Result<Scalar> {
        let invalid = || FormatError::InvalidCiphertext {
            path: path.to_string(),
        };
        let parsed = EncValue::parse(value).ok_or_else(invalid)?;
        if parsed.iv.len() != NONCE_SIZE || parsed.tag.len() != TAG_SIZE {
            return Err(invalid().into());
        }

        let mut msg = parsed.data;
        msg.extend_from_slice(&parsed.tag);
        let payload = Payload {
            msg: &msg,
            aad: aad.as_bytes(),
        };

        let integrity = || CryptoError::Integrity {
            path: path.to_string(),
        };
        let plain = self
            .aead
            .decrypt(Nonce::from_slice(&parsed.iv), payload)
            .map_err(|_| integrity())?;
        let text = String::from_utf8(plain).map_err(|_| integrity())?;

        Scalar::parse_typed(&text, &parsed.type_name).ok_or_else(|| invalid().into())
    }
}

/// Fields of a parsed `ENC[...]` string.
struct EncValue {
    data: Vec<u8>,
    iv: Vec<u8>,
    tag: Vec<u8>,
    type_name: String,
}

impl EncValue {
    fn parse(value: &str) -> Option<Self> {
        let body = value.strip_prefix(ENC_PREFIX)?.strip_suffix(ENC_SUFFIX)?;

        let (mut data, mut iv, mut tag, mut type_name) = (None, None, None, None);
        for part in body.split(',') {
            let (name, field) = part.split_once(':')?;
            match name {
                "data" => data = Some(BASE64.decode(field).ok()?),
                "iv" => iv = Some(BASE64.decode(field).ok()?),
                "tag" => tag = Some(BASE64.decode(field).ok()?),
                "type" => type_name = Some(field.to_string()),
                _ => return None,
            }
        }

        Some(Self {
            data: data?,
            iv: iv?,
            tag: tag?,
            type_name: type_name?,
        })
    }
}

/// Whether `value` looks like an encrypted leaf.
pub fn is_encrypted_value(value: &str) -> bool {
    value.starts_with(ENC_PREFIX) && value.ends_with(ENC_SUFFIX)
}
