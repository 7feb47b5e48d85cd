//! Age master key.
//!
//! Wraps the data key with the age format for a single x25519 recipient.
//! Everything happens locally.

use std::io::{Read, Write};

use ::age::x25519;
use tracing::trace;

use crate::core::datakey::DataKey;
use crate::error::{ConfigError, CryptoError, Result};

/// An age recipient and, once wrapped, its copy of the data key.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeKey {
    recipient: String,
    pub enc: Option<Vec<u8>>,
}

impl AgeKey {
    /// Create a key for `recipient`, validating the public key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRecipient` if the key format is invalid.
    pub fn new(recipient: &str) -> Result<Self> {
        let recipient = recipient.trim();
        parse_recipient(recipient)?;
        Ok(Self {
            recipient: recipient.to_string(),
            enc: None,
        })
    }

    /// Rebuild from artifact metadata.
    pub fn with_enc(recipient: &str, enc: Option<Vec<u8>>) -> Result<Self> {
        let mut key = Self::new(recipient)?;
        key.enc = enc;
        Ok(key)
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub(super) fn wrap(&self, data_key: &DataKey) -> Result<Vec<u8>> {
        trace!(recipient = %self.recipient, "wrapping data key with age");

        let failed = |reason: String| CryptoError::Wrap {
            recipient: self.recipient.clone(),
            reason,
        };

        let recipient = parse_recipient(&self.recipient)?;
        let encryptor =
            ::age::Encryptor::with_recipients(std::iter::once(&recipient as &dyn ::age::Recipient))
                .map_err(|e| failed(e.to_string()))?;

        let mut wrapped = Vec::new();
        let mut writer = encryptor
            .wrap_output(&mut wrapped)
            .map_err(|e| failed(e.to_string()))?;
        writer
            .write_all(data_key.as_bytes())
            .map_err(|e| failed(e.to_string()))?;
        writer.finish().map_err(|e| failed(e.to_string()))?;

        trace!(wrapped_len = wrapped.len(), "wrapped data key with age");
        Ok(wrapped)
    }

    pub(super) fn unwrap(&self, identities: &[x25519::Identity]) -> Result<DataKey> {
        trace!(recipient = %self.recipient, "unwrapping data key with age");

        let failed = |reason: String| CryptoError::Unwrap {
            recipient: self.recipient.clone(),
            reason,
        };

        let enc = self
            .enc
            .as_deref()
            .ok_or_else(|| failed("no wrapped key stored".to_string()))?;
        if identities.is_empty() {
            return Err(failed("no age identities available".to_string()).into());
        }

        let decryptor = ::age::Decryptor::new(enc).map_err(|e| failed(e.to_string()))?;
        let mut reader = decryptor
            .decrypt(identities.iter().map(|i| i as &dyn ::age::Identity))
            .map_err(|e| failed(e.to_string()))?;

        let mut plain = Vec::new();
        reader
            .read_to_end(&mut plain)
            .map_err(|e| failed(e.to_string()))?;

        DataKey::from_slice(&plain)
            .ok_or_else(|| failed("wrapped key has wrong length".to_string()).into())
    }
}

/// Parse a public key string into an age recipient.
///
/// # Errors
///
/// Returns `ConfigError::InvalidRecipient` if the key format is invalid.
pub fn parse_recipient(key: &str) -> Result<x25519::Recipient> {
    key.parse::<x25519::Recipient>()
        .map_err(|_| ConfigError::InvalidRecipient(key.to_string()).into())
}
