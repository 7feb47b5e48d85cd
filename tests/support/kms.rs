//! In-memory KMS for integration tests.
//!
//! Keeps one random AES key per ARN and wraps with AES-GCM, so blobs are
//! real ciphertext and only the instance that produced them can open them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use sealfile::core::cipher::{KmsClient, KmsKey};
use sealfile::error::{CryptoError, Result};

/// A KMS that lives in process memory.
///
/// Clones share keys, so a clone handed to a second sealer can unwrap
/// what the first one wrapped.
#[derive(Debug, Default, Clone)]
pub struct MemoryKms {
    keys: Arc<Mutex<HashMap<String, [u8; 32]>>>,
    denied: Vec<String>,
}

impl MemoryKms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call for `arn` fail, as if access were revoked.
    pub fn deny(mut self, arn: &str) -> Self {
        self.denied.push(arn.to_string());
        self
    }

    fn cipher(&self, arn: &str) -> Aes256Gcm {
        let mut keys = self.keys.lock().unwrap();
        let key = keys.entry(arn.to_string()).or_insert_with(|| {
            let mut k = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut k);
            k
        });
        Aes256Gcm::new_from_slice(key).unwrap()
    }

    fn denied(&self, arn: &str) -> bool {
        self.denied.iter().any(|a| a == arn)
    }
}

impl KmsClient for MemoryKms {
    fn encrypt(&self, key: &KmsKey, plaintext: &[u8]) -> Result<Vec<u8>> {
        if self.denied(&key.arn) {
            return Err(CryptoError::Wrap {
                recipient: key.arn.clone(),
                reason: "AccessDeniedException".to_string(),
            }
            .into());
        }
        let mut nonce = [0u8; 12];
        rand::rngs::OsRng.fill_bytes(&mut nonce);
        let mut blob = nonce.to_vec();
        blob.extend(
            self.cipher(&key.arn)
                .encrypt(Nonce::from_slice(&nonce), plaintext)
                .unwrap(),
        );
        Ok(blob)
    }

    fn decrypt(&self, key: &KmsKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let failed = |reason: &str| CryptoError::Unwrap {
            recipient: key.arn.clone(),
            reason: reason.to_string(),
        };
        if self.denied(&key.arn) {
            return Err(failed("AccessDeniedException").into());
        }
        if ciphertext.len() < 12 {
            return Err(failed("InvalidCiphertextException").into());
        }
        let (nonce, body) = ciphertext.split_at(12);
        self.cipher(&key.arn)
            .decrypt(Nonce::from_slice(nonce), body)
            .map_err(|_| failed("InvalidCiphertextException").into())
    }
}
