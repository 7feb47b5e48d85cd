//! Data key generation, distribution and recovery.
//!
//! One random 32-byte key encrypts every leaf of a document. Each master
//! key in the group gets its own wrapped copy; any single copy is enough
//! to recover the key.

use rand::RngCore;
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::core::cipher::{KeyGroup, KeyServices};
use crate::core::constants::DATA_KEY_SIZE;
use crate::error::{CryptoError, Result};

/// The symmetric key for one document. Zeroed on drop.
pub struct DataKey([u8; DATA_KEY_SIZE]);

impl DataKey {
    /// Generate a fresh key from the OS random source.
    pub fn generate() -> Self {
        let mut bytes = [0u8; DATA_KEY_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Build from exactly [`DATA_KEY_SIZE`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; DATA_KEY_SIZE] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; DATA_KEY_SIZE] {
        &self.0
    }
}

impl Drop for DataKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for DataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DataKey(..)")
    }
}

/// Wraps and recovers data keys with a group's master keys.
#[derive(Debug)]
pub struct DataKeyManager<'a> {
    services: &'a KeyServices,
}

impl<'a> DataKeyManager<'a> {
    pub fn new(services: &'a KeyServices) -> Self {
        Self { services }
    }

    /// Generate a data key and wrap it for every key in `group`.
    ///
    /// Keys that fail to wrap are left without a wrapped copy; the call
    /// still succeeds as long as one key wrapped.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::AllWrapsFailed` if no key could wrap it.
    pub fn generate_and_wrap(&self, group: &mut KeyGroup) -> Result<DataKey> {
        let data_key = DataKey::generate();
        let mut wrapped = 0usize;

        for key in group.keys_mut() {
            match key.wrap(&data_key, self.services) {
                Ok(()) => {
                    debug!(key = %key, "data key wrapped");
                    wrapped += 1;
                }
                Err(e) => warn!(key = %key, error = %e, "recipient cannot wrap data key"),
            }
        }

        if wrapped == 0 {
            return Err(CryptoError::AllWrapsFailed.into());
        }

        debug!(wrapped, total = group.len(), "data key distributed");
        Ok(data_key)
    }

    /// Recover the data key with the first master key that can unwrap it.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::NoRecipient` if every key fails.
    pub fn recover(&self, group: &KeyGroup) -> Result<DataKey> {
        for key in group.keys() {
            if key.enc().is_none() {
                continue;
            }
            match key.unwrap(self.services) {
                Ok(data_key) => {
                    debug!(key = %key, "data key recovered");
                    return Ok(data_key);
                }
                Err(e) => debug!(key = %key, error = %e, "recipient cannot unwrap data key"),
            }
        }
        Err(CryptoError::NoRecipient.into())
    }
}
