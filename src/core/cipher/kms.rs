//! KMS master key.
//!
//! The key service itself is opaque: anything implementing [`KmsClient`]
//! can wrap and unwrap. The AWS client lives behind the `aws` feature.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::core::datakey::DataKey;
use crate::error::{ConfigError, CryptoError, Result};

/// A KMS key reference and, once wrapped, its copy of the data key.
#[derive(Debug, Clone, PartialEq)]
pub struct KmsKey {
    pub arn: String,
    pub profile: String,
    pub created_at: DateTime<Utc>,
    pub enc: Option<Vec<u8>>,
}

impl KmsKey {
    /// Create a key for `arn` reached with `profile`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `arn` is not an AWS KMS ARN.
    pub fn new(arn: &str, profile: &str) -> Result<Self> {
        let arn = arn.trim();
        if !arn.starts_with("arn:aws:kms:") {
            return Err(ConfigError::InvalidValue {
                field: "kms.arn",
                reason: format!("expected arn:aws:kms:..., got '{}'", arn),
            }
            .into());
        }
        Ok(Self {
            arn: arn.to_string(),
            profile: profile.to_string(),
            created_at: Utc::now(),
            enc: None,
        })
    }

    /// One key per comma separated ARN.
    pub fn from_arn_list(arns: &str, profile: &str) -> Result<Vec<Self>> {
        arns.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|arn| Self::new(arn, profile))
            .collect()
    }

    /// Region segment of the ARN (`arn:aws:kms:<region>:...`).
    pub fn region(&self) -> Option<&str> {
        self.arn.split(':').nth(3).filter(|r| !r.is_empty())
    }

    pub(super) fn wrap(
        &self,
        data_key: &DataKey,
        client: Option<&dyn KmsClient>,
    ) -> Result<Vec<u8>> {
        trace!(arn = %self.arn, profile = %self.profile, "wrapping data key with kms");
        let client = client.ok_or_else(|| CryptoError::Wrap {
            recipient: self.arn.clone(),
            reason: "no KMS client available".to_string(),
        })?;
        client.encrypt(self, data_key.as_bytes())
    }

    pub(super) fn unwrap(&self, client: Option<&dyn KmsClient>) -> Result<DataKey> {
        trace!(arn = %self.arn, profile = %self.profile, "unwrapping data key with kms");
        let failed = |reason: &str| CryptoError::Unwrap {
            recipient: self.arn.clone(),
            reason: reason.to_string(),
        };

        let enc = self
            .enc
            .as_deref()
            .ok_or_else(|| failed("no wrapped key stored"))?;
        let client = client.ok_or_else(|| failed("no KMS client available"))?;
        let plain = client.decrypt(self, enc)?;
        DataKey::from_slice(&plain)
            .ok_or_else(|| failed("unwrapped key has wrong length").into())
    }
}

/// Blocking access to a key management service.
///
/// Implemented by the AWS client and by test stubs. Implementations own
/// their timeout and retry policy.
pub trait KmsClient: std::fmt::Debug {
    /// Encrypt `plaintext` under `key`.
    fn encrypt(&self, key: &KmsKey, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt a blob previously produced for `key`.
    fn decrypt(&self, key: &KmsKey, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

/// Stub KMS for testing.
///
/// Prefixes the ARN and hex encodes, which is NOT encryption; it only
/// checks the plumbing. ARNs listed in `deny` fail both directions.
#[cfg(any(test, feature = "test-kms"))]
#[derive(Debug, Default)]
pub struct StubKms {
    deny: Vec<String>,
}

#[cfg(any(test, feature = "test-kms"))]
impl StubKms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call for `arn` fail.
    pub fn deny(mut self, arn: &str) -> Self {
        self.deny.push(arn.to_string());
        self
    }

    fn check(&self, key: &KmsKey) -> std::result::Result<(), String> {
        if self.deny.iter().any(|a| *a == key.arn) {
            return Err(format!("access denied for {}", key.arn));
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-kms"))]
impl KmsClient for StubKms {
    fn encrypt(&self, key: &KmsKey, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.check(key).map_err(|reason| CryptoError::Wrap {
            recipient: key.arn.clone(),
            reason,
        })?;
        Ok(format!("stub-kms:{}:{}", key.arn, hex::encode(plaintext)).into_bytes())
    }

    fn decrypt(&self, key: &KmsKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let failed = |reason: String| CryptoError::Unwrap {
            recipient: key.arn.clone(),
            reason,
        };
        self.check(key).map_err(failed)?;

        let text = std::str::from_utf8(ciphertext).map_err(|e| failed(e.to_string()))?;
        let prefix = format!("stub-kms:{}:", key.arn);
        let encoded = text
            .strip_prefix(&prefix)
            .ok_or_else(|| failed("blob was not produced for this key".to_string()))?;
        hex::decode(encoded).map_err(|e| failed(e.to_string()).into())
    }
}
