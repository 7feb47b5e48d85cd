//! Master keys.
//!
//! A master key (recipient) wraps and unwraps the document's data key.
//! The set of recipient types is closed:
//!
//! - **age**: local x25519 public-key encryption.
//! - **kms**: AWS KMS, reached through a [`KmsClient`].
//!
//! Adding a recipient type means adding a [`MasterKey`] variant.

mod age;
mod kms;

#[cfg(feature = "aws")]
pub mod aws;

use std::fmt;

use ::age::x25519;

use crate::core::datakey::DataKey;
use crate::error::Result;

pub use self::age::AgeKey;
#[cfg(any(test, feature = "test-kms"))]
pub use self::kms::StubKms;
pub use self::kms::{KmsClient, KmsKey};

/// A recipient of the data key.
///
/// `enc` on each variant holds the wrapped data key once [`MasterKey::wrap`]
/// has succeeded for it.
#[derive(Debug, Clone, PartialEq)]
pub enum MasterKey {
    Kms(KmsKey),
    Age(AgeKey),
}

impl MasterKey {
    /// Type tag used in metadata and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Kms(_) => "kms",
            Self::Age(_) => "age",
        }
    }

    /// Key identifier: the ARN or the age recipient.
    pub fn id(&self) -> &str {
        match self {
            Self::Kms(k) => &k.arn,
            Self::Age(k) => k.recipient(),
        }
    }

    /// Wrapped data key, if wrapping succeeded.
    pub fn enc(&self) -> Option<&[u8]> {
        match self {
            Self::Kms(k) => k.enc.as_deref(),
            Self::Age(k) => k.enc.as_deref(),
        }
    }

    /// Wrap `data_key` for this recipient and remember the result.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Wrap` if the recipient can't wrap the key.
    pub fn wrap(&mut self, data_key: &DataKey, services: &KeyServices) -> Result<()> {
        match self {
            Self::Kms(k) => {
                let enc = k.wrap(data_key, services.kms.as_deref())?;
                k.enc = Some(enc);
            }
            Self::Age(k) => {
                let enc = k.wrap(data_key)?;
                k.enc = Some(enc);
            }
        }
        Ok(())
    }

    /// Recover the data key from this recipient's wrapped copy.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Unwrap` if there is no wrapped copy or the
    /// credential needed to open it is unavailable or wrong.
    pub fn unwrap(&self, services: &KeyServices) -> Result<DataKey> {
        match self {
            Self::Kms(k) => k.unwrap(services.kms.as_deref()),
            Self::Age(k) => k.unwrap(&services.age_identities),
        }
    }
}

impl fmt::Display for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// The set of recipients sharing one data key.
///
/// Recovery needs any single member to succeed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyGroup {
    keys: Vec<MasterKey>,
}

impl KeyGroup {
    pub fn new(keys: Vec<MasterKey>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[MasterKey] {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut [MasterKey] {
        &mut self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<MasterKey> for KeyGroup {
    fn from_iter<I: IntoIterator<Item = MasterKey>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Credentials and clients master keys need at wrap/unwrap time.
///
/// Built once by the caller and passed in; nothing here reads process state.
#[derive(Default)]
pub struct KeyServices {
    kms: Option<Box<dyn KmsClient>>,
    age_identities: Vec<x25519::Identity>,
}

impl KeyServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `client` for KMS wrap/unwrap.
    pub fn with_kms(mut self, client: Box<dyn KmsClient>) -> Self {
        self.kms = Some(client);
        self
    }

    /// Age private keys available for unwrapping.
    pub fn with_age_identities(mut self, identities: Vec<x25519::Identity>) -> Self {
        self.age_identities = identities;
        self
    }
}

impl fmt::Debug for KeyServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyServices")
            .field("kms", &self.kms)
            .field("age_identities", &self.age_identities.len())
            .finish()
    }
}
