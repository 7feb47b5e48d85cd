//! Metadata envelope.
//!
//! Stored under the reserved top-level key of every artifact: the wrapped
//! data key copies, the selective encryption rule, the encrypted MAC and
//! the format version.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::cipher::{AgeKey, KeyGroup, KmsKey, MasterKey};
use crate::core::config::SelectionRules;
use crate::core::constants::FORMAT_VERSION;
use crate::core::tree::Node;
use crate::error::{FormatError, Result};

/// Metadata for one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kms: Vec<KmsEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub age: Vec<AgeEntry>,
    pub lastmodified: String,
    #[serde(default)]
    pub mac: String,
    #[serde(flatten)]
    pub rules: SelectionRules,
    /// Always 0: one group, any single recipient recovers the key.
    #[serde(default, deserialize_with = "number_or_string")]
    pub shamir_threshold: u32,
    pub version: String,
}

/// A KMS recipient entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KmsEntry {
    pub arn: String,
    #[serde(default)]
    pub aws_profile: String,
    pub created_at: String,
    /// Base64 wrapped data key; empty when wrapping failed.
    #[serde(default)]
    pub enc: String,
}

/// An age recipient entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeEntry {
    pub recipient: String,
    /// Base64 wrapped data key; empty when wrapping failed.
    #[serde(default)]
    pub enc: String,
}

impl Metadata {
    /// Describe a freshly wrapped key group.
    pub fn new(group: &KeyGroup, rules: SelectionRules, lastmodified: DateTime<Utc>) -> Self {
        let mut kms = Vec::new();
        let mut age = Vec::new();

        for key in group.keys() {
            let enc = key.enc().map(|b| BASE64.encode(b)).unwrap_or_default();
            match key {
                MasterKey::Kms(k) => kms.push(KmsEntry {
                    arn: k.arn.clone(),
                    aws_profile: k.profile.clone(),
                    created_at: timestamp(k.created_at),
                    enc,
                }),
                MasterKey::Age(k) => age.push(AgeEntry {
                    recipient: k.recipient().to_string(),
                    enc,
                }),
            }
        }

        Self {
            kms,
            age,
            lastmodified: timestamp(lastmodified),
            mac: String::new(),
            rules,
            shamir_threshold: 0,
            version: FORMAT_VERSION.to_string(),
        }
    }

    /// Rebuild the key group, age keys first.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::InvalidMetadata` for undecodable entries.
    pub fn key_group(&self) -> Result<KeyGroup> {
        let mut keys = Vec::with_capacity(self.age.len() + self.kms.len());

        for entry in &self.age {
            let key = AgeKey::with_enc(&entry.recipient, decode_enc(&entry.enc)?)
                .map_err(|e| FormatError::InvalidMetadata(e.to_string()))?;
            keys.push(MasterKey::Age(key));
        }

        for entry in &self.kms {
            let mut key = KmsKey::new(&entry.arn, &entry.aws_profile)
                .map_err(|e| FormatError::InvalidMetadata(e.to_string()))?;
            key.created_at = DateTime::parse_from_rfc3339(&entry.created_at)
                .map_err(|e| FormatError::InvalidMetadata(format!("created_at: {}", e)))?
                .with_timezone(&Utc);
            key.enc = decode_enc(&entry.enc)?;
            keys.push(MasterKey::Kms(key));
        }

        Ok(KeyGroup::new(keys))
    }

    /// Check the envelope is usable before touching any key.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::InvalidMetadata` when there are no recipients,
    /// no MAC, or the rules are inconsistent.
    pub fn validate(&self) -> Result<()> {
        if self.kms.is_empty() && self.age.is_empty() {
            return Err(FormatError::InvalidMetadata("no recipients".to_string()).into());
        }
        if self.mac.is_empty() {
            return Err(FormatError::InvalidMetadata("no MAC".to_string()).into());
        }
        self.rules
            .validate()
            .map_err(|e| FormatError::InvalidMetadata(e.to_string()))?;
        Ok(())
    }

    pub fn to_node(&self) -> Result<Node> {
        let value = serde_json::to_value(self)
            .map_err(|e| FormatError::InvalidMetadata(e.to_string()))?;
        Ok(Node::from_json(&value))
    }

    pub fn from_node(node: &Node) -> Result<Self> {
        serde_json::from_value(node.to_json())
            .map_err(|e| FormatError::InvalidMetadata(e.to_string()).into())
    }
}

fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn decode_enc(enc: &str) -> Result<Option<Vec<u8>>> {
    if enc.is_empty() {
        return Ok(None);
    }
    BASE64
        .decode(enc)
        .map(Some)
        .map_err(|e| FormatError::InvalidMetadata(format!("enc: {}", e)).into())
}

fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
