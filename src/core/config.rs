//! Typed configuration.
//!
//! Everything the surrounding caller hands to the core is converted into
//! these types at the boundary. Provider-level defaults can be read from a
//! `sealfile.toml` file:
//!
//! ```toml
//! [kms]
//! arn = "arn:aws:kms:us-east-1:123456789012:key/abc-123"
//! profile = "default"
//!
//! [age]
//! recipients = ["age1..."]
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Error, Result};

/// Which recipient types an artifact is encrypted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Kms,
    Age,
    Mix,
}

impl Mode {
    pub fn needs_kms(&self) -> bool {
        matches!(self, Self::Kms | Self::Mix)
    }

    pub fn needs_age(&self) -> bool {
        matches!(self, Self::Age | Self::Mix)
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kms" => Ok(Self::Kms),
            "age" => Ok(Self::Age),
            "mix" => Ok(Self::Mix),
            other => Err(ConfigError::UnknownMode(other.to_string()).into()),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Kms => "kms",
            Self::Age => "age",
            Self::Mix => "mix",
        })
    }
}

/// AWS KMS key reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KmsConfig {
    /// Key ARN. Several ARNs may be joined with commas.
    #[serde(default)]
    pub arn: Option<String>,
    /// AWS profile used to reach the key.
    #[serde(default)]
    pub profile: Option<String>,
}

impl KmsConfig {
    pub fn new(arn: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            arn: Some(arn.into()),
            profile: Some(profile.into()),
        }
    }

    /// Both ARN and profile are present and non-empty.
    pub fn is_configured(&self) -> bool {
        self.missing_field().is_none()
    }

    /// First field that prevents this config from being used.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.arn.as_deref().map_or(true, str::is_empty) {
            return Some("kms.arn");
        }
        if self.profile.as_deref().map_or(true, str::is_empty) {
            return Some("kms.profile");
        }
        None
    }
}

/// Age recipients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgeConfig {
    /// Public keys (`age1...`). A single comma separated string is accepted too.
    #[serde(default, deserialize_with = "recipient_list")]
    pub recipients: Vec<String>,
}

impl AgeConfig {
    pub fn new<I, S>(recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            recipients: recipients.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma separated recipient string.
    pub fn parse(list: &str) -> Self {
        Self::new(split_recipients(list))
    }

    pub fn is_configured(&self) -> bool {
        !self.recipients.is_empty()
    }
}

fn split_recipients(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn recipient_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => split_recipients(&s),
        OneOrMany::Many(v) => v.iter().flat_map(|s| split_recipients(s)).collect(),
    })
}

/// Provider-level defaults, used when a call does not carry its own keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderDefaults {
    #[serde(default)]
    pub kms: KmsConfig,
    #[serde(default)]
    pub age: AgeConfig,
}

impl ProviderDefaults {
    /// Load defaults from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` if the file can't be read or
    /// `ConfigError::Parse` if the TOML is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading provider defaults");

        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let defaults: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;

        debug!(
            kms = defaults.kms.is_configured(),
            age_recipients = defaults.age.recipients.len(),
            "provider defaults loaded"
        );
        Ok(defaults)
    }
}

/// Rules choosing which leaves stay in cleartext.
///
/// At most one rule may be set. With none set every leaf is encrypted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unencrypted_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unencrypted_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_regex: Option<String>,
}

impl SelectionRules {
    /// Check that at most one rule is set and that regexes compile.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` on conflicting rules or a bad regex.
    pub fn validate(&self) -> Result<()> {
        let set = [
            &self.unencrypted_suffix,
            &self.encrypted_suffix,
            &self.unencrypted_regex,
            &self.encrypted_regex,
        ]
        .iter()
        .filter(|r| r.as_deref().is_some_and(|s| !s.is_empty()))
        .count();

        if set > 1 {
            return Err(ConfigError::InvalidValue {
                field: "selection rules",
                reason: "only one of unencrypted_suffix, encrypted_suffix, unencrypted_regex, encrypted_regex may be set".to_string(),
            }
            .into());
        }

        for regex in [&self.unencrypted_regex, &self.encrypted_regex]
            .into_iter()
            .flatten()
        {
            regex::Regex::new(regex).map_err(|e| ConfigError::InvalidValue {
                field: "regex",
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

/// One encrypt call, as handed over by the caller.
#[derive(Debug, Clone)]
pub struct EncryptRequest {
    pub mode: Mode,
    /// Per-call KMS key, overriding provider defaults.
    pub kms: Option<KmsConfig>,
    /// Per-call age recipients, overriding provider defaults.
    pub age: Option<AgeConfig>,
    pub rules: SelectionRules,
    /// Destination path; drives format inference.
    pub path: PathBuf,
    /// Explicit format name, wins over the extension.
    pub format: Option<String>,
}

impl EncryptRequest {
    pub fn new(mode: Mode, path: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            kms: None,
            age: None,
            rules: SelectionRules::default(),
            path: path.into(),
            format: None,
        }
    }

    pub fn with_kms(mut self, kms: KmsConfig) -> Self {
        self.kms = Some(kms);
        self
    }

    pub fn with_age(mut self, age: AgeConfig) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_rules(mut self, rules: SelectionRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}
