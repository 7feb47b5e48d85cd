//! Key group resolution.
//!
//! Turns a mode and the per-call/provider configuration into the single
//! key group an artifact is encrypted for. Per-call values win; provider
//! defaults are used only when they are complete.

use tracing::{debug, info};

use crate::core::cipher::{AgeKey, KeyGroup, KmsKey, MasterKey};
use crate::core::config::{AgeConfig, KmsConfig, Mode, ProviderDefaults};
use crate::error::{ConfigError, Result};

/// Build the key group for `mode`.
///
/// Age keys come first, then KMS keys, so local recipients are tried
/// before network ones on decrypt.
///
/// # Errors
///
/// Returns `ConfigError::MissingField` naming the first missing field when
/// neither the call nor the provider supplies a usable configuration, and
/// `ConfigError::InvalidRecipient`/`InvalidValue` for malformed keys.
pub fn resolve(
    mode: Mode,
    kms: Option<&KmsConfig>,
    age: Option<&AgeConfig>,
    defaults: &ProviderDefaults,
) -> Result<KeyGroup> {
    let mut keys = Vec::new();

    if mode.needs_age() {
        let age = resolve_age(age, &defaults.age)?;
        for recipient in &age.recipients {
            keys.push(MasterKey::Age(AgeKey::new(recipient)?));
        }
    }

    if mode.needs_kms() {
        let kms = resolve_kms(kms, &defaults.kms)?;
        // both fields are present once resolved
        let arn = kms.arn.as_deref().unwrap_or_default();
        let profile = kms.profile.as_deref().unwrap_or_default();
        keys.extend(KmsKey::from_arn_list(arn, profile)?.into_iter().map(MasterKey::Kms));
    }

    debug!(mode = %mode, keys = keys.len(), "key group resolved");
    Ok(KeyGroup::new(keys))
}

fn resolve_kms<'a>(call: Option<&'a KmsConfig>, defaults: &'a KmsConfig) -> Result<&'a KmsConfig> {
    let call = call.filter(|c| *c != &KmsConfig::default());
    match call {
        Some(c) => match c.missing_field() {
            None => Ok(c),
            Some(field) if defaults.is_configured() => {
                info!(missing = field, "using kms config from provider");
                Ok(defaults)
            }
            Some(field) => Err(ConfigError::MissingField { field }.into()),
        },
        None if defaults.is_configured() => {
            info!("using kms config from provider");
            Ok(defaults)
        }
        None => Err(ConfigError::MissingField {
            field: defaults.missing_field().unwrap_or("kms.arn"),
        }
        .into()),
    }
}

fn resolve_age<'a>(call: Option<&'a AgeConfig>, defaults: &'a AgeConfig) -> Result<&'a AgeConfig> {
    match call.filter(|c| c.is_configured()) {
        Some(c) => Ok(c),
        None if defaults.is_configured() => {
            info!("using age config from provider");
            Ok(defaults)
        }
        None => Err(ConfigError::MissingField {
            field: "age.recipients",
        }
        .into()),
    }
}
