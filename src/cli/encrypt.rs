//! Encrypt command.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use crate::cli::output;
use crate::core::config::{AgeConfig, EncryptRequest, KmsConfig, Mode, SelectionRules};
use crate::core::pipeline::Sealer;
use crate::error::Result;

/// Arguments for `sealfile encrypt`.
#[derive(Args, Debug)]
pub struct EncryptArgs {
    /// Plaintext file
    pub input: PathBuf,

    /// Write the artifact here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Recipient types: kms, age or mix
    #[arg(long, default_value = "age")]
    pub mode: String,

    /// KMS key ARN (comma separated for several keys)
    #[arg(long)]
    pub kms_arn: Option<String>,

    /// AWS profile used to reach the KMS key
    #[arg(long)]
    pub kms_profile: Option<String>,

    /// age recipients, comma separated
    #[arg(long)]
    pub age: Option<String>,

    /// Format of the input (json, yaml, dotenv, ini)
    #[arg(long)]
    pub input_type: Option<String>,

    /// Leave keys ending with this suffix in cleartext
    #[arg(long)]
    pub unencrypted_suffix: Option<String>,

    /// Encrypt only keys ending with this suffix
    #[arg(long)]
    pub encrypted_suffix: Option<String>,

    /// Leave keys matching this regex in cleartext
    #[arg(long)]
    pub unencrypted_regex: Option<String>,

    /// Encrypt only keys matching this regex
    #[arg(long)]
    pub encrypted_regex: Option<String>,
}

impl EncryptArgs {
    fn request(self) -> Result<EncryptRequest> {
        let mode: Mode = self.mode.parse()?;
        let rules = SelectionRules {
            unencrypted_suffix: self.unencrypted_suffix,
            encrypted_suffix: self.encrypted_suffix,
            unencrypted_regex: self.unencrypted_regex,
            encrypted_regex: self.encrypted_regex,
        };

        let mut request = EncryptRequest::new(mode, self.input).with_rules(rules);
        if self.kms_arn.is_some() || self.kms_profile.is_some() {
            request = request.with_kms(KmsConfig {
                arn: self.kms_arn,
                profile: self.kms_profile,
            });
        }
        if let Some(age) = self.age {
            request = request.with_age(AgeConfig::parse(&age));
        }
        if let Some(format) = self.input_type {
            request = request.with_format(format);
        }
        Ok(request)
    }
}

/// Encrypt a file and write the artifact once.
pub fn execute(sealer: &Sealer, args: EncryptArgs) -> Result<()> {
    let plaintext = fs::read(&args.input)?;
    let output_path = args.output.clone();
    let request = args.request()?;

    let sealed = sealer.encrypt(&plaintext, &request)?;
    debug!(bytes = sealed.bytes.len(), "artifact ready");

    match output_path {
        Some(path) => {
            fs::write(&path, &sealed.bytes)?;
            output::success(&format!("encrypted {}", path.display()));
            println!("{}", sealed.checksum);
        }
        None => {
            output::data(&sealed.bytes)?;
            output::kv("checksum", &sealed.checksum);
        }
    }
    Ok(())
}
