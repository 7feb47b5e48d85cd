//! Command-line interface.
//!
//! A thin caller over [`Sealer`]: it turns flags into typed requests, reads
//! the input file and writes the result exactly once.

pub mod check;
pub mod decrypt;
pub mod encrypt;
pub mod get;
pub mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{debug, Dispatch};

use crate::core::cipher::{KeyServices, KmsClient};
use crate::core::config::ProviderDefaults;
use crate::core::constants::CONFIG_FILE;
use crate::core::keys::AgeKeySource;
use crate::core::pipeline::{Artifact, Sealer};
use crate::error::Result;

/// Sealfile - envelope encryption for configuration files.
#[derive(Parser)]
#[command(
    name = "sealfile",
    about = "Envelope encryption for JSON, YAML, dotenv and INI files",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Provider defaults file [default: sealfile.toml when present]
    #[arg(long, global = true, env = "SEALFILE_CONFIG")]
    pub config: Option<PathBuf>,

    /// age private key file, instead of SOPS_AGE_KEY / SOPS_AGE_KEY_FILE
    #[arg(long, global = true)]
    pub age_key_file: Option<PathBuf>,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Encrypt a plaintext document
    Encrypt(encrypt::EncryptArgs),

    /// Decrypt an encrypted document
    Decrypt {
        /// Encrypted file
        file: PathBuf,
        /// Format of the file (json, yaml, dotenv, ini)
        #[arg(long)]
        input_type: Option<String>,
        /// Print flattened `dotted.key=value` lines
        #[arg(long, conflicts_with = "json")]
        flat: bool,
        /// Print flattened values as a JSON object
        #[arg(long)]
        json: bool,
    },

    /// Print a single decrypted value
    Get {
        /// Encrypted file
        file: PathBuf,
        /// Dotted key (e.g., db.pass)
        key: String,
        /// Print the value as a nested YAML snippet
        #[arg(long)]
        yaml: bool,
        /// Format of the file (json, yaml, dotenv, ini)
        #[arg(long)]
        input_type: Option<String>,
    },

    /// Check an encrypted file against a recorded checksum
    Check {
        /// Encrypted file
        file: PathBuf,
        /// Checksum printed by `sealfile encrypt`
        checksum: String,
    },
}

/// Execute a command, logging to `log` only for its duration.
pub fn execute(cli: Cli, log: Dispatch) -> Result<()> {
    use Command::*;

    let Cli {
        config,
        age_key_file,
        command,
        ..
    } = cli;
    let build = || sealer(config.as_deref(), age_key_file.as_deref(), log.clone());

    tracing::dispatcher::with_default(&log, || match command {
        Encrypt(args) => encrypt::execute(&build()?, args),
        Decrypt {
            file,
            input_type,
            flat,
            json,
        } => decrypt::execute(&build()?, &file, input_type.as_deref(), flat, json),
        Get {
            file,
            key,
            yaml,
            input_type,
        } => get::execute(&build()?, &file, &key, yaml, input_type.as_deref()),
        Check { file, checksum } => check::execute(&file, &checksum),
    })
}

/// Describe an artifact file for decryption.
fn artifact<'a>(bytes: &'a [u8], file: &'a Path, input_type: Option<&'a str>) -> Artifact<'a> {
    let artifact = Artifact::new(bytes, file);
    match input_type {
        Some(format) => artifact.with_format(format),
        None => artifact,
    }
}

fn sealer(config: Option<&Path>, age_key_file: Option<&Path>, log: Dispatch) -> Result<Sealer> {
    let defaults = load_defaults(config)?;
    let services = key_services(age_key_file)?;
    Ok(Sealer::new(services)
        .with_defaults(defaults)
        .with_logger(log))
}

fn load_defaults(config: Option<&Path>) -> Result<ProviderDefaults> {
    match config {
        Some(path) => ProviderDefaults::load(path),
        None if Path::new(CONFIG_FILE).exists() => ProviderDefaults::load(CONFIG_FILE),
        None => {
            debug!("no provider defaults file");
            Ok(ProviderDefaults::default())
        }
    }
}

fn key_services(age_key_file: Option<&Path>) -> Result<KeyServices> {
    let source = match age_key_file {
        Some(path) => AgeKeySource::new().file(path),
        None => AgeKeySource::from_env(),
    };
    let identities = if source.is_empty() {
        Vec::new()
    } else {
        source.load()?
    };

    let services = KeyServices::new().with_age_identities(identities);
    Ok(match kms_client() {
        Some(client) => services.with_kms(client),
        None => services,
    })
}

#[cfg(feature = "test-kms")]
fn kms_client() -> Option<Box<dyn KmsClient>> {
    Some(Box::new(crate::core::cipher::StubKms::new()))
}

#[cfg(all(feature = "aws", not(feature = "test-kms")))]
fn kms_client() -> Option<Box<dyn KmsClient>> {
    Some(Box::new(crate::core::cipher::aws::AwsKms::new()))
}

#[cfg(not(any(feature = "aws", feature = "test-kms")))]
fn kms_client() -> Option<Box<dyn KmsClient>> {
    debug!("built without a KMS client");
    None
}
