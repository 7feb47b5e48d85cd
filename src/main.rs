//! Sealfile - envelope encryption for configuration files.

use clap::Parser;
use tracing::Dispatch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sealfile::cli::output;
use sealfile::cli::{execute, Cli};
use sealfile::core::constants::LOG_ENV;
use sealfile::error::{ConfigError, CryptoError, Error, FormatError};

fn main() {
    let cli = Cli::parse();

    // Scoped to the command; nothing is installed globally
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("sealfile=debug")
        } else {
            EnvFilter::new("sealfile=warn")
        }
    });

    let log = Dispatch::new(
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).without_time()),
    );

    if let Err(e) = execute(cli, log) {
        // Format error with suggestion if available
        let suggestion = match &e {
            Error::Crypto(CryptoError::NoRecipient) => {
                Some("set SOPS_AGE_KEY_FILE or pass --age-key-file")
            }
            Error::Config(ConfigError::MissingField { .. }) => {
                Some("pass it as a flag or set it in sealfile.toml")
            }
            Error::Format(FormatError::UnsupportedExtension(_)) => {
                Some("pass --input-type json|yaml|dotenv|ini")
            }
            Error::AlreadyEncrypted { .. } => Some("run: sealfile decrypt <file>"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
