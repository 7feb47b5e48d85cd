//! Get command.

use std::fs;
use std::path::Path;

use crate::cli::output;
use crate::core::pipeline::Sealer;
use crate::error::Result;

/// Print the decrypted value at a dotted key.
///
/// A key naming a subtree always prints as YAML.
pub fn execute(
    sealer: &Sealer,
    file: &Path,
    key: &str,
    yaml: bool,
    input_type: Option<&str>,
) -> Result<()> {
    let bytes = fs::read(file)?;
    let entry = sealer.decrypt_value(super::artifact(&bytes, file, input_type), key)?;

    match entry.value {
        Some(value) if !yaml => println!("{}", value),
        _ => output::data(entry.yaml.as_bytes())?,
    }
    Ok(())
}
