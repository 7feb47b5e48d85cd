//! Decrypt command.

use std::fs;
use std::path::Path;

use crate::cli::output;
use crate::core::pipeline::Sealer;
use crate::error::Result;

/// Decrypt a file and print it raw, as flattened lines, or as flat JSON.
pub fn execute(
    sealer: &Sealer,
    file: &Path,
    input_type: Option<&str>,
    flat: bool,
    json: bool,
) -> Result<()> {
    let bytes = fs::read(file)?;
    let artifact = super::artifact(&bytes, file, input_type);

    if !flat && !json {
        let plaintext = sealer.decrypt_raw(artifact)?;
        output::data(&plaintext)?;
        return Ok(());
    }

    let values = sealer.decrypt_flattened(artifact)?;
    if json {
        let rendered = serde_json::to_string_pretty(&values.to_json())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        println!("{}", rendered);
    } else {
        for (key, value) in values.iter() {
            println!("{}={}", key, value);
        }
    }
    Ok(())
}
