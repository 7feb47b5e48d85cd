//! Check command.
//!
//! Detects out-of-band edits to an artifact without decrypting it.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::cli::output;
use crate::core::document::{checksum, verify_checksum};
use crate::error::Result;

/// Compare a file against a recorded checksum. Exits 1 on drift.
pub fn execute(file: &Path, expected: &str) -> Result<()> {
    let bytes = fs::read(file)?;

    if verify_checksum(&bytes, expected) {
        output::success(&format!("{} unchanged", file.display()));
        return Ok(());
    }

    debug!(expected, actual = %checksum(&bytes), "checksum drift");
    output::error(&format!("{} changed since it was encrypted", file.display()));
    output::kv("expected", expected);
    output::kv("actual", checksum(&bytes));
    std::process::exit(1);
}
