//! Error taxonomy.
//!
//! Every failure surfaces as an [`Error`]; nothing is logged and swallowed.
//! Each family wraps a dedicated enum so callers can match on the cause.

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid recipient configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Unknown format or malformed document.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Plaintext already carries the reserved metadata entry.
    #[error("file already encrypted: the document contains a top-level '{key}' entry")]
    AlreadyEncrypted { key: &'static str },

    /// Wrapping, unwrapping or leaf authentication failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Requested dotted key is absent from the decrypted document.
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// The operation was aborted by the caller before completion.
    #[error("operation cancelled")]
    Cancelled,

    /// Underlying read or write failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Recipient and request configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unrecognized encryption mode '{0}' (expected kms, age or mix)")]
    UnknownMode(String),

    #[error("{field} is not set")]
    MissingField { field: &'static str },

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("invalid age recipient: {0}")]
    InvalidRecipient(String),

    #[error("failed to read config file: {0}")]
    ReadFile(std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Document parsing and serialization errors.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("don't know how to handle file with extension '{0}', set the input type to json, yaml, dotenv or ini")]
    UnsupportedExtension(String),

    #[error("unknown format '{0}' (expected json, yaml, dotenv or ini)")]
    UnknownFormat(String),

    #[error("malformed {format} input: {reason}")]
    Malformed { format: &'static str, reason: String },

    #[error("{format} cannot represent the value at '{path}'")]
    Unrepresentable { format: &'static str, path: String },

    #[error("document root must be a mapping")]
    NotAMapping,

    #[error("artifact has no metadata entry")]
    MissingMetadata,

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("invalid encrypted value at '{path}'")]
    InvalidCiphertext { path: String },
}

/// Cryptographic failures.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("failed to wrap data key for {recipient}: {reason}")]
    Wrap { recipient: String, reason: String },

    #[error("failed to unwrap data key with {recipient}: {reason}")]
    Unwrap { recipient: String, reason: String },

    #[error("could not generate data key: every recipient failed to wrap it")]
    AllWrapsFailed,

    #[error("no recipient could recover the data key")]
    NoRecipient,

    #[error("integrity check failed at path {path}")]
    Integrity { path: String },

    #[error("failed to encrypt value at path {path}")]
    Encrypt { path: String },

    #[error("MAC mismatch: the document was modified after encryption")]
    MacMismatch,
}

pub type Result<T> = std::result::Result<T, Error>;
