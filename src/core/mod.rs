//! Core library components.
//!
//! Parsing, key management and tree encryption. Nothing here touches the
//! terminal or reads process-wide state.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod datakey;
pub mod document;
pub mod flatten;
pub mod format;
pub mod keygroup;
pub mod keys;
pub mod metadata;
pub mod pipeline;
pub mod tree;
pub mod tree_cipher;
