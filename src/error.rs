//! Error types for keycaps.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("duplicate key name in catalog: {0}")]
    DuplicateKey(String),

    #[error("symbol tables differ in length: {unshifted} unshifted vs {shifted} shifted")]
    SymbolTableMismatch { unshifted: usize, shifted: usize },

    #[error("key name is not filesystem-safe: {0:?}")]
    UnsafeKeyName(String),

    #[error("unknown key: {0}")]
    UnknownKey(String),

    #[error("malformed escape sequence at offset {offset}: {reason}")]
    Escape { offset: usize, reason: String },

    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
