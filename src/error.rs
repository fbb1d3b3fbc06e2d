//! Fatal error classes for dump parsing, store access and table output
//!
//! Per-node extraction problems in the hierarchical walk are not errors:
//! they degrade to `None` in [`crate::record::classify`] and never reach here.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop an inspection run
#[derive(Error, Debug)]
pub enum InspectError {
    #[error("failed to open dump {}: {source}", path.display())]
    DumpOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed timestamp {value:?} on line {line}: {source}")]
    DumpParse {
        line: usize,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("failed to read store snapshot {}: {reason}", path.display())]
    StoreOpen { path: PathBuf, reason: String },

    #[error("failed to dump to {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

/// Result type for inspection operations
pub type Result<T> = std::result::Result<T, InspectError>;
