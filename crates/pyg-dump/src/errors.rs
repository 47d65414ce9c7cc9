use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while obtaining a symbol dump
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },
}
