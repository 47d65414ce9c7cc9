use pyg_dump::DumpError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a generation run
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("import module {requested} failed: dump reported module '{found}'")]
    ModuleMismatch { requested: String, found: String },

    #[error("unsupported symbol kind '{kind}' for {symbol}")]
    UnsupportedSymbolKind { kind: String, symbol: String },

    #[error("Symbol dump failed: {0}")]
    Source(#[from] DumpError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
