//! Symbol dumps of Python modules
//!
//! This crate owns the data model handed to the binding generator: a
//! [`Module`] with its ordered [`Symbol`]s, parsed once from the JSON that
//! the introspection tools print. Raw kind tags and the `<NULL>` signature
//! sentinel are turned into enums here so nothing downstream switches on
//! strings.
//!
//! It also defines [`SymbolSource`], the seam between the generator and the
//! tools (`pydump`, `pysigfetch`) or captured JSON files.

pub mod errors;
pub mod model;
pub mod source;

pub use errors::DumpError;
pub use model::{Module, SignatureText, Symbol, SymbolKind, NULL_SIGNATURE};
pub use source::{FileSource, StaticSource, SymbolSource, ToolSource};
