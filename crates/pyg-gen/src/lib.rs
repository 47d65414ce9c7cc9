//! Binding generation for Python modules
//!
//! The pipeline runs in two phases:
//! 1. Dump the whole module, classify every symbol and emit a declaration
//!    for each callable; symbols without a usable signature are deferred.
//! 2. Ask the secondary lookup for exactly the deferred names, once, and
//!    emit whatever it resolved.
//!
//! Declarations are link-only Go functions over `*py.Object`; [`writer`]
//! turns them into a single source file.

pub mod classify;
pub mod emit;
pub mod errors;
pub mod orchestrate;
pub mod writer;

pub use classify::{classify, Disposition};
pub use emit::{emit, DeclParam, Declaration, Emission, KeywordPolicy};
pub use errors::GenerateError;
pub use orchestrate::{
    generate, run_phase, Collision, DeferredSet, GenerateOptions, GenerationReport, Phase,
    PhaseOutcome, RejectedSymbol, UnsupportedPolicy, UnsupportedSymbol,
};
pub use writer::{output_path, package_name, render, write_module};
