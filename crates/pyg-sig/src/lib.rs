//! Textual signature parsing and identifier mangling
//!
//! Both halves are pure: the same input always gives the same output, and
//! neither ever fails. Odd input degrades into odd names that the emitter
//! still turns into valid identifiers.

pub mod mangle;
pub mod parser;

pub use mangle::{mangle, Keep, RESERVED_WORDS};
pub use parser::{parse, Parameter, Signature, Truncation};
