//! Frontend
//!
//! - [`name`] / [`descriptor`] - declaration identities and descriptors
//! - [`tree`] - the resolved-program tree and its visitor
//! - [`resolve`] - requirement attachment and reference resolution
//! - [`checkers`] - per-declaration checkers
//! - [`compiler`] - the compilation driver

pub mod checkers;
pub mod compiler;
pub mod descriptor;
pub mod name;
pub mod resolve;
pub mod tree;

pub use compiler::{CompileError, CompiledModule, Compiler};
