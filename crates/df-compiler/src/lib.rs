//! df-compiler - the dagform compile pipeline
//!
//! Compilation runs in two per-file phases so that files can reference each
//! other regardless of discovery order:
//!
//! 1. read and split every definition file, then record each declared name in
//!    a shared [`NameTable`](df_core::NameTable);
//! 2. render every template against the complete name table.
//!
//! Both phases run concurrently across files. Per-file failures are collected
//! and merged into the graph's `graphErrors`; they never abort the compile.

pub mod error;
pub mod hermeticity;
pub mod pipeline;
pub mod render;

pub use error::{CompileError, CompileResult};
pub use pipeline::{compile_project, CompileOptions, Compiler};
pub use render::compile_definition;
