//! df-assert - built-in assertion generation for dagform
//!
//! Tables may declare `assertions: { uniqueKey, uniqueKeys, nonNull,
//! rowConditions }` in their config block. This crate turns those specs into
//! standalone assertion actions whose queries return the violating rows.

pub mod error;
pub mod generator;
pub mod synthesizer;

pub use error::{AssertError, AssertResult};
pub use generator::{generate_non_null_query, generate_row_conditions_query, generate_unique_key_query};
pub use synthesizer::{AssertionKind, AssertionSynthesizer, Synthesized};
