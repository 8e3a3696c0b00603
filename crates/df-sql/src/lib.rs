//! df-sql - SQL parsing layer for dagform
//!
//! This crate wraps sqlparser-rs with the warehouse dialects dagform targets
//! and extracts the relations a query reads, which drives hermeticity
//! classification.

pub mod dialect;
pub mod error;
pub mod extractor;
pub mod parser;

pub use dialect::{BigQueryDialect, PostgresDialect, SnowflakeDialect, SqlDialect};
pub use error::{SqlError, SqlResult};
pub use extractor::{extract_relations, ExtractedRelations};
pub use parser::SqlParser;
