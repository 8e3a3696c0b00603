//! Warehouse SQL dialects

use sqlparser::ast::Statement;
use sqlparser::dialect::{
    BigQueryDialect as SqlParserBigQuery, Dialect, PostgreSqlDialect as SqlParserPostgres,
    SnowflakeDialect as SqlParserSnowflake,
};
use sqlparser::parser::Parser;

use crate::error::{SqlError, SqlResult};

/// Trait for SQL dialect implementations
pub trait SqlDialect: Send + Sync {
    /// Get the underlying sqlparser dialect
    fn parser_dialect(&self) -> &dyn Dialect;

    /// Parse SQL into AST statements
    fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        Parser::parse_sql(self.parser_dialect(), sql).map_err(|e| {
            let message = e.to_string();
            let (line, column) = parse_location_from_error(&message);
            SqlError::ParseError {
                message,
                line,
                column,
            }
        })
    }

    /// Get the dialect name
    fn name(&self) -> &'static str;
}

/// Pull "Line: N, Column: M" out of a sqlparser error message.
///
/// `ParserError` carries no structured location, only text.
fn parse_location_from_error(msg: &str) -> (usize, usize) {
    let number_after = |label: &str| -> Option<usize> {
        let start = msg.find(label)? + label.len();
        let rest = &msg[start..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        rest[..end].parse().ok()
    };
    match (number_after("Line: "), number_after("Column: ")) {
        (Some(line), Some(column)) => (line, column),
        _ => (0, 0),
    }
}

/// Google BigQuery dialect
#[derive(Debug, Default)]
pub struct BigQueryDialect {
    dialect: SqlParserBigQuery,
}

impl BigQueryDialect {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SqlDialect for BigQueryDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn name(&self) -> &'static str {
        "bigquery"
    }
}

/// Snowflake dialect
#[derive(Debug, Default)]
pub struct SnowflakeDialect {
    dialect: SqlParserSnowflake,
}

impl SnowflakeDialect {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SqlDialect for SnowflakeDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn name(&self) -> &'static str {
        "snowflake"
    }
}

/// PostgreSQL dialect
#[derive(Debug, Default)]
pub struct PostgresDialect {
    dialect: SqlParserPostgres,
}

impl PostgresDialect {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SqlDialect for PostgresDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
