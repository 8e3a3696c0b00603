//! Warehouse selector and identifier quoting

use crate::target::Target;
use serde::{Deserialize, Serialize};

/// Warehouse a project compiles for. Fixed per project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Warehouse {
    /// Google BigQuery (default)
    #[default]
    BigQuery,
    /// Snowflake
    Snowflake,
    /// PostgreSQL
    Postgres,
}

impl std::fmt::Display for Warehouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warehouse::BigQuery => write!(f, "bigquery"),
            Warehouse::Snowflake => write!(f, "snowflake"),
            Warehouse::Postgres => write!(f, "postgres"),
        }
    }
}

impl Warehouse {
    /// Render a target as a fully-qualified relation name for this warehouse.
    ///
    /// ```
    /// use df_core::{Target, Warehouse};
    /// let t = Target::new(Some("D".into()), "dataform", "example");
    /// assert_eq!(Warehouse::BigQuery.quote_target(&t), "`D.dataform.example`");
    /// assert_eq!(Warehouse::Snowflake.quote_target(&t), r#""D"."dataform"."example""#);
    /// assert_eq!(Warehouse::Postgres.quote_target(&t), r#""dataform"."example""#);
    /// ```
    pub fn quote_target(&self, target: &Target) -> String {
        match self {
            Warehouse::BigQuery => {
                let joined = match &target.database {
                    Some(db) => format!("{}.{}.{}", db, target.schema, target.name),
                    None => format!("{}.{}", target.schema, target.name),
                };
                format!("`{}`", joined.replace('`', "\\`"))
            }
            Warehouse::Snowflake => {
                let mut parts = Vec::with_capacity(3);
                if let Some(db) = &target.database {
                    parts.push(quote_double(db));
                }
                parts.push(quote_double(&target.schema));
                parts.push(quote_double(&target.name));
                parts.join(".")
            }
            // Postgres cannot address another database from a session.
            Warehouse::Postgres => {
                format!(
                    "{}.{}",
                    quote_double(&target.schema),
                    quote_double(&target.name)
                )
            }
        }
    }

    /// Whether `create or replace table` is supported.
    pub fn supports_create_or_replace_table(&self) -> bool {
        !matches!(self, Warehouse::Postgres)
    }
}

fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
