//! Shared serde helper functions used across multiple modules.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// A scalar settings value. Project variables are strings, but settings
/// files commonly write numbers and booleans unquoted.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarVar {
    String(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl ScalarVar {
    /// Exact text of the value. Non-integer numbers do not round-trip
    /// through `f64` as written, so they are refused.
    fn into_string(self, name: &str) -> Result<String, String> {
        match self {
            ScalarVar::String(s) => Ok(s),
            ScalarVar::Int(i) => Ok(i.to_string()),
            ScalarVar::UInt(u) => Ok(u.to_string()),
            ScalarVar::Bool(b) => Ok(b.to_string()),
            ScalarVar::Float(f) => Err(format!(
                "var '{}' is the number {}, which may not match the text in the file; quote it",
                name, f
            )),
        }
    }
}

/// Deserialize a `name -> scalar` mapping into `name -> string`.
pub(crate) fn deserialize_vars<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, ScalarVar>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(k, v)| {
            let value = v.into_string(&k).map_err(D::Error::custom)?;
            Ok((k, value))
        })
        .collect()
}
