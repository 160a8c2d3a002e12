//! Serde helpers for loosely typed ledger fields.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Read a date field as raw text whatever its JSON type.
///
/// `null` becomes an empty string and any other non-string value its JSON
/// text, so a bad date marks one entry as undated instead of failing the
/// whole collection.
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(raw) => raw,
        other => other.to_string(),
    })
}
