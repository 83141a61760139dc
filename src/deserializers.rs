//! Custom deserializers for flexible query parameter parsing.
//!
//! Query strings carry everything as text, so booleans arrive in whatever
//! spelling the caller's HTTP client prefers.

use serde::{Deserialize, Deserializer};

/// Deserializes an optional boolean from native booleans, numbers, or strings.
///
/// # Accepted Formats
///
/// * **Boolean**: `true` / `false`
/// * **Numeric**: `1` → true, `0` → false
/// * **String** (case-insensitive): `"true"`, `"1"`, `"yes"`, `"on"`, `"y"`, `"t"`
///   and `"false"`, `"0"`, `"no"`, `"off"`, `"n"`, `"f"`
/// * Empty string or null → `None`
///
/// # Examples
///
/// ```text
/// /analyze/textiles?download=true
/// /analyze/textiles?download=1
/// /analyze/textiles?download=Yes
/// ```
///
/// # Errors
///
/// Returns an error for any other value.
pub fn de_option_bool_forgiving<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let opt = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(v) = opt else { return Ok(None) };
    match v {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Bool(b) => Ok(Some(b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(Some(false)),
            Some(1) => Ok(Some(true)),
            _ => Err(D::Error::custom(format!("invalid boolean value: {}", n))),
        },
        serde_json::Value::String(s) => parse_bool_str(&s)
            .map_err(|_| D::Error::custom(format!("invalid boolean value: '{}'", s.trim()))),
        other => Err(D::Error::custom(format!(
            "invalid type for boolean: {}",
            other
        ))),
    }
}

fn parse_bool_str(raw: &str) -> Result<Option<bool>, ()> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "y" | "t" => Ok(Some(true)),
        "false" | "0" | "no" | "off" | "n" | "f" => Ok(Some(false)),
        _ => Err(()),
    }
}
