//! Lenient boolean flags.
//!
//! The QuickShop backend encodes flags as `0`/`1`, `"0"`/`"1"`, or real JSON
//! booleans depending on the endpoint. These helpers accept all of them.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl RawFlag {
    fn truthy(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Int(n) => n != 0,
            Self::Text(s) => matches!(s.trim(), "1" | "true" | "yes"),
        }
    }
}

/// Deserialize a required flag.
///
/// # Errors
///
/// Returns an error if the value is not a boolean, integer, or string.
pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    RawFlag::deserialize(deserializer).map(RawFlag::truthy)
}

/// Deserialize an optional flag, treating `null` as absent.
///
/// # Errors
///
/// Returns an error if a present value is not a boolean, integer, or string.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawFlag>::deserialize(deserializer).map(|raw| raw.map(RawFlag::truthy))
}
