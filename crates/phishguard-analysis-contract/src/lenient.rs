//! Tolerant decoders for optional response sections.
//!
//! A section that is `null`, of the wrong shape, or holds malformed entries
//! decodes as empty instead of failing the whole response.

use std::any::type_name;
use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

fn decode_entry<T: DeserializeOwned>(value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(entry) => Some(entry),
        Err(error) => {
            debug!(entry = type_name::<T>(), %error, "dropping malformed response entry");
            None
        }
    }
}

/// `null` or a malformed value reads as `None`.
pub(crate) fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => Ok(decode_entry(value)),
    }
}

/// Keeps the well-formed entries of an array; anything else reads as empty.
pub(crate) fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items.into_iter().filter_map(decode_entry).collect()),
        Value::Null => Ok(Vec::new()),
        other => {
            debug!(entry = type_name::<T>(), found = %other, "expected an array, ignoring section");
            Ok(Vec::new())
        }
    }
}

/// Keeps the well-formed entries of an object; anything else reads as empty.
pub(crate) fn map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Object(entries) => Ok(entries
            .into_iter()
            .filter_map(|(key, value)| decode_entry(value).map(|entry| (key, entry)))
            .collect()),
        Value::Null => Ok(BTreeMap::new()),
        other => {
            debug!(entry = type_name::<T>(), found = %other, "expected an object, ignoring section");
            Ok(BTreeMap::new())
        }
    }
}
