//! Response envelope handling.
//!
//! The API wraps lists and single resources under keys that differ per
//! endpoint (`groups`, `events`, `data`, `event`, `poll`, ...). Each
//! endpoint gets an ordered list of keys to try; the first match wins and
//! a miss degrades to an empty list or the untouched payload.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

pub const GROUP_LIST_KEYS: &[&str] = &["groups", "data"];
pub const GROUP_KEYS: &[&str] = &["group"];
pub const TOPIC_LIST_KEYS: &[&str] = &["topics", "data"];
pub const EVENT_LIST_KEYS: &[&str] = &["events", "data"];
pub const EVENT_KEYS: &[&str] = &["event"];
pub const POLL_KEYS: &[&str] = &["poll", "event"];
pub const KARMA_LIST_KEYS: &[&str] = &["karma", "entries", "data"];

/// Return the payload itself when it is an array, otherwise the first
/// candidate key holding an array, otherwise an empty slice.
pub fn extract_list<'a>(payload: &'a Value, keys: &[&str]) -> &'a [Value] {
    if let Value::Array(items) = payload {
        return items;
    }

    if let Value::Object(map) = payload {
        for key in keys {
            if let Some(Value::Array(items)) = map.get(*key) {
                return items;
            }
        }
    }

    &[]
}

/// Return the first candidate key holding an object. Non-objects, and
/// objects with no matching key, come back unchanged.
pub fn extract_resource<'a>(payload: &'a Value, keys: &[&str]) -> &'a Value {
    let Value::Object(map) = payload else {
        return payload;
    };

    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|candidate| candidate.is_object())
        .unwrap_or(payload)
}

/// Extract a list once and decode every entry. The extracted entries come
/// back as a JSON array next to the typed values.
pub fn decode_list<T: DeserializeOwned>(payload: &Value, keys: &[&str]) -> Result<(Value, Vec<T>)> {
    let items = extract_list(payload, keys);
    let data = items
        .iter()
        .map(|item| Ok(T::deserialize(item)?))
        .collect::<Result<Vec<T>>>()?;
    Ok((Value::Array(items.to_vec()), data))
}

/// Extract a single resource once and decode it, keeping the extracted JSON.
pub fn decode_resource<T: DeserializeOwned>(payload: &Value, keys: &[&str]) -> Result<(Value, T)> {
    let raw = extract_resource(payload, keys).clone();
    let data = T::deserialize(&raw)?;
    Ok((raw, data))
}
