//! # JSON Codec
//!
//! Request bodies are parsed with simd-json; responses are written with
//! serde_json.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Parse JSON bytes to a typed value using simd-json
///
/// simd-json parses in place, so the buffer is clobbered.
///
/// # Errors
///
/// Returns `Error::MalformedBody` if parsing fails
pub fn parse_json_bytes<T: DeserializeOwned>(bytes: &mut [u8]) -> Result<T> {
    simd_json::from_slice(bytes).map_err(|e| Error::MalformedBody {
        reason: e.to_string(),
    })
}

/// Decode a request body
///
/// A zero-length body is an empty JSON object, never null. Whitespace alone
/// is not a JSON document and is rejected like any other malformed body.
///
/// # Errors
///
/// Returns `Error::MalformedBody` if the body is present but not JSON
pub fn parse_body(body: &[u8]) -> Result<Value> {
    if body.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let mut bytes = body.to_vec();
    parse_json_bytes(&mut bytes)
}

/// Serialize a value to JSON string
///
/// # Errors
///
/// Returns `Error::Json` if the value cannot be represented as JSON
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}
