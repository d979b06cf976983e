//! Reply payload helpers.
//!
//! File contents travel as base64 text inside XML-RPC string values, and
//! every ETB method answers with a single XML-RPC value whose type depends
//! on the method. These helpers do both conversions and report a
//! [`DecodeError`] when the shape is wrong.

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use xmlrpc::Value;

use crate::error::DecodeError;

/// Encode file bytes for `put_file`.
pub fn encode_file(content: &[u8]) -> String {
    BASE64_STANDARD.encode(content)
}

/// Decode a `get_file` reply into file bytes.
///
/// Whitespace is ignored, since some servers wrap long base64 lines. The
/// returned buffer has exactly the decoded length, embedded NUL bytes
/// included.
pub fn decode_file(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    Ok(BASE64_STANDARD.decode(compact)?)
}

fn unexpected(method: &'static str, expected: &'static str, value: &Value) -> DecodeError {
    DecodeError::UnexpectedReply {
        method,
        expected,
        found: format!("{:?}", value),
    }
}

/// Extract a string reply.
pub fn expect_string(method: &'static str, value: Value) -> Result<String, DecodeError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(unexpected(method, "string", &other)),
    }
}

/// Extract a boolean reply.
pub fn expect_bool(method: &'static str, value: Value) -> Result<bool, DecodeError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(unexpected(method, "boolean", &other)),
    }
}

/// Extract the JSON text of a result reply.
///
/// The ETB server answers an unknown query id with an empty XML-RPC array
/// instead of JSON text; that is read as an empty JSON array.
pub fn expect_json_text(method: &'static str, value: Value) -> Result<String, DecodeError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Array(items) if items.is_empty() => Ok("[]".to_string()),
        other => Err(unexpected(method, "JSON string", &other)),
    }
}
