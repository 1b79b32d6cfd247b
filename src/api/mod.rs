//! HTTP API handlers for castlist

pub mod actors;
pub mod buzz;
pub mod credits;
pub mod health;
pub mod movies;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::ApiError;

/// Decode an optional base64 blob field from a request body
///
/// Absent fields, empty strings, and zero-length payloads all mean "no new
/// blob supplied"; only malformed base64 is an error.
pub(crate) fn decode_blob(field: Option<&str>) -> Result<Option<Vec<u8>>, ApiError> {
    let Some(encoded) = field else {
        return Ok(None);
    };
    if encoded.is_empty() {
        return Ok(None);
    }

    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| ApiError::BadRequest(format!("invalid base64 blob: {}", e)))?;

    Ok(if bytes.is_empty() { None } else { Some(bytes) })
}
