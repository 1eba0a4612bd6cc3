//! JSON and hex helpers shared by the event log and session export.

use crate::error::{IoError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Parses JSON. Blank input is an encoding error rather than an EOF error.
pub fn from_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    if text.trim().is_empty() {
        return Err(IoError::encoding("blank JSON document"));
    }
    Ok(serde_json::from_str(text)?)
}

/// Lowercase hex of the compact JSON form.
pub fn to_hex<T: Serialize>(value: &T) -> Result<String> {
    to_json(value).map(hex::encode)
}

pub fn from_hex<T: DeserializeOwned>(text: &str) -> Result<T> {
    let digits = text.trim();
    if digits.is_empty() {
        return Err(IoError::encoding("blank hex document"));
    }
    let bytes = hex::decode(digits).map_err(|e| IoError::encoding(e.to_string()))?;
    let json = std::str::from_utf8(&bytes).map_err(|e| IoError::encoding(e.to_string()))?;
    from_json(json)
}

pub fn write_json_file<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, to_json_pretty(value)?).map_err(|e| IoError::at(path, e))
}

pub fn read_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| IoError::at(path, e))?;
    from_json(&text).map_err(|e| e.with_context(path.display().to_string()))
}
