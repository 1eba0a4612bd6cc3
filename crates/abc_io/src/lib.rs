//! # ABC IO
//!
//! I/O layer for the ABC simulator.
//!
//! This crate provides:
//! - Structured error handling with [`IoError`]
//! - JSON and hex serialization helpers
//! - A JSONL evolution-event log
//! - Session export and import in the signed `.sip` format

/// Error types and result aliases for I/O operations
pub mod error;
/// Signed session snapshots (`.sip`)
pub mod export;
/// Append-only JSONL log of evolution events
pub mod history;
/// Validated serialization helpers for JSON and hex formats
pub mod serialization;

pub use error::{IoError, Result};
pub use export::{decode_sip, encode_sip, read_sip, write_sip, SessionExport, SessionPayload};
pub use history::{EventLog, LogRecord};
pub use serialization::{
    from_hex, from_json, read_json_file, to_hex, to_json, to_json_pretty, write_json_file,
};
