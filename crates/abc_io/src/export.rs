//! Session snapshots in the `.sip` format.
//!
//! A `.sip` file is the hex encoding of a [`SessionExport`] JSON document,
//! optionally gzip-compressed when the file name ends in `.gz`. The payload
//! is signed with its SHA-256 digest and verified on decode.

use crate::error::{IoError, Result};
use crate::serialization::{from_hex, to_hex, to_json};
use abc_core::config::SimulationParameters;
use abc_core::stats::MetricsSnapshot;
use abc_data::AgentState;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::path::Path;
use uuid::Uuid;

pub const SIP_VERSION: &str = "3.0";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionPayload {
    pub parameters: SimulationParameters,
    pub metrics: MetricsSnapshot,
    pub agents: Vec<AgentState>,
    pub user_deduction: String,
    /// Most recent engine log lines, oldest first.
    #[serde(default)]
    pub evolution_log: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionExport {
    pub version: String,
    pub session_id: Uuid,
    pub timestamp: String,
    pub payload: SessionPayload,
    /// Hex SHA-256 of the payload's compact JSON.
    pub signature: String,
}

impl SessionExport {
    /// Stamps and signs a payload. Fails on parameters JSON cannot carry.
    pub fn new(payload: SessionPayload) -> Result<Self> {
        if !payload.parameters.all_finite() {
            return Err(IoError::NonFinite);
        }
        let signature = sign(&payload)?;
        Ok(Self {
            version: SIP_VERSION.to_string(),
            session_id: Uuid::new_v4(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            payload,
            signature,
        })
    }

    pub fn verify(&self) -> Result<()> {
        if self.version != SIP_VERSION {
            return Err(IoError::Version {
                found: self.version.clone(),
                expected: SIP_VERSION,
            });
        }
        if sign(&self.payload)? != self.signature {
            return Err(IoError::Signature);
        }
        Ok(())
    }

    /// Conventional file name for a session exported on `date`.
    #[must_use]
    pub fn file_name(date: chrono::NaiveDate) -> String {
        format!("ABC_DATA_{}.sip", date.format("%Y-%m-%d"))
    }
}

fn sign(payload: &SessionPayload) -> Result<String> {
    let json = to_json(payload)?;
    Ok(hex::encode(Sha256::digest(json.as_bytes())))
}

pub fn encode_sip(export: &SessionExport) -> Result<String> {
    to_hex(export)
}

pub fn decode_sip(text: &str) -> Result<SessionExport> {
    let export: SessionExport = from_hex(text)?;
    export.verify()?;
    Ok(export)
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

pub fn write_sip<P: AsRef<Path>>(path: P, export: &SessionExport) -> Result<()> {
    let path = path.as_ref();
    let encoded = encode_sip(export)?;

    if is_gzip_path(path) {
        let file = std::fs::File::create(path).map_err(|e| IoError::at(path, e))?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        let gzip = |e: std::io::Error| {
            IoError::Gzip(e.to_string()).with_context(path.display().to_string())
        };
        encoder.write_all(encoded.as_bytes()).map_err(gzip)?;
        encoder.finish().map_err(gzip)?;
    } else {
        std::fs::write(path, encoded).map_err(|e| IoError::at(path, e))?;
    }
    tracing::info!(path = ?path, session = %export.session_id, "Session exported");
    Ok(())
}

pub fn read_sip<P: AsRef<Path>>(path: P) -> Result<SessionExport> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::Missing(path.to_path_buf()));
    }

    let text = if is_gzip_path(path) {
        let file = std::fs::File::open(path).map_err(|e| IoError::at(path, e))?;
        let mut decoded = String::new();
        GzDecoder::new(file)
            .read_to_string(&mut decoded)
            .map_err(|e| IoError::Gzip(e.to_string()).with_context(path.display().to_string()))?;
        decoded
    } else {
        std::fs::read_to_string(path).map_err(|e| IoError::at(path, e))?
    };
    decode_sip(&text).map_err(|e| e.with_context(path.display().to_string()))
}
