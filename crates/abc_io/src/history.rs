use crate::error::{IoError, Result};
use abc_core::events::EvolutionEvent;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const LOG_FILE_NAME: &str = "events.jsonl";

/// One line of the event log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub tick: u64,
    /// Wall-clock time the record was written (RFC3339).
    pub timestamp: String,
    pub event: EvolutionEvent,
}

/// Append-only JSONL log. A dummy log accepts events and writes nothing.
pub struct EventLog {
    writer: Option<BufWriter<File>>,
    path: Option<PathBuf>,
}

impl EventLog {
    pub fn new_at<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| IoError::at(dir, e))?;
        }
        let path = dir.join(LOG_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| IoError::at(&path, e))?;
        Ok(Self {
            writer: Some(BufWriter::new(file)),
            path: Some(path),
        })
    }

    #[must_use]
    pub fn new_dummy() -> Self {
        Self {
            writer: None,
            path: None,
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn log_event(&mut self, tick: u64, event: &EvolutionEvent) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        let record = LogRecord {
            tick,
            timestamp: chrono::Utc::now().to_rfc3339(),
            event: event.clone(),
        };
        let json = serde_json::to_string(&record)?;
        writeln!(writer, "{json}")?;
        writer.flush()?;
        Ok(())
    }

    pub fn log_events(&mut self, tick: u64, events: &[EvolutionEvent]) -> Result<()> {
        for event in events {
            self.log_event(tick, event)?;
        }
        Ok(())
    }

    /// Every parseable record in the log; malformed lines are skipped.
    pub fn read_events(&self) -> Result<Vec<LogRecord>> {
        let Some(path) = self.path.as_ref() else {
            return Ok(Vec::new());
        };
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(IoError::at(path, e)),
        };
        Ok(BufReader::new(file)
            .lines()
            .map_while(std::result::Result::ok)
            .filter_map(|line| serde_json::from_str::<LogRecord>(&line).ok())
            .collect())
    }
}
