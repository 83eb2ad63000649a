//! Security event records and the append-only sink they go to.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    LoginSucceeded,
    LoginFailed,
    RateLimited,
    TokenRevoked,
    MissingUserAgent,
}

/// One record per decision point. Write-once: records are never rewritten.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub time: DateTime<Utc>,
    pub event: EventKind,
    pub ip: Option<String>,
    pub user: Option<String>,
}

impl SecurityEvent {
    #[must_use]
    pub fn new(event: EventKind, ip: Option<&str>, user: Option<&str>) -> Self {
        Self {
            time: Utc::now(),
            event,
            ip: ip.map(str::to_string),
            user: user.map(str::to_string),
        }
    }
}

pub trait EventSink: Send + Sync {
    /// Append one record.
    /// # Errors
    /// Returns an error if the record cannot be persisted; the caller treats
    /// that as fatal for the operation in flight.
    fn record(&self, event: &SecurityEvent) -> Result<()>;

    /// Read back everything recorded so far, oldest first.
    /// # Errors
    /// Returns an error if stored records cannot be read or parsed.
    fn events(&self) -> Result<Vec<SecurityEvent>>;
}

/// JSON-lines file sink, one record per line.
#[derive(Debug)]
pub struct FileEventSink {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileEventSink {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            guard: Mutex::new(()),
        }
    }
}

impl EventSink for FileEventSink {
    fn record(&self, event: &SecurityEvent) -> Result<()> {
        let _guard = match self.guard.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open event log {}", self.path.display()))?;
        let line = serde_json::to_string(event)?;
        writeln!(file, "{line}")
            .with_context(|| format!("failed to append to event log {}", self.path.display()))?;
        Ok(())
    }

    fn events(&self) -> Result<Vec<SecurityEvent>> {
        let _guard = match self.guard.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            // Nothing recorded yet.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to open event log {}", self.path.display())
                });
            }
        };
        let mut events = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            events.push(serde_json::from_str(&line)?);
        }
        Ok(events)
    }
}

/// In-memory sink, used in tests and when no log file is configured.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<SecurityEvent>>,
}

impl MemoryEventSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for MemoryEventSink {
    fn record(&self, event: &SecurityEvent) -> Result<()> {
        let mut events = match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event.clone());
        Ok(())
    }

    fn events(&self) -> Result<Vec<SecurityEvent>> {
        let events = match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(events.clone())
    }
}
