//! Audit Journal - append-only JSONL record of published outcomes
//!
//! Delivery-side only: the store remains the source of truth, the journal
//! is a chronological trail of what was announced.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{BusError, BusResult};
use crate::event::ModerationEvent;
use crate::subscriber::EventSubscriber;

/// Append-only JSONL journal of moderation events
///
/// Each line is one JSON-serialized [`ModerationEvent`].
pub struct AuditJournal {
    path: PathBuf,
    file: Mutex<File>,
}

impl AuditJournal {
    /// Open (or create) the journal at the given path
    pub fn open(path: impl AsRef<Path>) -> BusResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Append one event as a single line
    pub fn append(&self, event: &ModerationEvent) -> BusResult<()> {
        let json = serde_json::to_string(event)?;
        let mut file = self
            .file
            .lock()
            .map_err(|_| BusError::JournalUnavailable("journal lock poisoned".to_string()))?;
        writeln!(file, "{}", json)?;
        file.flush()?;
        Ok(())
    }

    /// Read all events back in append order
    pub fn read_all(&self) -> BusResult<Vec<ModerationEvent>> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut events = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            events.push(serde_json::from_str(&line)?);
        }

        Ok(events)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EventSubscriber for AuditJournal {
    fn name(&self) -> &str {
        "audit-journal"
    }

    async fn handle(&self, event: &ModerationEvent) -> Result<(), BusError> {
        self.append(event)
    }
}
