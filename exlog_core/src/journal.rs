//! Append-only journal of store events.
//!
//! Every mutation of the document store is appended to a JSONL (JSON Lines)
//! file as a single event, with file locking for safe concurrent access.

use crate::{Exercise, Result, User};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A single journaled mutation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreEvent {
    UserCreated { user: User },
    ExerciseAppended { user_id: Uuid, exercise: Exercise },
}

/// JSONL journal writer with file locking
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    /// Create a journal for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append one event as a single line and sync it to disk
    ///
    /// A torn tail left by an interrupted write is terminated first, so the
    /// new event always lands on a line of its own.
    pub fn append(&self, event: &StoreEvent) -> Result<()> {
        self.ensure_parent_dir()?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut line = String::new();
        if ends_mid_line(&mut file)? {
            tracing::warn!("Journal {:?} ends in a partial line, terminating it", self.path);
            line.push('\n');
        }
        line.push_str(&serde_json::to_string(event)?);
        line.push('\n');

        let mut writer = std::io::BufWriter::new(&file);
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        drop(writer);
        file.sync_data()?;

        file.unlock()?;

        tracing::debug!("Appended {} event to journal", event.op_name());
        Ok(())
    }

    /// Move the journal aside as `<name>.processed` once it is folded into a snapshot
    ///
    /// Returns false if there was no journal to archive.
    pub fn archive(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let processed_path = processed_path(&self.path);
        std::fs::rename(&self.path, &processed_path)?;
        tracing::info!("Archived journal to {:?}", processed_path);
        Ok(true)
    }
}

impl StoreEvent {
    fn op_name(&self) -> &'static str {
        match self {
            StoreEvent::UserCreated { .. } => "user_created",
            StoreEvent::ExerciseAppended { .. } => "exercise_appended",
        }
    }
}

/// True if the file is non-empty and its last byte is not a newline
fn ends_mid_line(file: &mut File) -> Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

fn processed_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".processed");
    PathBuf::from(name)
}

/// Read all events from a journal file
///
/// Lines that fail to parse are logged and skipped.
pub fn read_events(path: &Path) -> Result<Vec<StoreEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut events = Vec::new();

    for (line_num, line_result) in reader.split(b'\n').enumerate() {
        let line = line_result?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<StoreEvent>(&line) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!("Failed to parse journal event at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} events from journal", events.len());
    Ok(events)
}

/// Remove archived `.processed` journals in a directory
pub fn cleanup_processed(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed journal: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed journal files", count);
    }

    Ok(count)
}
