//! Point-in-time snapshot of every user document.
//!
//! The snapshot is the base the journal is replayed on top of. It is
//! replaced atomically and never partially written.

use crate::{Error, Result, User};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// All user documents in store order
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<User>,
}

impl Snapshot {
    /// Load a snapshot with shared locking
    ///
    /// Returns an empty snapshot if the file doesn't exist. A snapshot that
    /// exists but cannot be parsed is an error: starting empty would hide
    /// every user it holds.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No snapshot found at {:?}, starting empty", path);
            return Ok(Self::default());
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let snapshot = serde_json::from_str::<Snapshot>(&contents).map_err(|e| {
            Error::Persistence(format!("corrupted snapshot {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            "Loaded snapshot with {} users from {:?}",
            snapshot.users.len(),
            path
        );
        Ok(snapshot)
    }

    /// Save the snapshot atomically
    ///
    /// Writes to a temp file in the same directory, syncs it to disk, then
    /// renames it over the original.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            Error::Persistence(format!("snapshot path {} has no parent", path.display()))
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, self)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved snapshot with {} users to {:?}", self.users.len(), path);
        Ok(())
    }
}
