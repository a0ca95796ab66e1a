//! File-backed document store.
//!
//! Layout of a data directory:
//! - `users.snapshot.json`: snapshot of every user document
//! - `users.jsonl`: journal of events since the snapshot
//! - `store.lock`: held exclusively while a store is open
//!
//! Opening replays the journal over the snapshot. [`JsonlStore::compact`]
//! folds the journal back into a fresh snapshot.

use crate::journal::{self, Journal, StoreEvent};
use crate::snapshot::Snapshot;
use crate::store::{Documents, Pushed, UserStore};
use crate::{Error, Exercise, Result, User, UserSummary};
use async_trait::async_trait;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

pub const JOURNAL_FILE: &str = "users.jsonl";
pub const SNAPSHOT_FILE: &str = "users.snapshot.json";
pub const LOCK_FILE: &str = "store.lock";

/// JSONL journal + snapshot store
#[derive(Clone)]
pub struct JsonlStore {
    shared: Arc<Shared>,
}

struct Shared {
    dir: PathBuf,
    docs: RwLock<Documents>,
    /// Serializes journal writes; also owns the directory lock
    writer: Mutex<Writer>,
}

struct Writer {
    journal: Journal,
    _lock: File,
}

impl JsonlStore {
    /// Open (or create) the store in `dir`
    ///
    /// Fails if another process already holds the directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .open(dir.join(LOCK_FILE))?;
        lock.try_lock_exclusive().map_err(|_| {
            Error::Persistence(format!(
                "data directory {} is in use by another process",
                dir.display()
            ))
        })?;

        let snapshot = Snapshot::load(&dir.join(SNAPSHOT_FILE))?;
        let mut docs = Documents::from_users(snapshot.users);
        let journal = Journal::new(dir.join(JOURNAL_FILE));
        let events = journal::read_events(journal.path())?;
        let replayed = events.len();
        for event in events {
            docs.apply(event);
        }

        tracing::info!(
            "Opened store at {:?}: {} users, {} journal events replayed",
            dir,
            docs.len(),
            replayed
        );

        Ok(Self {
            shared: Arc::new(Shared {
                dir,
                docs: RwLock::new(docs),
                writer: Mutex::new(Writer {
                    journal,
                    _lock: lock,
                }),
            }),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.shared.dir
    }

    /// Fold the journal into a new snapshot and archive it
    ///
    /// Returns the number of users in the snapshot.
    pub fn compact(&self) -> Result<usize> {
        self.shared.compact()
    }

    async fn run_blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Shared) -> Result<T> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || f(&shared))
            .await
            .map_err(|e| Error::Persistence(format!("store task failed: {}", e)))?
    }
}

impl Shared {
    fn read(&self) -> Result<RwLockReadGuard<'_, Documents>> {
        self.docs
            .read()
            .map_err(|_| Error::Persistence("store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Documents>> {
        self.docs
            .write()
            .map_err(|_| Error::Persistence("store lock poisoned".into()))
    }

    fn writer(&self) -> Result<std::sync::MutexGuard<'_, Writer>> {
        self.writer
            .lock()
            .map_err(|_| Error::Persistence("journal lock poisoned".into()))
    }

    fn insert_user(&self, user: User) -> Result<User> {
        let writer = self.writer()?;
        if self.read()?.get(user.id).is_some() {
            return Err(Error::Persistence(format!("duplicate user id {}", user.id)));
        }

        writer
            .journal
            .append(&StoreEvent::UserCreated { user: user.clone() })?;
        self.write()?.insert(user.clone());
        Ok(user)
    }

    fn push_exercise(&self, user_id: Uuid, exercise: Exercise) -> Result<Option<UserSummary>> {
        let writer = self.writer()?;
        if self.read()?.get(user_id).is_none() {
            return Ok(None);
        }

        writer.journal.append(&StoreEvent::ExerciseAppended {
            user_id,
            exercise: exercise.clone(),
        })?;

        match self.write()?.push_exercise(user_id, exercise) {
            Pushed::Appended(owner) => Ok(Some(owner)),
            Pushed::UnknownUser => Ok(None),
            Pushed::Duplicate => Err(Error::Persistence("duplicate exercise id".into())),
        }
    }

    fn compact(&self) -> Result<usize> {
        let writer = self.writer()?;
        let snapshot = Snapshot {
            users: self.read()?.users().to_vec(),
        };

        snapshot.save(&self.dir.join(SNAPSHOT_FILE))?;
        writer.journal.archive()?;
        journal::cleanup_processed(&self.dir)?;

        tracing::info!("Compacted store: {} users in snapshot", snapshot.users.len());
        Ok(snapshot.users.len())
    }
}

#[async_trait]
impl UserStore for JsonlStore {
    async fn insert_user(&self, user: User) -> Result<User> {
        self.run_blocking(move |shared| shared.insert_user(user)).await
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>> {
        Ok(self.shared.read()?.summaries())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.shared.read()?.get(id).cloned())
    }

    async fn push_exercise(
        &self,
        user_id: Uuid,
        exercise: Exercise,
    ) -> Result<Option<UserSummary>> {
        self.run_blocking(move |shared| shared.push_exercise(user_id, exercise))
            .await
    }
}
