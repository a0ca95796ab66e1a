//! Record store abstraction.
//!
//! A store holds user documents with their embedded exercise lists. The
//! service talks to it through [`UserStore`]; exercises are pushed onto a
//! user in a single store operation so concurrent appends never overwrite
//! each other.

use crate::journal::StoreEvent;
use crate::{Error, Exercise, Result, User, UserSummary};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Storage contract used by the data access layer
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user document
    async fn insert_user(&self, user: User) -> Result<User>;

    /// All users projected to id and username, in store order
    async fn list_users(&self) -> Result<Vec<UserSummary>>;

    /// Fetch one user with every exercise
    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Append an exercise to a user's list atomically
    ///
    /// Returns the owner's summary, or None if no such user exists.
    async fn push_exercise(&self, user_id: Uuid, exercise: Exercise)
        -> Result<Option<UserSummary>>;
}

/// Outcome of pushing an exercise onto the in-memory documents
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pushed {
    Appended(UserSummary),
    Duplicate,
    UnknownUser,
}

/// In-memory user documents with an id index
///
/// Inserts and pushes are idempotent on ids so that replaying a journal
/// over a snapshot that already contains some of its events is harmless.
#[derive(Clone, Debug, Default)]
pub struct Documents {
    users: Vec<User>,
    index: HashMap<Uuid, usize>,
    exercise_ids: HashSet<Uuid>,
}

impl Documents {
    pub fn from_users(users: Vec<User>) -> Self {
        let mut docs = Self::default();
        for user in users {
            if !docs.insert(user) {
                tracing::warn!("Dropping duplicate user in snapshot");
            }
        }
        docs
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn get(&self, id: Uuid) -> Option<&User> {
        self.index.get(&id).map(|&pos| &self.users[pos])
    }

    pub fn summaries(&self) -> Vec<UserSummary> {
        self.users.iter().map(User::summary).collect()
    }

    /// Insert a user; returns false if the id is already present
    pub fn insert(&mut self, user: User) -> bool {
        if self.index.contains_key(&user.id) {
            return false;
        }
        self.exercise_ids
            .extend(user.exercises.iter().map(|exercise| exercise.id));
        self.index.insert(user.id, self.users.len());
        self.users.push(user);
        true
    }

    pub fn push_exercise(&mut self, user_id: Uuid, exercise: Exercise) -> Pushed {
        let Some(&pos) = self.index.get(&user_id) else {
            return Pushed::UnknownUser;
        };
        if !self.exercise_ids.insert(exercise.id) {
            return Pushed::Duplicate;
        }
        let user = &mut self.users[pos];
        user.exercises.push(exercise);
        Pushed::Appended(user.summary())
    }

    /// Apply a journaled event
    pub fn apply(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::UserCreated { user } => {
                let id = user.id;
                if !self.insert(user) {
                    tracing::debug!("Skipping already applied user {}", id);
                }
            }
            StoreEvent::ExerciseAppended { user_id, exercise } => {
                match self.push_exercise(user_id, exercise) {
                    Pushed::Appended(_) => {}
                    Pushed::Duplicate => {
                        tracing::debug!("Skipping already applied exercise for {}", user_id)
                    }
                    Pushed::UnknownUser => {
                        tracing::warn!("Journal references unknown user {}, skipping", user_id)
                    }
                }
            }
        }
    }
}

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<Documents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

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
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<User> {
        if !self.write()?.insert(user.clone()) {
            return Err(Error::Persistence(format!("duplicate user id {}", user.id)));
        }
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>> {
        Ok(self.read()?.summaries())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn push_exercise(
        &self,
        user_id: Uuid,
        exercise: Exercise,
    ) -> Result<Option<UserSummary>> {
        match self.write()?.push_exercise(user_id, exercise) {
            Pushed::Appended(owner) => Ok(Some(owner)),
            Pushed::UnknownUser => Ok(None),
            Pushed::Duplicate => Err(Error::Persistence("duplicate exercise id".into())),
        }
    }
}
