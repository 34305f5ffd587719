//! Exercise store contract and implementations.
//!
//! The store owns users and their exercise histories. Every read hands out
//! an owned snapshot, so callers can filter without holding any lock.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::{Error, Exercise, Registration, Result, User, UserId, Username};

pub use crate::file_store::FileStore;

/// Persistence for users and their exercises
pub trait ExerciseStore: Send + Sync {
    /// All users in registration order
    fn list_users(&self) -> Result<Vec<User>>;

    fn find_user(&self, id: &UserId) -> Result<Option<User>>;

    fn find_by_username(&self, username: &Username) -> Result<Option<User>>;

    /// Return the user holding `username`, creating it if none exists
    ///
    /// Implementations must make the lookup and the insert atomic so a
    /// username is never registered twice.
    fn find_or_create_user(&self, username: Username) -> Result<Registration>;

    /// Append an exercise to a user's history
    ///
    /// Returns the updated user, or `None` if no user has this id.
    fn append_exercise(&self, id: &UserId, exercise: Exercise) -> Result<Option<User>>;

    /// Release any resources held by the store
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Where a store keeps its data, parsed from a connection string
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreUrl {
    /// `memory:` - process-local, lost on exit
    Memory,
    /// `file:<path>` or a bare path - a single JSON document
    File(PathBuf),
}

impl StoreUrl {
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::Config("store url is empty".into()));
        }
        if url == "memory" || url == "memory:" {
            return Ok(StoreUrl::Memory);
        }
        let path = url
            .strip_prefix("file://")
            .or_else(|| url.strip_prefix("file:"))
            .unwrap_or(url);
        if path.is_empty() {
            return Err(Error::Config(format!("store url '{url}' has no path")));
        }
        Ok(StoreUrl::File(PathBuf::from(path)))
    }
}

/// Open the store described by a connection string
pub fn open_store(url: &str) -> Result<Arc<dyn ExerciseStore>> {
    match StoreUrl::parse(url)? {
        StoreUrl::Memory => {
            tracing::info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreUrl::File(path) => {
            let store = FileStore::open(&path)?;
            tracing::info!("Using file store at {:?}", path);
            Ok(Arc::new(store))
        }
    }
}

/// In-memory store guarded by a read-write lock
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<User>>> {
        self.users
            .read()
            .map_err(|_| Error::Store("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<User>>> {
        self.users
            .write()
            .map_err(|_| Error::Store("memory store lock poisoned".into()))
    }
}

impl ExerciseStore for MemoryStore {
    fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.read()?.clone())
    }

    fn find_user(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.read()?.iter().find(|u| &u.id == id).cloned())
    }

    fn find_by_username(&self, username: &Username) -> Result<Option<User>> {
        Ok(self
            .read()?
            .iter()
            .find(|u| &u.username == username)
            .cloned())
    }

    fn find_or_create_user(&self, username: Username) -> Result<Registration> {
        let mut users = self.write()?;
        Ok(register_in(&mut users, username))
    }

    fn append_exercise(&self, id: &UserId, exercise: Exercise) -> Result<Option<User>> {
        let mut users = self.write()?;
        Ok(append_in(&mut users, id, exercise))
    }
}

/// Find-or-create over a user list; shared by every store implementation
pub(crate) fn register_in(users: &mut Vec<User>, username: Username) -> Registration {
    if let Some(existing) = users.iter().find(|u| u.username == username) {
        return Registration {
            user: existing.clone(),
            created: false,
        };
    }

    let id = loop {
        let candidate = UserId::generate();
        if users.iter().all(|u| u.id != candidate) {
            break candidate;
        }
    };
    let user = User::new(id, username);
    users.push(user.clone());
    tracing::debug!("Registered user {} as {}", user.username, user.id);
    Registration {
        user,
        created: true,
    }
}

/// Append to the matching user's history; shared by every store implementation
pub(crate) fn append_in(users: &mut [User], id: &UserId, exercise: Exercise) -> Option<User> {
    let user = users.iter_mut().find(|u| &u.id == id)?;
    user.exercises.push(exercise);
    tracing::debug!(
        "Appended exercise to {} ({} total)",
        user.id,
        user.exercises.len()
    );
    Some(user.clone())
}
