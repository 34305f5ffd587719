//! JSON document store with file locking.
//!
//! All users live in one JSON document. Reads take a shared lock and writes
//! an exclusive lock on a sidecar `.lock` file, so each load-modify-save
//! cycle is serialized across threads and processes. Saves are atomic:
//! the document is written to a temp file in the same directory, synced,
//! then renamed over the original.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::store::{append_in, register_in, ExerciseStore};
use crate::{Error, Exercise, Registration, Result, User, UserId, Username};

/// On-disk document shape
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    users: Vec<User>,
}

/// Store backed by a single JSON file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileStore {
    /// Open a store at `path`, creating its directory if needed
    ///
    /// The document itself is created on first write. An existing document
    /// is parsed once here so corruption surfaces at startup.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent)?;

        let mut lock_name = path.as_os_str().to_os_string();
        lock_name.push(".lock");
        let store = Self {
            lock_path: PathBuf::from(lock_name),
            path,
        };

        let users = store.read(|doc| doc.users.len())?;
        tracing::debug!("Opened store {:?} with {} users", store.path, users);
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_file(&self) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        Ok(file)
    }

    /// Load the document; a missing file is an empty store
    fn load(&self) -> Result<StoreDocument> {
        if !self.path.exists() {
            return Ok(StoreDocument::default());
        }
        let file = File::open(&self.path)?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            Error::Store(format!("failed to parse {:?}: {}", self.path, e))
        })
    }

    fn save(&self, doc: &StoreDocument) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let temp = NamedTempFile::new_in(parent)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, doc)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    /// Run `f` against the document under a shared lock
    fn read<T>(&self, f: impl FnOnce(&StoreDocument) -> T) -> Result<T> {
        let lock = self.lock_file()?;
        lock.lock_shared()?;
        let result = self.load().map(|doc| f(&doc));
        release(&lock, result)
    }

    /// Load and modify the document under an exclusive lock
    ///
    /// `f` returns its value and whether the document changed; unchanged
    /// documents are not rewritten.
    fn update<T>(&self, f: impl FnOnce(&mut StoreDocument) -> (T, bool)) -> Result<T> {
        let lock = self.lock_file()?;
        lock.lock_exclusive()?;
        let result = self.load().and_then(|mut doc| {
            let (value, changed) = f(&mut doc);
            if changed {
                self.save(&doc)?;
            }
            Ok(value)
        });
        release(&lock, result)
    }
}

/// Unlock, reporting the operation's own error ahead of an unlock failure
fn release<T>(lock: &File, result: Result<T>) -> Result<T> {
    let unlocked = FileExt::unlock(lock);
    let value = result?;
    unlocked?;
    Ok(value)
}

impl ExerciseStore for FileStore {
    fn list_users(&self) -> Result<Vec<User>> {
        self.read(|doc| doc.users.clone())
    }

    fn find_user(&self, id: &UserId) -> Result<Option<User>> {
        self.read(|doc| doc.users.iter().find(|u| &u.id == id).cloned())
    }

    fn find_by_username(&self, username: &Username) -> Result<Option<User>> {
        self.read(|doc| doc.users.iter().find(|u| &u.username == username).cloned())
    }

    fn find_or_create_user(&self, username: Username) -> Result<Registration> {
        self.update(|doc| {
            let registration = register_in(&mut doc.users, username);
            let created = registration.created;
            (registration, created)
        })
    }

    fn append_exercise(&self, id: &UserId, exercise: Exercise) -> Result<Option<User>> {
        self.update(|doc| {
            let user = append_in(&mut doc.users, id, exercise);
            let changed = user.is_some();
            (user, changed)
        })
    }

    fn close(&self) -> Result<()> {
        tracing::debug!("Closed store {:?}", self.path);
        Ok(())
    }
}
