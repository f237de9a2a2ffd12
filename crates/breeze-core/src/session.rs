//! Durable session persistence.
//!
//! The whole session model is one slot holding the authenticated user's id.
//! There are no tokens and no expiry; possession of a stored id is what
//! "signed in" means, and the server re-scopes every query by the id sent
//! with it.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::UserId;

/// Durable store for the single signed-in-user slot.
///
/// `load` keeps "no session" (`Ok(None)`) apart from a broken storage layer
/// (`Err(Storage)`): callers route both to the login screen, but the two are
/// logged differently.
pub trait SessionStore {
    /// Persist the identifier, overwriting any previous value.
    fn save(&self, user_id: &UserId) -> Result<()>;

    /// Load the persisted identifier, `None` when no session exists.
    fn load(&self) -> Result<Option<UserId>>;

    /// Delete the persisted identifier. Clearing an absent session succeeds.
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    user_id: UserId,
}

/// Session store backed by a small JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Where the slot lives on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, user_id: &UserId) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(storage_error)?;
        }
        let serialized = serde_json::to_string(&StoredSession {
            user_id: user_id.clone(),
        })?;
        fs::write(&self.path, serialized).map_err(storage_error)
    }

    fn load(&self) -> Result<Option<UserId>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(storage_error(error)),
        };
        let stored: StoredSession = serde_json::from_str(&raw)
            .map_err(|error| Error::Storage(format!("corrupt session file: {error}")))?;
        Ok(Some(stored.user_id))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(storage_error(error)),
        }
    }
}

fn storage_error(error: std::io::Error) -> Error {
    Error::Storage(error.to_string())
}

/// In-memory session store for tests and embedders without a filesystem.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<Mutex<Option<UserId>>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<UserId>>> {
        self.slot
            .lock()
            .map_err(|_| Error::Storage("session slot poisoned".to_string()))
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, user_id: &UserId) -> Result<()> {
        *self.lock()? = Some(user_id.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<UserId>> {
        Ok(self.lock()?.clone())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}
