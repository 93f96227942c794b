//! Credential persistence.
//!
//! A [`CredentialStore`] is a small key-value store that survives restarts.
//! [`CredentialSession`] layers the auth record on top of it: the bearer
//! token and the cached user profile, always written and cleared together.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use bookstore_core::{AuthResponse, User};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Keys used in the credential store.
pub mod keys {
    /// Bearer token for the `Authorization` header.
    pub const TOKEN: &str = "token";

    /// JSON-serialized [`User`](bookstore_core::User) profile.
    pub const USER: &str = "user";
}

/// Errors from a credential store backend.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Corrupt credential file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize user profile: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable key-value storage for auth state.
///
/// Backends only need `get`, `set` and `remove`; the batch methods default to
/// looping and should be overridden when the backend can apply them in one
/// write.
pub trait CredentialStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError>;

    /// Delete a value. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), CredentialError>;

    /// Write several values.
    ///
    /// # Errors
    ///
    /// Returns the first backend error.
    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), CredentialError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Delete several values.
    ///
    /// # Errors
    ///
    /// Returns the first backend error.
    fn remove_all(&self, keys: &[&str]) -> Result<(), CredentialError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Process-local store, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CredentialError> {
        self.entries().remove(key);
        Ok(())
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), CredentialError> {
        let mut map = self.entries();
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), CredentialError> {
        let mut map = self.entries();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

// =============================================================================
// File-backed store
// =============================================================================

/// Store persisted as a JSON object in a single file.
///
/// Every operation re-reads the file, so separate processes sharing the file
/// see each other's writes. Writes go to a sibling temp file that is renamed
/// over the original.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| CredentialError::Corrupt {
                    path: self.path.clone(),
                    source,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(CredentialError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        let io_err = |source| CredentialError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }

    fn update(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), CredentialError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read()?;
        if apply(&mut entries) {
            self.write(&entries)?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.set_all(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<(), CredentialError> {
        self.remove_all(&[key])
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), CredentialError> {
        self.update(|map| {
            for (key, value) in entries {
                map.insert((*key).to_string(), (*value).to_string());
            }
            true
        })
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), CredentialError> {
        self.update(|map| {
            let mut changed = false;
            for key in keys {
                changed |= map.remove(*key).is_some();
            }
            changed
        })
    }
}

// =============================================================================
// Auth record
// =============================================================================

/// The token + user pair kept in a [`CredentialStore`].
///
/// Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct CredentialSession {
    store: Arc<dyn CredentialStore>,
}

impl std::fmt::Debug for CredentialSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSession").finish_non_exhaustive()
    }
}

impl CredentialSession {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// The stored bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn token(&self) -> Result<Option<SecretString>, CredentialError> {
        Ok(self
            .store
            .get(keys::TOKEN)?
            .filter(|t| !t.is_empty())
            .map(SecretString::from))
    }

    /// The cached user profile.
    ///
    /// A profile that fails to parse invalidates the whole record: token and
    /// user are both removed and `None` is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or cleared.
    pub fn user(&self) -> Result<Option<User>, CredentialError> {
        if self.token()?.is_none() {
            return Ok(None);
        }
        let Some(raw) = self.store.get(keys::USER)? else {
            return Ok(None);
        };
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable cached user profile");
                self.clear()?;
                Ok(None)
            }
        }
    }

    /// Whether both a token and a readable profile are stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn is_authenticated(&self) -> Result<bool, CredentialError> {
        Ok(self.user()?.is_some())
    }

    /// Persist a token and profile as one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be serialized or the store
    /// cannot be written.
    pub fn save(&self, token: &SecretString, user: &User) -> Result<(), CredentialError> {
        let user_json = serde_json::to_string(user)?;
        self.store.set_all(&[
            (keys::TOKEN, token.expose_secret()),
            (keys::USER, &user_json),
        ])
    }

    /// Persist the record from a login or signup response.
    ///
    /// # Errors
    ///
    /// See [`save`](Self::save).
    pub fn save_response(&self, response: &AuthResponse) -> Result<(), CredentialError> {
        self.save(&response.token, &response.user)
    }

    /// Remove token and profile together.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear(&self) -> Result<(), CredentialError> {
        self.store.remove_all(&[keys::TOKEN, keys::USER])
    }
}
