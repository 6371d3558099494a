//! Durable storage for the bearer credential.
//!
//! At most one credential exists at a time, held under a single fixed
//! key. The file-backed store writes `credential.json` inside the app
//! data directory with restricted permissions (0600); the credential is
//! opaque to the client and is never logged.
//!
//! Read semantics: a missing, empty, or unreadable file is an *absent*
//! credential, not an error — a corrupted file must never wedge startup.
//! Write failures are real errors; the session controller reports them
//! so the user knows the session is memory-only.

use crate::error::StorageError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// On-disk layout: one JSON document holding the token.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    token: String,
}

/// Durable key-value persistence of at most one credential.
///
/// Implementations are substituted in tests to observe persistence
/// behavior and to inject write failures.
pub trait TokenStore: Send + Sync {
    /// Persist the credential, replacing any prior value. Completes (or
    /// fails) atomically with respect to subsequent [`TokenStore::load`]
    /// calls.
    fn save(&self, credential: &str) -> Result<(), StorageError>;

    /// The previously saved credential, or `None` when none exists.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Remove the stored credential. Clearing an empty store is not an
    /// error.
    fn clear(&self) -> Result<(), StorageError>;
}

/// File-backed store used in production builds.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store backed by the given file (see [`crate::Config::credential_path`]).
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, credential: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(&StoredCredential {
            token: credential.to_string(),
        })
        .map_err(|err| StorageError::from(std::io::Error::other(err)))?;

        // Restrict permissions where the platform supports it
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)?;
            file.write_all(body.as_bytes())?;
        }

        #[cfg(not(unix))]
        fs::write(&self.path, body)?;

        Ok(())
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str::<StoredCredential>(&raw) {
            Ok(stored) if !stored.token.is_empty() => Ok(Some(stored.token)),
            Ok(_) => Ok(None),
            Err(err) => {
                tracing::warn!("stored credential is unreadable, treating as absent: {err}");
                Ok(None)
            }
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory store for tests and for sessions that should deliberately
/// not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, credential: &str) -> Result<(), StorageError> {
        *self.token.lock() = Some(credential.to_string());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.token.lock().clone())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.token.lock() = None;
        Ok(())
    }
}
