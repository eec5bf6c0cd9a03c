//! Durable credential storage.
//!
//! The store is a flat key/value map persisted as one JSON document. Every write
//! replaces the whole document so a reader never sees half of a credential.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::auth::{AuthScheme, Credential};
use crate::errors::ClientError;

/// Persistent holder of the single active credential.
pub trait CredentialStore: Send + Sync {
    /// Read the credential for `scheme`, if a complete one is stored.
    fn load(&self, scheme: AuthScheme) -> Result<Option<Credential>, ClientError>;

    /// Replace whatever is stored with `credential`.
    fn save(&self, credential: &Credential) -> Result<(), ClientError>;

    /// Remove the stored credential. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), ClientError>;
}

type Entries = BTreeMap<String, String>;

fn entries_for(credential: &Credential) -> Entries {
    credential
        .to_entries()
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn credential_from(entries: &Entries, scheme: AuthScheme) -> Option<Credential> {
    Credential::from_entries(scheme, |key| entries.get(key).map(String::as_str))
}

/// JSON file on disk, replaced atomically on every write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries, ClientError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // Treat a corrupt store like an empty one; the user just logs in again.
                tracing::warn!("Ignoring unreadable credential store {:?}: {}", self.path, e);
                Ok(Entries::new())
            }
        }
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), ClientError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&serde_json::to_vec(entries)?)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn load(&self, scheme: AuthScheme) -> Result<Option<Credential>, ClientError> {
        Ok(credential_from(&self.read_entries()?, scheme))
    }

    fn save(&self, credential: &Credential) -> Result<(), ClientError> {
        self.write_entries(&entries_for(credential))?;
        tracing::debug!("Stored {} credential", credential.scheme().as_str());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("Cleared credential store");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, for hosts that keep nothing on disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: &Credential) -> Self {
        Self {
            entries: Mutex::new(entries_for(credential)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Entries>, ClientError> {
        self.entries
            .lock()
            .map_err(|_| ClientError::Storage("Credential store lock poisoned".to_string()))
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self, scheme: AuthScheme) -> Result<Option<Credential>, ClientError> {
        Ok(credential_from(&*self.lock()?, scheme))
    }

    fn save(&self, credential: &Credential) -> Result<(), ClientError> {
        *self.lock()? = entries_for(credential);
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.lock()?.clear();
        Ok(())
    }
}
