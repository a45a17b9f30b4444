//! Durable state behind a small key/value port.
//!
//! [`StorageBackend`] is the injected port (a file directory in the binary,
//! an in-memory map in tests). [`PersistenceStore`] adds typed JSON encoding
//! on top and is the only writer of durable state.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt, io, sync::Arc};
use tracing::{debug, warn};

/// Raw string storage keyed by name. Writes replace the whole value.
pub trait StorageBackend: Send + Sync {
    fn read(&self, key: &str) -> io::Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> io::Result<()>;
    /// Removing a key that does not exist is not an error.
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// The three records the application persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Settings,
    History,
    Templates,
}

impl StorageKey {
    pub const ALL: [Self; 3] = [Self::Settings, Self::History, Self::Templates];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Settings => "admin_settings",
            Self::History => "funnel_history",
            Self::Templates => "funnel_templates",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of reading a typed record. Keeps "never written" apart from
/// "written but unreadable".
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue<T> {
    Absent,
    Present(T),
    Corrupt { reason: String },
}

impl<T> StoredValue<T> {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }

    /// Downgrade a decoded record that breaks a domain rule to
    /// [`StoredValue::Corrupt`].
    pub fn validated<E: fmt::Display>(self, check: impl FnOnce(&T) -> Result<(), E>) -> Self {
        match self {
            Self::Present(value) => match check(&value) {
                Ok(()) => Self::Present(value),
                Err(error) => Self::Corrupt {
                    reason: error.to_string(),
                },
            },
            other => other,
        }
    }

    /// Collapse to an option, logging a warning when the record was corrupt.
    pub fn into_option(self, key: StorageKey) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
            Self::Corrupt { reason } => {
                warn!(%key, %reason, "ignoring corrupt stored record");
                None
            }
        }
    }
}

#[derive(Clone)]
pub struct PersistenceStore {
    backend: Arc<dyn StorageBackend>,
}

impl PersistenceStore {
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// A store over a fresh [`MemoryStorage`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Never fails: read errors and malformed JSON are both reported as
    /// [`StoredValue::Corrupt`].
    pub fn load<T: DeserializeOwned>(&self, key: StorageKey) -> StoredValue<T> {
        let raw = match self.backend.read(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return StoredValue::Absent,
            Err(error) => {
                return StoredValue::Corrupt {
                    reason: format!("read failed: {error}"),
                }
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => StoredValue::Present(value),
            Err(error) => StoredValue::Corrupt {
                reason: error.to_string(),
            },
        }
    }

    pub fn save<T: Serialize + ?Sized>(
        &self,
        key: StorageKey,
        value: &T,
    ) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(value).map_err(|source| StorageError::Serialize { key, source })?;
        self.backend
            .write(key.as_str(), &raw)
            .map_err(|source| StorageError::Backend { key, source })?;
        debug!(%key, bytes = raw.len(), "record saved");
        Ok(())
    }

    /// Delete the record entirely, so later loads see [`StoredValue::Absent`].
    pub fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        self.backend
            .remove(key.as_str())
            .map_err(|source| StorageError::Backend { key, source })?;
        debug!(%key, "record removed");
        Ok(())
    }

    pub fn contains(&self, key: StorageKey) -> Result<bool, StorageError> {
        self.backend
            .read(key.as_str())
            .map(|raw| raw.is_some())
            .map_err(|source| StorageError::Backend { key, source })
    }
}

/// Records which keys held unreadable data while loading, so callers can
/// tell "no data" apart from "data discarded".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    corrupt: Vec<(StorageKey, String)>,
}

impl LoadReport {
    /// Unwrap a loaded value, remembering it if it was corrupt.
    pub fn take<T>(&mut self, key: StorageKey, value: StoredValue<T>) -> Option<T> {
        if let StoredValue::Corrupt { reason } = &value {
            self.corrupt.push((key, reason.clone()));
        }
        value.into_option(key)
    }

    pub fn corrupt_keys(&self) -> Vec<StorageKey> {
        self.corrupt.iter().map(|(key, _)| *key).collect()
    }

    pub fn corrupt_entries(&self) -> &[(StorageKey, String)] {
        &self.corrupt
    }

    pub fn is_clean(&self) -> bool {
        self.corrupt.is_empty()
    }
}
