//! Persisted map credential
//!
//! A single string stored under a fixed key. No expiry, no encryption: the
//! token is read when the map mounts and overwritten when the user supplies a
//! new one.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{constants::MAPBOX_TOKEN_KEY, prelude::HashMap, MapError, Result};

/// Access token of the map service
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Trims the input and rejects blank tokens
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        (!token.is_empty()).then(|| Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let visible: String = self.0.chars().take(6).collect();
        write!(f, "Credential({visible}…)")
    }
}

pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credential>>;
    fn store(&self, credential: &Credential) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Keeps the token in memory only
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    value: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            value: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        let value = self
            .value
            .lock()
            .map_err(|e| MapError::Storage(e.to_string()))?;
        Ok(value.clone())
    }

    fn store(&self, credential: &Credential) -> Result<()> {
        let mut value = self
            .value
            .lock()
            .map_err(|e| MapError::Storage(e.to_string()))?;
        *value = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut value = self
            .value
            .lock()
            .map_err(|e| MapError::Storage(e.to_string()))?;
        *value = None;
        Ok(())
    }
}

/// JSON key/value file; the token lives under [`MAPBOX_TOKEN_KEY`] and any
/// other keys in the file are preserved on write
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::default()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(MAPBOX_TOKEN_KEY)
            .and_then(|token| Credential::parse(token)))
    }

    fn store(&self, credential: &Credential) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(MAPBOX_TOKEN_KEY.to_string(), credential.as_str().to_string());
        self.write_entries(&entries)?;
        log::info!("map credential saved to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(MAPBOX_TOKEN_KEY).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}
