// Connection store: the ordered list of named connection profiles,
// persisted as one indented JSON array. Every save rewrites the whole
// file; there is no locking and no atomic rename.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// A named set of API endpoint and credentials.
///
/// Field names are PascalCase on disk (`DisplayName`, `BaseUrl`, ...).
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConnectionProfile {
    pub display_name: String,
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("All fields are required: {0} is empty.")]
    MissingField(&'static str),
}

impl ConnectionProfile {
    /// Build a profile from user input. Every field is trimmed and must
    /// be non-empty afterwards.
    pub fn new(
        display_name: &str,
        base_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, ProfileError> {
        let fields = [
            ("DisplayName", display_name),
            ("BaseUrl", base_url),
            ("ClientId", client_id),
            ("ClientSecret", client_secret),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ProfileError::MissingField(*name));
        }
        Ok(Self {
            display_name: display_name.trim().to_string(),
            base_url: base_url.trim().to_string(),
            client_id: client_id.trim().to_string(),
            client_secret: client_secret.trim().to_string(),
        })
    }
}

impl fmt::Display for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("display_name", &self.display_name)
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exists but does not hold a profile list.
    #[error("corrupted connection store {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot serialize connections: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File-backed profile list. The path is fixed at construction.
#[derive(Debug, Clone)]
pub struct ConnectionStore {
    path: PathBuf,
}

impl ConnectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored profile, in file order. A missing file is an
    /// empty list.
    pub fn load(&self) -> Result<Vec<ConnectionProfile>, StoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no connection store yet");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let profiles: Option<Vec<ConnectionProfile>> =
            serde_json::from_str(&data).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        let profiles = profiles.unwrap_or_default();
        debug!(path = %self.path.display(), count = profiles.len(), "loaded connections");
        Ok(profiles)
    }

    /// Overwrite the file with `profiles`, creating the parent directory
    /// when needed.
    pub fn save(&self, profiles: &[ConnectionProfile]) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(profiles)?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), count = profiles.len(), "saved connections");
        Ok(())
    }
}
