//! Persistence for the single active [`PromotionConfig`] document.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::PromotionConfig;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize promotion config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Stores the active promotion configuration as one JSON document on disk.
///
/// Loading is infallible from the caller's point of view: a missing,
/// unreadable, or malformed document is "no configuration", not an error.
/// Saving replaces the document atomically (write to a sibling temp file,
/// then rename) so a failed save never corrupts the previous document.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigStore { path: path.into() }
    }

    /// The document path this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted configuration, or `None` when no usable document
    /// exists. Unreadable and malformed documents are logged and treated as
    /// absent.
    #[must_use]
    pub fn load(&self) -> Option<PromotionConfig> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "config document unreadable; treating as unconfigured");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "config document malformed; treating as unconfigured");
                None
            }
        }
    }

    /// Persists `cfg`, replacing any previous document atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the document cannot be serialized or the
    /// temp file cannot be written or renamed into place. The previously
    /// persisted document is left intact in every failure case.
    pub fn save(&self, cfg: &PromotionConfig) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(cfg)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
