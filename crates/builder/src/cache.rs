//! Per-collection cache of normalized pipeline output.
//!
//! Each pipeline gets its own directory below `temp/`, holding the payload
//! (`data.json`) and the dataset version it was built from (`version.json`).
//! An entry is only ever used for exactly that version. The whole area is
//! purged once a full rebuild has been persisted.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use statdata_remote::VersionDescriptor;
use statdata_storage::BackendHandle;
use statdata_storage::error::ErrorKind as StorageErrorKind;
use std::ops::Deref;
use std::path::{Path, PathBuf};

const TEMP_DIR: &str = "temp";
const DATA_FILE: &str = "data.json";
const VERSION_FILE: &str = "version.json";

#[derive(Clone)]
pub struct CollectionCache {
    storage: BackendHandle,
}

impl CollectionCache {
    pub fn new(storage: BackendHandle) -> Self {
        Self { storage }
    }

    /// Directory holding every cache entry.
    pub fn root() -> &'static Path {
        Path::new(TEMP_DIR)
    }

    fn entry(key: &str, file: &str) -> PathBuf {
        Self::root().join(key).join(file)
    }

    /// The cached payload for `key`, if one was written for exactly
    /// `expected`. Missing, unreadable, unparseable or outdated entries all
    /// count as a miss.
    pub async fn read<T: DeserializeOwned>(&self, key: &str, expected: &VersionDescriptor) -> Option<T> {
        match self.try_read(key, expected).await {
            Ok(Some(payload)) => {
                tracing::info!(cache = key, version = %expected, "Valid cached data found, will not re-request");
                Some(payload)
            },
            Ok(None) => None,
            Err(err) => {
                tracing::debug!(cache = key, error = ?err, "Ignoring unusable cache entry");
                None
            },
        }
    }

    async fn try_read<T: DeserializeOwned>(&self, key: &str, expected: &VersionDescriptor) -> Result<Option<T>> {
        let version = match self.storage.read(&Self::entry(key, VERSION_FILE)).await {
            Ok(bytes) => bytes,
            Err(e) if matches!(e.deref(), StorageErrorKind::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e).or_raise(|| ErrorKind::Storage),
        };
        let version: VersionDescriptor = serde_json::from_slice(&version)
            .or_raise(|| ErrorKind::InvalidData(format!("{key}/{VERSION_FILE}")))?;
        if &version != expected {
            tracing::debug!(cache = key, cached = %version, current = %expected, "Cached data is for another version");
            return Ok(None);
        }
        let payload = self.storage.read(&Self::entry(key, DATA_FILE)).await.or_raise(|| ErrorKind::Storage)?;
        let payload =
            serde_json::from_slice(&payload).or_raise(|| ErrorKind::InvalidData(format!("{key}/{DATA_FILE}")))?;
        Ok(Some(payload))
    }

    /// Store `payload` as the entry for `key` at `version`.
    ///
    /// The old version tag is dropped first and the new one written last, so
    /// an interrupted write never leaves a tag vouching for the wrong payload.
    pub async fn write<T: Serialize>(&self, key: &str, version: &VersionDescriptor, payload: &T) -> Result<()> {
        let data = serde_json::to_vec(payload).or_raise(|| ErrorKind::InvalidData(key.to_string()))?;
        let tag = serde_json::to_vec(version).or_raise(|| ErrorKind::InvalidData(key.to_string()))?;
        let version_path = Self::entry(key, VERSION_FILE);
        match self.storage.delete(&version_path).await {
            Ok(()) => {},
            Err(e) if matches!(e.deref(), StorageErrorKind::NotFound(_)) => {},
            Err(e) => return Err(e).or_raise(|| ErrorKind::Storage),
        }
        self.storage.write(&Self::entry(key, DATA_FILE), &data).await.or_raise(|| ErrorKind::Storage)?;
        self.storage.write(&version_path, &tag).await.or_raise(|| ErrorKind::Storage)?;
        tracing::info!(cache = key, %version, "Saved temporary data");
        Ok(())
    }

    /// Remove every cache entry. Succeeds if there is nothing to remove.
    pub async fn purge(&self) -> Result<()> {
        self.storage.remove_dir_all(Self::root()).await.or_raise(|| ErrorKind::Storage)
    }
}
