//! The durable dataset: the persisted snapshot and the version it was built
//! from.

use crate::error::{ErrorKind, Result};
use crate::models::GameData;
use exn::ResultExt;
use statdata_remote::VersionDescriptor;
use statdata_storage::BackendHandle;
use statdata_storage::error::ErrorKind as StorageErrorKind;
use std::ops::Deref;
use std::path::Path;

pub const SNAPSHOT_FILE: &str = "gameData.json";
pub const VERSION_FILE: &str = "dataVersion.json";

#[derive(Clone)]
pub struct SnapshotStore {
    storage: BackendHandle,
}

impl SnapshotStore {
    pub fn new(storage: BackendHandle) -> Self {
        Self { storage }
    }

    /// Version of the persisted snapshot; `None` if nothing is persisted.
    pub async fn version(&self) -> Result<Option<VersionDescriptor>> {
        let bytes = match self.storage.read(Path::new(VERSION_FILE)).await {
            Ok(bytes) => bytes,
            Err(e) if matches!(e.deref(), StorageErrorKind::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e).or_raise(|| ErrorKind::Storage),
        };
        Ok(Some(serde_json::from_slice(&bytes).or_raise(|| ErrorKind::InvalidData(VERSION_FILE.to_string()))?))
    }

    pub async fn snapshot(&self) -> Result<GameData> {
        let bytes = self.storage.read(Path::new(SNAPSHOT_FILE)).await.or_raise(|| ErrorKind::Storage)?;
        serde_json::from_slice(&bytes).or_raise(|| ErrorKind::InvalidData(SNAPSHOT_FILE.to_string()))
    }

    /// The persisted snapshot together with its version. Either one missing
    /// is an error: they are only meaningful as a pair.
    pub async fn load(&self) -> Result<(GameData, VersionDescriptor)> {
        let version = self.version().await?.ok_or_else(|| ErrorKind::InvalidData(format!("{VERSION_FILE} is missing")))?;
        let snapshot = self.snapshot().await?;
        Ok((snapshot, version))
    }

    /// Persist a snapshot and its version as one unit.
    ///
    /// The previous version tag is removed before the snapshot is replaced
    /// and the new one written last, so a half-finished persist reads back
    /// as "nothing persisted" rather than as a mismatched pair.
    pub async fn persist(&self, snapshot: &GameData, version: &VersionDescriptor) -> Result<()> {
        let data = serde_json::to_vec_pretty(snapshot).or_raise(|| ErrorKind::InvalidData(SNAPSHOT_FILE.to_string()))?;
        let tag = serde_json::to_vec(version).or_raise(|| ErrorKind::InvalidData(VERSION_FILE.to_string()))?;
        match self.storage.delete(Path::new(VERSION_FILE)).await {
            Ok(()) => {},
            Err(e) if matches!(e.deref(), StorageErrorKind::NotFound(_)) => {},
            Err(e) => return Err(e).or_raise(|| ErrorKind::Storage),
        }
        self.storage.write(Path::new(SNAPSHOT_FILE), &data).await.or_raise(|| ErrorKind::Storage)?;
        self.storage.write(Path::new(VERSION_FILE), &tag).await.or_raise(|| ErrorKind::Storage)?;
        tracing::info!(%version, bytes = data.len(), "Saved new copy of gameData.json");
        Ok(())
    }
}
