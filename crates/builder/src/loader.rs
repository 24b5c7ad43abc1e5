//! Top-level load: reuse, rebuild or fall back.
//!
//! ```text
//! CheckingVersion ─┬─ versions match ───────────────────────────▶ Reused
//!                  ├─ versions differ ─▶ Rebuilding ─┬─ all ok ──▶ Rebuilt
//!                  │                                 └─ failed ──┐
//!                  └─ version unknown ───────────────────────────┴▶ StaleFallback
//!                                                                    or Fatal
//! ```

use crate::context::BuildContext;
use crate::error::{Error, ErrorKind, Result};
use crate::gate::{VersionCheck, VersionGate};
use crate::models::GameData;
use crate::orchestrator::{self, BuildReport};
use crate::pipeline::Pipeline;
use crate::store::SnapshotStore;
use statdata_remote::{ClientHandle, VersionDescriptor};
use statdata_storage::BackendHandle;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Freshly built from the remote service and persisted.
    Rebuilt,
    /// The persisted snapshot was already current.
    Reused,
    /// A rebuild was needed but failed (or the need couldn't be determined);
    /// the last persisted snapshot was loaded instead and may be stale.
    StaleFallback,
}

impl LoadOutcome {
    /// Only a rebuild counts as an update.
    pub fn is_updated(self) -> bool {
        matches!(self, LoadOutcome::Rebuilt)
    }
}

/// Loads game data from a storage backend, rebuilding it from the remote
/// service whenever the served version changes.
///
/// # Examples
///
/// ```no_run
/// use statdata_builder::{DataLoader, LoadOutcome};
/// # use statdata_remote::ClientHandle;
/// # use statdata_storage::BackendHandle;
/// # async fn example(client: ClientHandle, storage: BackendHandle) -> statdata_builder::error::Result<()> {
/// let mut loader = DataLoader::new(client, storage);
/// match loader.load().await? {
///     LoadOutcome::StaleFallback => eprintln!("using stale data"),
///     LoadOutcome::Rebuilt | LoadOutcome::Reused => {},
/// }
/// let snapshot = loader.snapshot().expect("a successful load leaves a snapshot");
/// println!("{} units", snapshot.unit_data.len());
/// # Ok(())
/// # }
/// ```
pub struct DataLoader {
    client: ClientHandle,
    storage: BackendHandle,
    store: SnapshotStore,
    snapshot: Option<GameData>,
    version: Option<VersionDescriptor>,
    outcome: Option<LoadOutcome>,
}

impl DataLoader {
    pub fn new(client: ClientHandle, storage: BackendHandle) -> Self {
        Self {
            client,
            store: SnapshotStore::new(storage.clone()),
            storage,
            snapshot: None,
            version: None,
            outcome: None,
        }
    }

    pub fn snapshot(&self) -> Option<&GameData> {
        self.snapshot.as_ref()
    }

    /// Version of the loaded snapshot.
    pub fn version(&self) -> Option<&VersionDescriptor> {
        self.version.as_ref()
    }

    pub fn outcome(&self) -> Option<LoadOutcome> {
        self.outcome
    }

    /// Did the last load produce freshly built data?
    pub fn is_updated(&self) -> bool {
        self.outcome.is_some_and(LoadOutcome::is_updated)
    }

    /// Load the dataset, rebuilding it first if it's outdated.
    ///
    /// # Errors
    /// [`ErrorKind::Fatal`] if a rebuild was needed, didn't succeed, and
    /// there's no persisted snapshot to fall back on.
    /// [`ErrorKind::Storage`] if a rebuilt snapshot couldn't be persisted.
    #[instrument(skip_all, fields(storage = self.storage.name()))]
    pub async fn load(&mut self) -> Result<LoadOutcome> {
        self.outcome = None;
        let gate = VersionGate::new(self.client.clone(), self.store.clone());
        let outcome = match gate.check().await {
            VersionCheck::Current(version) => match self.store.snapshot().await {
                Ok(snapshot) => {
                    tracing::info!(%version, "Game data is current");
                    self.accept(snapshot, version);
                    LoadOutcome::Reused
                },
                Err(err) => {
                    tracing::warn!(error = ?err, "Persisted game data is unreadable, rebuilding");
                    self.rebuild(version).await?
                },
            },
            VersionCheck::Outdated { remote, persisted } => {
                tracing::info!(
                    %remote,
                    persisted = ?persisted.as_ref().map(ToString::to_string),
                    "Current data outdated"
                );
                self.rebuild(remote).await?
            },
            VersionCheck::Undeterminable { error, .. } => self.fall_back(Some(error)).await?,
        };
        self.outcome = Some(outcome);
        Ok(outcome)
    }

    async fn rebuild(&mut self, version: VersionDescriptor) -> Result<LoadOutcome> {
        let ctx = BuildContext::new(self.client.clone(), self.storage.clone(), version.clone());
        let BuildReport { parts, failures } = orchestrator::build_all(&ctx).await;
        let failed: Vec<Pipeline> = failures.iter().map(|(pipeline, _)| *pipeline).collect();
        let snapshot = match (failures.into_iter().next(), parts.assemble()) {
            (None, Some(snapshot)) => snapshot,
            (cause, _) => {
                tracing::error!(?failed, "Rebuild failed, trying to reuse stale data");
                return self.fall_back(cause.map(|(_, err)| err)).await;
            },
        };
        self.store.persist(&snapshot, &version).await?;
        if let Err(err) = ctx.cache().purge().await {
            // Leftovers are only ever reused for this exact version
            tracing::warn!(error = ?err, "Failed to clean up temporary data");
        }
        self.accept(snapshot, version);
        Ok(LoadOutcome::Rebuilt)
    }

    async fn fall_back(&mut self, cause: Option<Error>) -> Result<LoadOutcome> {
        match self.store.load().await {
            Ok((snapshot, version)) => {
                tracing::warn!(%version, "Reusing stale game data");
                self.accept(snapshot, version);
                Ok(LoadOutcome::StaleFallback)
            },
            Err(err) => {
                tracing::error!(error = ?err, "No persisted game data to fall back on");
                Err(match cause {
                    Some(cause) => cause.raise(ErrorKind::Fatal),
                    None => exn::Exn::from(ErrorKind::Fatal),
                })
            },
        }
    }

    fn accept(&mut self, snapshot: GameData, version: VersionDescriptor) {
        self.snapshot = Some(snapshot);
        self.version = Some(version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::store::{SNAPSHOT_FILE, VERSION_FILE};
    use statdata_remote::MockClient;
    use statdata_storage::backend::{LocalBackend, MockBackend, ReadOnlyBackend};
    use statdata_storage::StorageBackend;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    fn loader(client: &Arc<MockClient>, storage: &Arc<MockBackend>) -> DataLoader {
        DataLoader::new(client.clone(), storage.clone())
    }

    /// Storage holding a completed build of the fixture data.
    async fn built() -> (Arc<MockClient>, Arc<MockBackend>) {
        let client = Arc::new(fixtures::client());
        let storage = Arc::new(MockBackend::default());
        assert_eq!(loader(&client, &storage).load().await.unwrap(), LoadOutcome::Rebuilt);
        (client, storage)
    }

    async fn persisted(storage: &MockBackend) -> Vec<u8> {
        storage.read(Path::new(SNAPSHOT_FILE)).await.unwrap()
    }

    #[tokio::test]
    async fn test_first_load_rebuilds_and_persists() {
        let client = Arc::new(fixtures::client());
        let storage = Arc::new(MockBackend::default());
        let mut loader = loader(&client, &storage);
        assert!(!loader.is_updated());

        assert_eq!(loader.load().await.unwrap(), LoadOutcome::Rebuilt);
        assert!(loader.is_updated());
        assert_eq!(loader.snapshot(), Some(&fixtures::snapshot()));
        assert_eq!(loader.version(), Some(&fixtures::version()));
        // Temporary caches are gone, the snapshot and its version are paired
        assert_eq!(storage.paths().await, vec![PathBuf::from(VERSION_FILE), PathBuf::from(SNAPSHOT_FILE)]);
        let version = storage.read(Path::new(VERSION_FILE)).await.unwrap();
        assert_eq!(serde_json::from_slice::<VersionDescriptor>(&version).unwrap(), fixtures::version());
        let snapshot: GameData = serde_json::from_slice(&persisted(&storage).await).unwrap();
        assert_eq!(snapshot, fixtures::snapshot());
    }

    #[tokio::test]
    async fn test_second_load_is_idempotent() {
        let (client, storage) = built().await;
        let fetches = client.total_fetches().await;
        let bytes = persisted(&storage).await;
        let first = serde_json::to_vec(&fixtures::snapshot()).unwrap();

        let mut loader = loader(&client, &storage);
        assert_eq!(loader.load().await.unwrap(), LoadOutcome::Reused);
        assert!(!loader.is_updated());
        assert_eq!(client.total_fetches().await, fetches);
        assert_eq!(persisted(&storage).await, bytes);
        assert_eq!(serde_json::to_vec(loader.snapshot().unwrap()).unwrap(), first);
    }

    #[tokio::test]
    async fn test_version_change_triggers_rebuild() {
        let (client, storage) = built().await;
        let fetches = client.total_fetches().await;
        // Same rows, different language
        client.set_version(Some(VersionDescriptor::new(fixtures::version().game, "ger_de"))).await;

        let mut loader = loader(&client, &storage);
        assert_eq!(loader.load().await.unwrap(), LoadOutcome::Rebuilt);
        assert_eq!(client.total_fetches().await, fetches * 2);
        assert_eq!(loader.version().unwrap().language, "ger_de");
        assert_eq!(loader.snapshot(), Some(&fixtures::snapshot()));
    }

    #[tokio::test]
    async fn test_partial_failure_falls_back_to_persisted_data() {
        let (client, storage) = built().await;
        let bytes = persisted(&storage).await;
        client.set_version(Some(fixtures::next_version())).await;
        client.fail_collection("skillList").await;

        let mut loader = loader(&client, &storage);
        assert_eq!(loader.load().await.unwrap(), LoadOutcome::StaleFallback);
        assert!(!loader.is_updated());
        assert_eq!(loader.snapshot(), Some(&fixtures::snapshot()));
        assert_eq!(loader.version(), Some(&fixtures::version()));
        assert_eq!(persisted(&storage).await, bytes);

        // The pipelines that did succeed kept their results for the next try
        let gear_fetches = client.fetch_count("equipmentList").await;
        client.restore_collection("skillList").await;
        assert_eq!(loader.load().await.unwrap(), LoadOutcome::Rebuilt);
        assert_eq!(client.fetch_count("equipmentList").await, gear_fetches);
        assert_eq!(loader.version(), Some(&fixtures::next_version()));
    }

    #[tokio::test]
    async fn test_failure_without_persisted_data_is_fatal() {
        let client = Arc::new(fixtures::client().with_failing("equipmentList"));
        let storage = Arc::new(MockBackend::default());
        let mut loader = loader(&client, &storage);
        let err = loader.load().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Fatal));
        assert!(loader.snapshot().is_none());
        assert!(!loader.is_updated());
        assert!(!storage.paths().await.contains(&PathBuf::from(SNAPSHOT_FILE)));
    }

    #[tokio::test]
    async fn test_unknown_version_reuses_persisted_data() {
        let (client, storage) = built().await;
        let fetches = client.total_fetches().await;
        client.set_version(None).await;

        let mut loader = loader(&client, &storage);
        assert_eq!(loader.load().await.unwrap(), LoadOutcome::StaleFallback);
        assert_eq!(loader.snapshot(), Some(&fixtures::snapshot()));
        assert_eq!(client.total_fetches().await, fetches);
    }

    #[tokio::test]
    async fn test_unknown_version_without_persisted_data_is_fatal() {
        let client = Arc::new(fixtures::client());
        client.set_version(None).await;
        let storage = Arc::new(MockBackend::default());
        let err = loader(&client, &storage).load().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Fatal));
        assert_eq!(client.total_fetches().await, 0);
    }

    #[tokio::test]
    async fn test_unreadable_snapshot_is_rebuilt() {
        let storage = Arc::new(MockBackend::with_files([
            (SNAPSHOT_FILE, Vec::from(*b"{\"gearData\":")),
            (VERSION_FILE, serde_json::to_vec(&fixtures::version()).unwrap()),
        ]));
        let client = Arc::new(fixtures::client());
        let mut loader = loader(&client, &storage);
        assert_eq!(loader.load().await.unwrap(), LoadOutcome::Rebuilt);
        assert_eq!(loader.snapshot(), Some(&fixtures::snapshot()));
    }

    #[tokio::test]
    async fn test_dry_run_leaves_storage_untouched() {
        let client = Arc::new(fixtures::client());
        let inner = Arc::new(MockBackend::default());
        let mut loader = DataLoader::new(client, Arc::new(ReadOnlyBackend::new(inner.clone())));
        assert_eq!(loader.load().await.unwrap(), LoadOutcome::Rebuilt);
        assert_eq!(loader.snapshot(), Some(&fixtures::snapshot()));
        assert!(inner.paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_local_backend_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(fixtures::client());
        let storage = Arc::new(LocalBackend::new("local", dir.path()).unwrap());

        let mut loader = DataLoader::new(client.clone(), storage.clone());
        assert_eq!(loader.load().await.unwrap(), LoadOutcome::Rebuilt);
        assert!(dir.path().join(SNAPSHOT_FILE).is_file());
        assert!(dir.path().join(VERSION_FILE).is_file());
        assert!(!dir.path().join("temp").exists());

        let fetches = client.total_fetches().await;
        let mut loader = DataLoader::new(client.clone(), storage);
        assert_eq!(loader.load().await.unwrap(), LoadOutcome::Reused);
        assert_eq!(client.total_fetches().await, fetches);
    }
}
