//! Decides whether the persisted dataset can be reused.

use crate::error::{Error, ErrorKind, Result};
use crate::store::SnapshotStore;
use exn::ResultExt;
use statdata_remote::{ClientHandle, VersionDescriptor};

/// What the gate found out.
#[derive(Debug)]
pub enum VersionCheck {
    /// The persisted snapshot was built from the version currently served.
    Current(VersionDescriptor),
    /// A rebuild is needed for `remote`.
    Outdated { remote: VersionDescriptor, persisted: Option<VersionDescriptor> },
    /// The remote version couldn't be determined, so neither can the need
    /// for a rebuild.
    Undeterminable { persisted: Option<VersionDescriptor>, error: Error },
}

pub struct VersionGate {
    client: ClientHandle,
    store: SnapshotStore,
}

impl VersionGate {
    pub fn new(client: ClientHandle, store: SnapshotStore) -> Self {
        Self { client, store }
    }

    /// The version currently served by the remote service.
    pub async fn resolve_version(&self) -> Result<VersionDescriptor> {
        self.client.version().await.or_raise(|| ErrorKind::RemoteUnavailable)
    }

    /// Any difference at all, or nothing persisted, means a rebuild.
    pub fn needs_rebuild(current: &VersionDescriptor, persisted: Option<&VersionDescriptor>) -> bool {
        persisted != Some(current)
    }

    pub async fn check(&self) -> VersionCheck {
        let persisted = match self.store.version().await {
            Ok(persisted) => persisted,
            Err(err) => {
                tracing::warn!(error = ?err, "Ignoring unreadable persisted version");
                None
            },
        };
        let remote = match self.resolve_version().await {
            Ok(remote) => remote,
            Err(error) => {
                tracing::error!(?error, "Error checking game versions");
                return VersionCheck::Undeterminable { persisted, error };
            },
        };
        tracing::info!(remote = %remote, persisted = ?persisted.as_ref().map(ToString::to_string), "Checked game versions");
        if Self::needs_rebuild(&remote, persisted.as_ref()) {
            VersionCheck::Outdated { remote, persisted }
        } else {
            VersionCheck::Current(remote)
        }
    }
}
