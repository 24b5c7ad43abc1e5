//! In-memory data service for testing.

use crate::error::{ErrorKind, Result};
use crate::{Query, RemoteDataClient, Row, VersionDescriptor};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// In-memory stand-in for the remote data service.
///
/// Collections are registered up front with their full row lists; query
/// filters are applied by field equality (see [`Query::matches`]) and
/// projections are ignored. Every fetch is counted per collection so tests can
/// assert on how much work a build actually did.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use statdata_remote::{MockClient, Query, RemoteDataClient, VersionDescriptor};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MockClient::new(VersionDescriptor::new("1.0", "eng_us"))
///     .with_collection("equipmentList", vec![json!({"id": "001"})]);
/// let rows = client.fetch(&Query::collection("equipmentList")).await?;
/// assert_eq!(rows.len(), 1);
/// assert_eq!(client.fetch_count("equipmentList").await, 1);
/// # Ok(())
/// # }
/// ```
pub struct MockClient {
    version: RwLock<Option<VersionDescriptor>>,
    collections: RwLock<HashMap<String, Vec<Row>>>,
    failing: RwLock<HashSet<String>>,
    fetches: RwLock<HashMap<String, usize>>,
}

impl MockClient {
    pub fn new(version: VersionDescriptor) -> Self {
        Self {
            version: RwLock::new(Some(version)),
            collections: RwLock::default(),
            failing: RwLock::default(),
            fetches: RwLock::default(),
        }
    }

    /// Register (or replace) the rows of a collection.
    pub fn with_collection(mut self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.collections.get_mut().insert(name.into(), rows);
        self
    }

    /// Make every fetch of a collection fail.
    pub fn with_failing(mut self, name: impl Into<String>) -> Self {
        self.failing.get_mut().insert(name.into());
        self
    }

    /// Change the served version; `None` makes the version endpoint
    /// unavailable.
    pub async fn set_version(&self, version: Option<VersionDescriptor>) {
        *self.version.write().await = version;
    }

    pub async fn fail_collection(&self, name: impl Into<String>) {
        self.failing.write().await.insert(name.into());
    }

    pub async fn restore_collection(&self, name: &str) {
        self.failing.write().await.remove(name);
    }

    /// Number of fetches issued for a collection so far (failed ones
    /// included).
    pub async fn fetch_count(&self, name: &str) -> usize {
        self.fetches.read().await.get(name).copied().unwrap_or_default()
    }

    /// Number of fetches issued across every collection.
    pub async fn total_fetches(&self) -> usize {
        self.fetches.read().await.values().sum()
    }
}

#[async_trait]
impl RemoteDataClient for MockClient {
    async fn version(&self) -> Result<VersionDescriptor> {
        tokio::task::yield_now().await;
        match self.version.read().await.clone() {
            Some(version) => Ok(version),
            None => exn::bail!(ErrorKind::Unavailable("version endpoint offline".to_string())),
        }
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<Row>> {
        *self.fetches.write().await.entry(query.collection.clone()).or_default() += 1;
        // Give concurrently dispatched fetches a chance to interleave.
        tokio::task::yield_now().await;
        if self.failing.read().await.contains(&query.collection) {
            exn::bail!(ErrorKind::Rejected {
                collection: query.collection.clone(),
                reason: "simulated failure".to_string(),
            });
        }
        let collections = self.collections.read().await;
        let Some(rows) = collections.get(&query.collection) else {
            exn::bail!(ErrorKind::Rejected {
                collection: query.collection.clone(),
                reason: "unknown collection".to_string(),
            });
        };
        Ok(rows.iter().filter(|row| query.matches(row)).cloned().collect())
    }
}
