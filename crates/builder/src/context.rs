//! Per-build state threaded through every pipeline.

use crate::cache::CollectionCache;
use crate::error::{ErrorKind, Result};
use crate::memo::{Memo, MemoState};
use crate::models::StatTables;
use crate::pipeline::{Normalized, Pipeline, progression};
use crate::rows::parse_rows;
use exn::ResultExt;
use serde::de::DeserializeOwned;
use statdata_remote::{ClientHandle, Query, VersionDescriptor};
use statdata_storage::BackendHandle;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Everything one rebuild needs: the remote client, the collection cache,
/// the version being built and the shared stat progression fetch.
///
/// Built once per load and never shared between loads.
pub struct BuildContext {
    client: ClientHandle,
    cache: CollectionCache,
    version: VersionDescriptor,
    stat_tables: Memo<StatTables>,
}

impl BuildContext {
    pub fn new(client: ClientHandle, storage: BackendHandle, version: VersionDescriptor) -> Self {
        Self {
            client,
            cache: CollectionCache::new(storage),
            version,
            stat_tables: Memo::new("statProgressionList"),
        }
    }

    pub fn version(&self) -> &VersionDescriptor {
        &self.version
    }

    pub fn cache(&self) -> &CollectionCache {
        &self.cache
    }

    pub fn stat_tables_state(&self) -> MemoState {
        self.stat_tables.state()
    }

    /// Fetch a collection and parse its rows.
    pub(crate) async fn fetch<T: DeserializeOwned>(&self, query: Query) -> Result<Vec<T>> {
        fetch_rows(&self.client, query).await
    }

    /// `stattable_*` progression tables, fetched at most once per build.
    pub(crate) async fn stat_tables(&self) -> Result<Arc<StatTables>> {
        let client = self.client.clone();
        self.stat_tables.get_or_fetch(move || progression::fetch(client)).await
    }

    /// Return the pipeline's cached output for this version, or run `build`
    /// and cache what it produces.
    ///
    /// A build that succeeds but produces nothing is a failure in its own
    /// right and is never cached.
    pub(crate) async fn cached<T, Fut>(&self, pipeline: Pipeline, build: Fut) -> Result<T>
    where
        T: Normalized,
        Fut: Future<Output = Result<T>>,
    {
        let key = pipeline.cache_key();
        if let Some(data) = self.cache.read::<T>(key, &self.version).await {
            return Ok(data);
        }
        let data = build.await?;
        if data.is_empty() {
            exn::bail!(ErrorKind::EmptyResult(pipeline));
        }
        self.cache.write(key, &self.version, &data).await?;
        Ok(data)
    }
}

/// Fetch a collection and parse its rows, without a build context.
pub(crate) async fn fetch_rows<T: DeserializeOwned>(client: &ClientHandle, query: Query) -> Result<Vec<T>> {
    let started = Instant::now();
    let rows = client.fetch(&query).await.or_raise(|| ErrorKind::Fetch(query.collection.clone()))?;
    tracing::debug!(
        collection = %query.collection,
        rows = rows.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Fetched collection"
    );
    parse_rows(&query.collection, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::models::{GearData, GearEntry, StatTable};
    use statdata_storage::backend::MockBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn context() -> BuildContext {
        BuildContext::new(Arc::new(fixtures::client()), Arc::new(MockBackend::default()), fixtures::version())
    }

    fn gear() -> GearData {
        GearData::from([("001".to_string(), GearEntry { stats: StatTable::new() })])
    }

    #[tokio::test]
    async fn test_cached_builds_once_per_version() {
        let ctx = context();
        let counter = AtomicUsize::new(0);
        let builds = &counter;
        let build = || async move {
            builds.fetch_add(1, Ordering::SeqCst);
            Ok(gear())
        };
        assert_eq!(ctx.cached(Pipeline::Gear, build()).await.unwrap(), gear());
        assert_eq!(ctx.cached(Pipeline::Gear, build()).await.unwrap(), gear());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_result_is_an_error() {
        let ctx = context();
        let err = ctx.cached(Pipeline::ModSet, async { Ok(GearData::new()) }).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::EmptyResult(Pipeline::ModSet)));
    }

    #[tokio::test]
    async fn test_fetch_failure_names_collection() {
        let ctx = context();
        let err = ctx.fetch::<serde_json::Value>(Query::collection("nope")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Fetch(collection) if collection == "nope"));
    }

    #[tokio::test]
    async fn test_stat_tables_shared() {
        let client = Arc::new(fixtures::client());
        let ctx = BuildContext::new(client.clone(), Arc::new(MockBackend::default()), fixtures::version());
        let (a, b) = tokio::join!(ctx.stat_tables(), ctx.stat_tables());
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(client.fetch_count("statProgressionList").await, 1);
    }
}
