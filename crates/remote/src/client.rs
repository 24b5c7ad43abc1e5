use crate::error::Result;
use crate::{Query, VersionDescriptor};
use async_trait::async_trait;
use std::sync::Arc;

/// One raw record of a collection, exactly as the service returned it.
pub type Row = serde_json::Value;

pub type ClientHandle = Arc<dyn RemoteDataClient + Send + Sync>;

/// The only network contract the builder depends on.
///
/// Timeouts, retries and authentication are the implementation's business;
/// callers only see rows or an error. An error must short-circuit whatever
/// transformation asked for the rows.
#[async_trait]
pub trait RemoteDataClient: Send + Sync {
    /// Fetch the descriptor of the dataset currently served.
    ///
    /// "Unreachable" and "unparseable" are both errors, distinct from a
    /// successful answer that happens to match what's already persisted.
    async fn version(&self) -> Result<VersionDescriptor>;

    /// Resolve a query to its rows.
    async fn fetch(&self, query: &Query) -> Result<Vec<Row>>;
}
