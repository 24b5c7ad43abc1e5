//! Game data builder.
//!
//! Turns the remote service's irregular collections into the compact lookup
//! tables the stat calculator consumes, and keeps a persisted copy of them
//! tied to the dataset version they were built from.
//!
//! # Flow
//! 1. [`VersionGate`] compares the remote version with the persisted one.
//! 2. On a mismatch, the [orchestrator](crate::orchestrator) runs the five
//!    [pipelines](crate::pipeline::Pipeline) concurrently. Each consults its
//!    own [`CollectionCache`] entry before touching the network; the unit and
//!    relic pipelines share one memoized stat progression fetch.
//! 3. [`DataLoader`] persists the assembled [`GameData`] together with its
//!    version, or falls back to the last persisted snapshot.

mod cache;
mod context;
mod de;
pub mod error;
#[cfg(test)]
mod fixtures;
mod gate;
mod loader;
mod memo;
pub mod models;
pub mod orchestrator;
pub mod pipeline;
mod rows;
mod store;

pub use crate::cache::CollectionCache;
pub use crate::context::BuildContext;
pub use crate::gate::{VersionCheck, VersionGate};
pub use crate::loader::{DataLoader, LoadOutcome};
pub use crate::memo::{Memo, MemoState};
pub use crate::models::GameData;
pub use crate::store::SnapshotStore;
pub use statdata_remote::VersionDescriptor;
