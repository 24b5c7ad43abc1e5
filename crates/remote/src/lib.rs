//! Boundary to the remote game data service.
//!
//! The service exposes two things this workspace cares about: a version
//! endpoint describing the current dataset, and a query endpoint that resolves
//! `(collection, filter, projection)` to a list of raw rows. Rows are handed
//! back untyped ([`serde_json::Value`]); giving them shape is the builder's job.

mod client;
pub mod error;
#[cfg(feature = "http")]
mod http;
#[cfg(feature = "mock")]
mod mock;
mod query;
mod version;

pub use crate::client::{ClientHandle, RemoteDataClient, Row};
#[cfg(feature = "http")]
pub use crate::http::{Credentials, SwgohHelpClient};
#[cfg(feature = "mock")]
pub use crate::mock::MockClient;
pub use crate::query::Query;
pub use crate::version::VersionDescriptor;
