//! The five independent fetch-and-transform pipelines.
//!
//! Each produces one slice of [`GameData`](crate::GameData), consulting its
//! own [`CollectionCache`](crate::CollectionCache) entry first. They only
//! share the memoized stat progression tables.

mod consts;
pub(crate) mod gear;
pub(crate) mod mod_set;
pub(crate) mod progression;
pub(crate) mod relic;
pub mod tables;
pub(crate) mod unit;

use crate::models::TableData;
use derive_more::Display;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pipeline {
    #[display("GearData")]
    Gear,
    #[display("ModSetData")]
    ModSet,
    #[display("TableData")]
    Tables,
    #[display("UnitData")]
    Unit,
    #[display("RelicData")]
    Relic,
}

impl Pipeline {
    pub const ALL: [Pipeline; 5] = [Pipeline::Gear, Pipeline::ModSet, Pipeline::Tables, Pipeline::Unit, Pipeline::Relic];

    /// Name of the pipeline's directory in the collection cache.
    pub fn cache_key(self) -> &'static str {
        match self {
            Pipeline::Gear => "gearData",
            Pipeline::ModSet => "modSetData",
            Pipeline::Tables => "tableData",
            Pipeline::Unit => "unitData",
            Pipeline::Relic => "relicData",
        }
    }
}

/// Output of a pipeline, as cached and as checked for emptiness.
pub(crate) trait Normalized: Serialize + DeserializeOwned {
    fn is_empty(&self) -> bool;
}

impl<V: Serialize + DeserializeOwned> Normalized for BTreeMap<String, V> {
    fn is_empty(&self) -> bool {
        BTreeMap::is_empty(self)
    }
}

impl Normalized for TableData {
    fn is_empty(&self) -> bool {
        TableData::is_empty(self)
    }
}
