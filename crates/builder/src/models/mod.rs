//! Normalized game data.

mod snapshot;
mod stat;
mod table;

pub use self::snapshot::{
    CharacterRecord, CombatType, GameData, GearData, GearEntry, GearTier, GrowthModifiers, ModSetData,
    ModSetEntry, RelicData, RelicEntry, ShipRecord, SkillSummary, SnapshotParts, UnitData, UnitRecord,
};
pub use self::stat::{StatTable, StatType, rarity};
pub use self::table::{ProgressionTable, TableData, TableSet, TableValue, insert_path};

/// Progression table id to its stat table.
pub type StatTables = std::collections::BTreeMap<String, StatTable>;
