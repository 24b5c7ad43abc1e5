//! The assembled dataset and its per-pipeline slices.

use crate::models::stat::{StatTable, StatType};
use crate::models::table::{TableData, TableSet};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearEntry {
    pub stats: StatTable,
}

/// Completion bonus of a mod set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModSetEntry {
    /// Stat the bonus applies to.
    pub id: StatType,
    /// Number of mods needed to complete the set.
    pub count: u32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelicEntry {
    pub stats: StatTable,
    /// Growth modifiers, when the referenced progression table exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gms: Option<StatTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSummary {
    pub id: String,
    pub max_tier: u32,
    pub is_zeta: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearTier {
    /// Equipment ids, in slot order.
    pub gear: Vec<String>,
    pub stats: StatTable,
}

/// Rarity to growth-modifier table.
pub type GrowthModifiers = BTreeMap<u8, StatTable>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatType {
    Character = 1,
    Ship = 2,
}

impl Serialize for CombatType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for CombatType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(CombatType::Character),
            2 => Ok(CombatType::Ship),
            other => Err(serde::de::Error::custom(format!("unknown combat type {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    pub combat_type: CombatType,
    pub primary_stat: u8,
    /// Gear tier to the equipment and base stats at that tier.
    pub gear_lvl: BTreeMap<u32, GearTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_modifiers: Option<GrowthModifiers>,
    /// Skill summaries in the unit's own order; `None` for an unknown skill.
    pub skills: Vec<Option<SkillSummary>>,
    /// Relic tier to relic tier definition id.
    pub relic: BTreeMap<u32, String>,
    #[serde(rename = "masteryModifierID")]
    pub mastery_modifier_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipRecord {
    pub combat_type: CombatType,
    pub primary_stat: u8,
    pub stats: StatTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_modifiers: Option<GrowthModifiers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crew_stats: Option<StatTable>,
    /// Crew member base ids, in seat order.
    pub crew: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitRecord {
    Character(CharacterRecord),
    Ship(ShipRecord),
}

impl UnitRecord {
    pub fn combat_type(&self) -> CombatType {
        match self {
            UnitRecord::Character(character) => character.combat_type,
            UnitRecord::Ship(ship) => ship.combat_type,
        }
    }
}

pub type GearData = BTreeMap<String, GearEntry>;
pub type ModSetData = BTreeMap<String, ModSetEntry>;
pub type UnitData = BTreeMap<String, UnitRecord>;
pub type RelicData = BTreeMap<String, RelicEntry>;

/// Everything the stat calculator needs, tied to one dataset version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameData {
    pub gear_data: GearData,
    pub mod_set_data: ModSetData,
    pub cr_tables: TableSet,
    pub gp_tables: TableSet,
    pub unit_data: UnitData,
    pub relic_data: RelicData,
}

/// A snapshot under construction. Each pipeline fills its own slot.
#[derive(Debug, Default)]
pub struct SnapshotParts {
    pub gear_data: Option<GearData>,
    pub mod_set_data: Option<ModSetData>,
    pub tables: Option<TableData>,
    pub unit_data: Option<UnitData>,
    pub relic_data: Option<RelicData>,
}

impl SnapshotParts {
    pub fn is_complete(&self) -> bool {
        self.gear_data.is_some()
            && self.mod_set_data.is_some()
            && self.tables.is_some()
            && self.unit_data.is_some()
            && self.relic_data.is_some()
    }

    /// The finished snapshot, if every slot was filled.
    pub fn assemble(self) -> Option<GameData> {
        let tables = self.tables?;
        Some(GameData {
            gear_data: self.gear_data?,
            mod_set_data: self.mod_set_data?,
            cr_tables: tables.cr,
            gp_tables: tables.gp,
            unit_data: self.unit_data?,
            relic_data: self.relic_data?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ship() -> UnitRecord {
        UnitRecord::Ship(ShipRecord {
            combat_type: CombatType::Ship,
            primary_stat: 2,
            stats: StatTable::from([(StatType::Speed, 10.0)]),
            growth_modifiers: None,
            crew_stats: None,
            crew: vec!["PILOT".into()],
        })
    }

    #[test]
    fn test_unit_records_use_downstream_names() {
        let character = UnitRecord::Character(CharacterRecord {
            combat_type: CombatType::Character,
            primary_stat: 3,
            gear_lvl: BTreeMap::from([(1, GearTier { gear: vec!["001".into()], stats: StatTable::new() })]),
            growth_modifiers: Some(GrowthModifiers::from([(1, StatTable::new())])),
            skills: vec![None],
            relic: BTreeMap::from([(3, "RELIC_01".into())]),
            mastery_modifier_id: "agility_role_attacker_mastery".into(),
        });
        let value = serde_json::to_value(&character).unwrap();
        assert_eq!(value["combatType"], json!(1));
        assert_eq!(value["masteryModifierID"], json!("agility_role_attacker_mastery"));
        assert_eq!(value["gearLvl"]["1"]["gear"], json!(["001"]));
        assert_eq!(value["skills"], json!([null]));
        assert_eq!(serde_json::from_value::<UnitRecord>(value).unwrap(), character);

        let value = serde_json::to_value(ship()).unwrap();
        assert_eq!(value, json!({"combatType": 2, "primaryStat": 2, "stats": {"5": 10.0}, "crew": ["PILOT"]}));
        let parsed = serde_json::from_value::<UnitRecord>(value).unwrap();
        assert_eq!(parsed.combat_type(), CombatType::Ship);
    }

    #[test]
    fn test_assemble_requires_every_slot() {
        let mut parts = SnapshotParts {
            gear_data: Some(GearData::new()),
            mod_set_data: Some(ModSetData::new()),
            tables: Some(TableData::default()),
            unit_data: Some(UnitData::from([("SHIP".to_string(), ship())])),
            relic_data: None,
        };
        assert!(!parts.is_complete());
        parts.relic_data = Some(RelicData::new());
        assert!(parts.is_complete());
        let snapshot = parts.assemble().unwrap();
        let keys: Vec<String> = serde_json::to_value(&snapshot).unwrap().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["crTables", "gearData", "gpTables", "modSetData", "relicData", "unitData"]);
    }
}
