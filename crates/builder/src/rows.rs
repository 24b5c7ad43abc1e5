//! Raw rows as the remote service returns them.
//!
//! Only the fields the pipelines read are modelled; everything else in a row
//! is ignored. Optional sub-objects default to empty so that sparse rows (a
//! ship has no relic definition, an unstatted gear piece no stat list) parse.

use crate::de;
use crate::error::{ErrorKind, Result};
use crate::models::{StatTable, StatType};
use serde::Deserialize;

/// A stat id as sent by the service: a code, or a name in enum mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum StatId {
    Code(u64),
    Name(String),
}

impl StatId {
    pub(crate) fn resolve(&self) -> Result<StatType> {
        match self {
            StatId::Code(code) => StatType::try_from(*code),
            StatId::Name(name) => name.parse(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatRow {
    pub unit_stat_id: StatId,
    #[serde(deserialize_with = "de::number")]
    pub unscaled_decimal_value: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatList {
    #[serde(default)]
    pub stat_list: Vec<StatRow>,
}

impl StatList {
    pub(crate) fn is_empty(&self) -> bool {
        self.stat_list.is_empty()
    }

    /// Fold the list into a table. Unknown stat ids fail the whole list.
    pub(crate) fn to_table(&self) -> Result<StatTable> {
        self.stat_list.iter().map(|stat| Ok((stat.unit_stat_id.resolve()?, stat.unscaled_decimal_value))).collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EquipmentRow {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default)]
    pub equipment_stat: StatList,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompleteBonus {
    pub stat: StatRow,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatModSetRow {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub complete_bonus: CompleteBonus,
    pub set_count: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KeyValueRow {
    pub key: String,
    #[serde(deserialize_with = "de::number")]
    pub value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableRow {
    pub id: String,
    #[serde(default)]
    pub row_list: Vec<KeyValueRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XpRow {
    pub index: u32,
    #[serde(deserialize_with = "de::number")]
    pub xp: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct XpTableRow {
    pub id: String,
    #[serde(default)]
    pub row_list: Vec<XpRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatProgressionRow {
    pub id: String,
    #[serde(default)]
    pub stat: StatList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SkillTier {
    #[serde(default)]
    pub power_override_tag: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SkillRow {
    pub id: String,
    #[serde(default)]
    pub tier_list: Vec<SkillTier>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UnitTierRow {
    pub tier: u32,
    #[serde(default)]
    pub equipment_set_list: Vec<String>,
    #[serde(default)]
    pub base_stat: StatList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RelicDefinition {
    #[serde(default)]
    pub relic_tier_definition_id_list: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CrewRow {
    pub unit_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SkillReference {
    pub skill_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UnitRow {
    pub base_id: String,
    pub combat_type: u8,
    pub primary_unit_stat: u8,
    #[serde(default)]
    pub unit_tier_list: Vec<UnitTierRow>,
    #[serde(default)]
    pub crew_contribution_table_id: Option<String>,
    #[serde(default)]
    pub crew_list: Vec<CrewRow>,
    #[serde(default)]
    pub category_id_list: Vec<String>,
    #[serde(default)]
    pub skill_reference_list: Vec<SkillReference>,
    #[serde(default)]
    pub base_stat: StatList,
    // `null` for ships
    #[serde(default)]
    pub relic_definition: Option<RelicDefinition>,
}

/// One rarity of a unit, for the growth-modifier index.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UnitGrowthRow {
    pub base_id: String,
    pub rarity: u8,
    pub stat_progression_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RelicTierRow {
    pub id: String,
    #[serde(default)]
    pub stat: StatList,
    pub relic_stat_table: String,
}

/// Parse every row of a collection, failing on the first malformed one.
pub(crate) fn parse_rows<T: for<'de> Deserialize<'de>>(collection: &str, rows: Vec<serde_json::Value>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row)
                .map_err(|e| ErrorKind::ParseError { field: "row", value: format!("{collection}: {e}") })
                .map_err(exn::Exn::from)
        })
        .collect()
}
