use crate::context::BuildContext;
use crate::error::{ErrorKind, Result};
use crate::models::{
    CharacterRecord, CombatType, GearTier, GrowthModifiers, ShipRecord, SkillSummary, StatTables, StatType, UnitData,
    UnitRecord,
};
use crate::pipeline::Pipeline;
use crate::rows::{SkillRow, UnitGrowthRow, UnitRow};
use serde_json::json;
use statdata_remote::Query;
use std::collections::BTreeMap;
use tracing::instrument;

type SkillIndex = BTreeMap<String, SkillSummary>;
type GrowthIndex = BTreeMap<String, GrowthModifiers>;

/// Playable units: one row per unit, at its starting rarity.
fn playable_units() -> Query {
    Query::collection("unitsList")
        .matching(json!({"rarity": 1, "obtainable": true, "obtainableTime": 0}))
        .project(json!({
            "combatType": 1,
            "primaryUnitStat": 1,
            "baseId": 1,
            "unitTierList": 1,
            "crewContributionTableId": 1,
            "crewList": 1,
            "categoryIdList": 1,
            "skillReferenceList": 1,
            "baseStat": 1,
            "relicDefinition": 1,
        }))
}

/// Every rarity of every obtainable unit. Growth modifiers differ per rarity,
/// which the playable list doesn't carry.
fn unit_rarities() -> Query {
    Query::collection("unitsList")
        .matching(json!({"obtainable": true, "obtainableTime": 0}))
        .project(json!({"rarity": 1, "baseId": 1, "statProgressionId": 1}))
}

#[instrument(skip_all, fields(pipeline = %Pipeline::Unit))]
pub(crate) async fn load(ctx: &BuildContext) -> Result<UnitData> {
    ctx.cached(Pipeline::Unit, async {
        let skills = Query::collection("skillList").project(json!({"id": 1, "tierList": 1}));
        let (stat_tables, skills, units, rarities) = futures::try_join!(
            ctx.stat_tables(),
            ctx.fetch(skills),
            ctx.fetch(playable_units()),
            ctx.fetch(unit_rarities()),
        )?;
        normalize(units, &skill_index(skills), &growth_index(rarities, &stat_tables), &stat_tables)
    })
    .await
}

pub(crate) fn skill_index(rows: Vec<SkillRow>) -> SkillIndex {
    rows.into_iter()
        .map(|skill| {
            let summary = SkillSummary {
                id: skill.id.clone(),
                max_tier: skill.tier_list.len() as u32 + 1,
                is_zeta: skill
                    .tier_list
                    .last()
                    .is_some_and(|tier| tier.power_override_tag.as_deref() == Some("zeta")),
            };
            (skill.id, summary)
        })
        .collect()
}

/// Base id to rarity to growth modifiers. References to progression tables
/// that don't exist are left out.
pub(crate) fn growth_index(rows: Vec<UnitGrowthRow>, stat_tables: &StatTables) -> GrowthIndex {
    let mut index = GrowthIndex::new();
    for row in rows {
        let unit = index.entry(row.base_id).or_default();
        if let Some(table) = stat_tables.get(&row.stat_progression_id) {
            unit.insert(row.rarity, table.clone());
        }
    }
    index
}

pub(crate) fn normalize(
    units: Vec<UnitRow>,
    skills: &SkillIndex,
    growth: &GrowthIndex,
    stat_tables: &StatTables,
) -> Result<UnitData> {
    let mut data = UnitData::new();
    for unit in units {
        let record = match unit.combat_type {
            1 => UnitRecord::Character(character(&unit, skills, growth)?),
            2 => UnitRecord::Ship(ship(&unit, growth, stat_tables)?),
            other => exn::bail!(ErrorKind::ParseError { field: "combatType", value: other.to_string() }),
        };
        data.insert(unit.base_id, record);
    }
    Ok(data)
}

fn character(unit: &UnitRow, skills: &SkillIndex, growth: &GrowthIndex) -> Result<CharacterRecord> {
    let gear_lvl = unit
        .unit_tier_list
        .iter()
        .map(|tier| Ok((tier.tier, GearTier { gear: tier.equipment_set_list.clone(), stats: tier.base_stat.to_table()? })))
        .collect::<Result<_>>()?;
    let relic = unit
        .relic_definition
        .iter()
        .flat_map(|definition| &definition.relic_tier_definition_id_list)
        .map(|id| Ok((relic_tier(id)?, id.clone())))
        .collect::<Result<_>>()?;
    Ok(CharacterRecord {
        combat_type: CombatType::Character,
        primary_stat: unit.primary_unit_stat,
        gear_lvl,
        growth_modifiers: growth.get(&unit.base_id).cloned(),
        skills: unit.skill_reference_list.iter().map(|skill| skills.get(&skill.skill_id).cloned()).collect(),
        relic,
        mastery_modifier_id: mastery_modifier_id(unit)?,
    })
}

fn ship(unit: &UnitRow, growth: &GrowthIndex, stat_tables: &StatTables) -> Result<ShipRecord> {
    Ok(ShipRecord {
        combat_type: CombatType::Ship,
        primary_stat: unit.primary_unit_stat,
        stats: unit.base_stat.to_table()?,
        growth_modifiers: growth.get(&unit.base_id).cloned(),
        crew_stats: unit.crew_contribution_table_id.as_ref().and_then(|id| stat_tables.get(id)).cloned(),
        crew: unit.crew_list.iter().map(|crew| crew.unit_id.clone()).collect(),
    })
}

/// Relic tier definition ids end in a two-digit tier enum, which runs two
/// behind the relic level.
fn relic_tier(id: &str) -> Result<u32> {
    id.get(id.len().saturating_sub(2)..)
        .and_then(|suffix| suffix.parse::<u32>().ok())
        .map(|tier| tier + 2)
        .ok_or_else(|| exn::Exn::from(ErrorKind::ParseError { field: "relicTierDefinitionId", value: id.to_string() }))
}

/// `role_attacker`, but not `role_leader` or anything without a name.
fn is_role_tag(tag: &str) -> bool {
    tag.strip_prefix("role_")
        .is_some_and(|role| !role.starts_with("leader") && role.chars().next().is_some_and(|c| c != '_'))
}

/// `{primary stat}_{role tag}_mastery`, e.g. `strength_role_tank_mastery`.
/// Matches the ids of the mastery tables in `crTables`.
pub(crate) fn mastery_modifier_id(unit: &UnitRow) -> Result<String> {
    let primary = StatType::from_code(unit.primary_unit_stat.into()).and_then(StatType::primary_name).ok_or_else(
        || ErrorKind::ParseError { field: "primaryUnitStat", value: unit.primary_unit_stat.to_string() },
    )?;
    let role = unit
        .category_id_list
        .iter()
        .find(|tag| is_role_tag(tag))
        .ok_or_else(|| ErrorKind::MissingRole(unit.base_id.clone()))?;
    Ok(format!("{primary}_{role}_mastery"))
}
