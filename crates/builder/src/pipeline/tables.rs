//! CR and GP lookup tables.
//!
//! Two collections feed this pipeline. `tableList` holds named key/value
//! tables, each routed by its id through [`TABLE_HANDLERS`]. `xpTableList`
//! holds level curves, routed through [`XP_TABLE_TARGETS`]. Both are fetched
//! concurrently; where a table lands depends only on its id, so the result is
//! the same whichever fetch finishes first.

use crate::context::BuildContext;
use crate::error::{ErrorKind, Result};
use crate::models::{ProgressionTable, StatType, TableData, TableSet, TableValue, insert_path, rarity};
use crate::pipeline::Pipeline;
use crate::pipeline::consts::{ABILITY_KEY_REGEX, GEAR_TIER_REGEX};
use crate::rows::{KeyValueRow, TableRow, XpTableRow};
use statdata_remote::Query;
use tracing::instrument;

/// Which output tree a table is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tree {
    Cr,
    Gp,
}

/// How a row key becomes a table index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRule {
    Verbatim,
    /// `ONE_STAR`..`SEVEN_STAR` to `1`..`7`.
    Rarity,
    /// The number in `TIER_03`.
    GearTier,
    /// As [`GearTier`](KeyRule::GearTier), plus one. A completed tier is one
    /// below the gear level it unlocks.
    CompleteGearTier,
    /// The service's relic tier enum, which is the relic level minus two.
    RelicTier,
    /// Stat name to stat code.
    StatName,
}

impl KeyRule {
    pub fn index(self, key: &str) -> Result<String> {
        Ok(match self {
            KeyRule::Verbatim => key.to_string(),
            KeyRule::Rarity => rarity(key)?.to_string(),
            KeyRule::GearTier => gear_tier(key)?.to_string(),
            KeyRule::CompleteGearTier => {
                gear_tier(key)?.checked_add(1).ok_or_else(|| out_of_range("gear tier", key))?.to_string()
            },
            KeyRule::RelicTier => parse_number::<i64>("relic tier", key)?
                .checked_add(2)
                .ok_or_else(|| out_of_range("relic tier", key))?
                .to_string(),
            KeyRule::StatName => key.parse::<StatType>()?.code().to_string(),
        })
    }
}

/// What to do with a table from `tableList`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableHandler {
    /// One flat table, written under every `(tree, name)` target.
    Flat { key: KeyRule, targets: &'static [(Tree, &'static str)] },
    /// `tier:slot` keys to `gp.gearPieceGP[tier][slot]`.
    TierSlot,
    /// Ability upgrade costs to `gp.abilitySpecialCR`.
    TaggedAbility,
    /// `pips:level:tier:set` keys to `cr.modRarityLevelCR[pips][level]` and
    /// `gp.modRarityLevelTierGP[pips][level][tier]`.
    ModRarityLevelTier,
    /// Mastery multipliers, kept under their own id in the `cr` tree with
    /// stat codes as keys. They aren't CR tables, but earlier consumers
    /// expect them there.
    Mastery,
    /// Not needed by the stat calculator.
    Ignored,
}

use self::KeyRule as K;
use self::Tree::{Cr, Gp};

pub const TABLE_HANDLERS: &[(&str, TableHandler)] = &[
    (
        "galactic_power_modifier_per_ship_crew_size_table",
        TableHandler::Flat { key: K::Verbatim, targets: &[(Gp, "crewSizeFactor"), (Cr, "crewSizeFactor")] },
    ),
    (
        "crew_rating_per_unit_rarity",
        TableHandler::Flat { key: K::Rarity, targets: &[(Cr, "crewRarityCR"), (Gp, "crewRarityGP")] },
    ),
    ("crew_rating_per_gear_piece_at_tier", TableHandler::Flat { key: K::GearTier, targets: &[(Cr, "gearPieceCR")] }),
    (
        "galactic_power_per_complete_gear_tier_table",
        TableHandler::Flat { key: K::CompleteGearTier, targets: &[(Gp, "gearLevelGP")] },
    ),
    ("galactic_power_per_tier_slot_table", TableHandler::TierSlot),
    (
        "crew_contribution_multiplier_per_rarity",
        TableHandler::Flat { key: K::Rarity, targets: &[(Cr, "shipRarityFactor"), (Gp, "shipRarityFactor")] },
    ),
    ("galactic_power_per_tagged_ability_level_table", TableHandler::TaggedAbility),
    ("crew_rating_per_mod_rarity_level_tier", TableHandler::ModRarityLevelTier),
    (
        "crew_rating_modifier_per_relic_tier",
        TableHandler::Flat { key: K::RelicTier, targets: &[(Cr, "relicTierLevelFactor")] },
    ),
    ("crew_rating_per_relic_tier", TableHandler::Flat { key: K::RelicTier, targets: &[(Cr, "relicTierCR")] }),
    (
        "galactic_power_modifier_per_relic_tier",
        TableHandler::Flat { key: K::RelicTier, targets: &[(Gp, "relicTierLevelFactor")] },
    ),
    ("galactic_power_per_relic_tier", TableHandler::Flat { key: K::RelicTier, targets: &[(Gp, "relicTierGP")] }),
    (
        "crew_rating_modifier_per_ability_crewless_ships",
        TableHandler::Flat { key: K::Verbatim, targets: &[(Cr, "crewlessAbilityFactor")] },
    ),
    (
        "galactic_power_modifier_per_ability_crewless_ships",
        TableHandler::Flat { key: K::Verbatim, targets: &[(Gp, "crewlessAbilityFactor")] },
    ),
];

/// Tables whose id ends with this are [mastery](TableHandler::Mastery)
/// tables.
pub const MASTERY_SUFFIX: &str = "_mastery";

impl TableHandler {
    pub fn for_table(id: &str) -> TableHandler {
        match TABLE_HANDLERS.iter().find(|(known, _)| *known == id) {
            Some((_, handler)) => *handler,
            None if id.ends_with(MASTERY_SUFFIX) => TableHandler::Mastery,
            None => TableHandler::Ignored,
        }
    }
}

/// `xpTableList` ids kept, and where. Character level curves serve both CR
/// and GP.
pub const XP_TABLE_TARGETS: &[(&str, &[(Tree, &str)])] = &[
    ("crew_rating_per_unit_level", &[(Cr, "unitLevelCR"), (Gp, "unitLevelGP")]),
    ("crew_rating_per_ability_level", &[(Cr, "abilityLevelCR"), (Gp, "abilityLevelGP")]),
    ("galactic_power_per_ship_level_table", &[(Gp, "shipLevelGP")]),
    ("galactic_power_per_ship_ability_level_table", &[(Gp, "shipAbilityLevelGP")]),
];

const XP_TABLE_PREFIXES: [&str; 2] = ["crew_rating", "galactic_power"];

#[instrument(skip_all, fields(pipeline = %Pipeline::Tables))]
pub(crate) async fn load(ctx: &BuildContext) -> Result<TableData> {
    ctx.cached(Pipeline::Tables, async {
        let (tables, xp_tables) =
            futures::try_join!(ctx.fetch(Query::collection("tableList")), ctx.fetch(Query::collection("xpTableList")))?;
        let mut data = normalize_tables(&tables)?;
        data.merge(normalize_xp_tables(&xp_tables)?);
        Ok(data)
    })
    .await
}

fn tree(data: &mut TableData, tree: Tree) -> &mut TableSet {
    match tree {
        Tree::Cr => &mut data.cr,
        Tree::Gp => &mut data.gp,
    }
}

pub(crate) fn normalize_tables(tables: &[TableRow]) -> Result<TableData> {
    let mut data = TableData::default();
    for table in tables {
        apply(&mut data, TableHandler::for_table(&table.id), table)?;
    }
    Ok(data)
}

fn apply(data: &mut TableData, handler: TableHandler, table: &TableRow) -> Result<()> {
    match handler {
        TableHandler::Flat { key, targets } => {
            let flat = flat_table(key, &table.row_list)?;
            for (target, name) in targets {
                tree(data, *target).insert((*name).to_string(), flat.clone());
            }
        },
        TableHandler::TierSlot => {
            let mut gear_piece = ProgressionTable::new();
            for row in &table.row_list {
                let (tier, slot) = row
                    .key
                    .split_once(':')
                    .ok_or_else(|| ErrorKind::ParseError { field: "tier:slot", value: row.key.clone() })?;
                insert_path(&mut gear_piece, &[tier, slot], row.value);
            }
            data.gp.insert("gearPieceGP".to_string(), gear_piece);
        },
        TableHandler::TaggedAbility => {
            data.gp.insert("abilitySpecialCR".to_string(), tagged_abilities(&table.row_list));
        },
        TableHandler::ModRarityLevelTier => {
            let (cr, gp) = mod_rarity_level_tier(&table.row_list)?;
            data.cr.insert("modRarityLevelCR".to_string(), cr);
            data.gp.insert("modRarityLevelTierGP".to_string(), gp);
        },
        TableHandler::Mastery => {
            data.cr.insert(table.id.clone(), flat_table(KeyRule::StatName, &table.row_list)?);
        },
        TableHandler::Ignored => tracing::trace!(table = %table.id, "Skipping unused table"),
    }
    Ok(())
}

fn flat_table(key: KeyRule, rows: &[KeyValueRow]) -> Result<ProgressionTable> {
    rows.iter().map(|row| Ok((key.index(&row.key)?, TableValue::Value(row.value)))).collect()
}

fn tagged_abilities(rows: &[KeyValueRow]) -> ProgressionTable {
    let mut table = ProgressionTable::new();
    for row in rows {
        if row.key == "zeta" {
            table.insert(row.key.clone(), TableValue::Value(row.value));
            continue;
        }
        let Some(captures) = ABILITY_KEY_REGEX.captures(&row.key) else {
            tracing::warn!(key = %row.key, "Unknown ability type found");
            continue;
        };
        let level = captures.get(2).and_then(|level| level.as_str().parse::<u32>().ok());
        match (&captures[1], level) {
            ("contract", level) => {
                let level = level.map_or(1, |level| level + 1).to_string();
                insert_path(&mut table, &["contract", &level], row.value);
            },
            ("reinforcement", Some(level)) => {
                if !table.contains_key("hardware") {
                    // Tier 1 hardware costs nothing
                    insert_path(&mut table, &["hardware", "1"], 0.0);
                }
                insert_path(&mut table, &["hardware", &(level + 1).to_string()], row.value);
            },
            _ => tracing::warn!(key = %row.key, "Unknown ability type found"),
        }
    }
    table
}

fn mod_rarity_level_tier(rows: &[KeyValueRow]) -> Result<(ProgressionTable, ProgressionTable)> {
    let mut cr = ProgressionTable::new();
    let mut gp = ProgressionTable::new();
    for row in rows {
        let parts: Vec<&str> = row.key.split(':').collect();
        let [pips, level, tier, set] = parts[..] else {
            exn::bail!(ErrorKind::ParseError { field: "pips:level:tier:set", value: row.key.clone() });
        };
        // The set doesn't affect CR or GP
        if set != "0" {
            continue;
        }
        // Neither does the tier, for CR
        if parse_number::<u32>("tier", tier)? == 1 {
            insert_path(&mut cr, &[pips, level], row.value);
        }
        insert_path(&mut gp, &[pips, level, tier], row.value);
    }
    Ok((cr, gp))
}

pub(crate) fn normalize_xp_tables(tables: &[XpTableRow]) -> Result<TableData> {
    let mut data = TableData::default();
    for table in tables {
        if !XP_TABLE_PREFIXES.iter().any(|prefix| table.id.starts_with(prefix)) {
            continue;
        }
        let Some((_, targets)) = XP_TABLE_TARGETS.iter().find(|(id, _)| *id == table.id) else {
            tracing::trace!(table = %table.id, "Skipping unused XP table");
            continue;
        };
        // Levels are one-based, row indices zero-based
        let levels = table
            .row_list
            .iter()
            .map(|row| {
                let level = row.index.checked_add(1).ok_or_else(|| out_of_range("index", &row.index.to_string()))?;
                Ok((level.to_string(), TableValue::Value(row.xp)))
            })
            .collect::<Result<ProgressionTable>>()?;
        for (target, name) in *targets {
            tree(&mut data, *target).insert((*name).to_string(), levels.clone());
        }
    }
    Ok(data)
}

fn gear_tier(key: &str) -> Result<u32> {
    let tier = GEAR_TIER_REGEX
        .captures(key)
        .and_then(|captures| captures.get(1))
        .ok_or_else(|| ErrorKind::ParseError { field: "gear tier", value: key.to_string() })?;
    parse_number("gear tier", tier.as_str())
}

fn out_of_range(field: &'static str, value: &str) -> ErrorKind {
    ErrorKind::ParseError { field, value: value.to_string() }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| exn::Exn::from(out_of_range(field, value)))
}
