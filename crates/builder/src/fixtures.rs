//! A small but complete dataset, as served and as expected after a build.

use crate::models::GameData;
use serde_json::{Value, json};
use statdata_remote::{MockClient, VersionDescriptor};

pub(crate) fn version() -> VersionDescriptor {
    VersionDescriptor::new("0.30.1:fixture", "eng_us")
}

pub(crate) fn next_version() -> VersionDescriptor {
    VersionDescriptor::new("0.30.2:fixture", "eng_us")
}

fn stats(pairs: &[(u8, u64)]) -> Value {
    let list: Vec<Value> =
        pairs.iter().map(|(id, value)| json!({"unitStatId": id, "unscaledDecimalValue": value})).collect();
    json!({"statList": list})
}

pub(crate) fn client() -> MockClient {
    MockClient::new(version())
        .with_collection(
            "equipmentList",
            vec![
                json!({"id": "001", "equipmentStat": stats(&[(5, 10000)])}),
                json!({"id": "002", "equipmentStat": stats(&[])}),
            ],
        )
        .with_collection(
            "statModSetList",
            vec![json!({"id": "4", "setCount": 4, "completeBonus": {"stat": {"unitStatId": 57, "unscaledDecimalValue": 100000000}}})],
        )
        .with_collection(
            "tableList",
            vec![
                json!({"id": "crew_rating_per_relic_tier", "rowList": [{"key": "3", "value": "60"}]}),
                json!({"id": "galactic_power_per_complete_gear_tier_table", "rowList": [{"key": "TIER_04", "value": "100"}]}),
                json!({"id": "crew_rating_per_mod_rarity_level_tier", "rowList": [
                    {"key": "2:5:1:0", "value": "10"},
                    {"key": "2:5:2:0", "value": "20"},
                    {"key": "2:5:1:3", "value": "99"},
                ]}),
                json!({"id": "strength_role_tank_mastery", "rowList": [{"key": "MAX_HEALTH", "value": "0.5"}]}),
                json!({"id": "unused_table", "rowList": [{"key": "a", "value": "1"}]}),
            ],
        )
        .with_collection(
            "xpTableList",
            vec![json!({"id": "crew_rating_per_unit_level", "rowList": [{"index": 0, "xp": 0}, {"index": 1, "xp": 10}]})],
        )
        .with_collection(
            "statProgressionList",
            vec![
                json!({"id": "stattable_hero_1", "stat": stats(&[(2, 15)])}),
                json!({"id": "stattable_crew", "stat": stats(&[(5, 1)])}),
                json!({"id": "stattable_relic", "stat": stats(&[(1, 3)])}),
                json!({"id": "other_table", "stat": stats(&[])}),
            ],
        )
        .with_collection(
            "skillList",
            vec![json!({"id": "hero_special", "tierList": [{}, {"powerOverrideTag": "zeta"}]})],
        )
        .with_collection(
            "unitsList",
            vec![
                json!({
                    "baseId": "HERO",
                    "rarity": 1,
                    "obtainable": true,
                    "obtainableTime": 0,
                    "combatType": 1,
                    "primaryUnitStat": 2,
                    "statProgressionId": "stattable_hero_1",
                    "categoryIdList": ["alignment_light", "role_leader", "role_tank"],
                    "skillReferenceList": [{"skillId": "hero_special"}],
                    "unitTierList": [{"tier": 1, "equipmentSetList": ["001"], "baseStat": stats(&[(2, 20)])}],
                    "relicDefinition": {"relicTierDefinitionIdList": ["RELIC_TIER_01"]},
                    "baseStat": stats(&[]),
                }),
                json!({
                    "baseId": "HERO",
                    "rarity": 2,
                    "obtainable": true,
                    "obtainableTime": 0,
                    "combatType": 1,
                    "primaryUnitStat": 2,
                    "statProgressionId": "stattable_missing",
                }),
                json!({
                    "baseId": "SHIP",
                    "rarity": 1,
                    "obtainable": true,
                    "obtainableTime": 0,
                    "combatType": 2,
                    "primaryUnitStat": 2,
                    "statProgressionId": "stattable_hero_1",
                    "crewContributionTableId": "stattable_crew",
                    "crewList": [{"unitId": "HERO"}],
                    "baseStat": stats(&[(5, 100)]),
                    "relicDefinition": null,
                }),
                json!({
                    "baseId": "LOCKED",
                    "rarity": 1,
                    "obtainable": false,
                    "obtainableTime": 0,
                    "combatType": 1,
                    "primaryUnitStat": 2,
                    "statProgressionId": "stattable_hero_1",
                }),
            ],
        )
        .with_collection(
            "relicTierDefinitionList",
            vec![json!({"id": "RELIC_TIER_01", "relicStatTable": "stattable_relic", "stat": stats(&[(1, 100)])})],
        )
}

/// What a build of [`client`]'s data must produce.
pub(crate) fn snapshot() -> GameData {
    serde_json::from_value(json!({
        "gearData": {"001": {"stats": {"5": 10000}}},
        "modSetData": {"4": {"id": 57, "count": 4, "value": 100000000}},
        "crTables": {
            "relicTierCR": {"5": 60},
            "modRarityLevelCR": {"2": {"5": 10}},
            "strength_role_tank_mastery": {"1": 0.5},
            "unitLevelCR": {"1": 0, "2": 10},
        },
        "gpTables": {
            "gearLevelGP": {"5": 100},
            "modRarityLevelTierGP": {"2": {"5": {"1": 10, "2": 20}}},
            "unitLevelGP": {"1": 0, "2": 10},
        },
        "unitData": {
            "HERO": {
                "combatType": 1,
                "primaryStat": 2,
                "gearLvl": {"1": {"gear": ["001"], "stats": {"2": 20}}},
                "growthModifiers": {"1": {"2": 15}},
                "skills": [{"id": "hero_special", "maxTier": 3, "isZeta": true}],
                "relic": {"3": "RELIC_TIER_01"},
                "masteryModifierID": "strength_role_tank_mastery",
            },
            "SHIP": {
                "combatType": 2,
                "primaryStat": 2,
                "stats": {"5": 100},
                "growthModifiers": {"1": {"2": 15}},
                "crewStats": {"5": 1},
                "crew": ["HERO"],
            },
        },
        "relicData": {"RELIC_TIER_01": {"stats": {"1": 100}, "gms": {"1": 3}}},
    }))
    .unwrap()
}
