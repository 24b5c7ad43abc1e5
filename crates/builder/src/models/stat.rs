//! Stat-type codes and the tables keyed by them.

use crate::error::{ErrorKind, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

macro_rules! stat_types {
    ($($variant:ident = $code:literal => $name:literal,)*) => {
        /// The closed set of stat dimensions the game knows about.
        ///
        /// Serialized as its numeric code, both as a value and as a map key.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u8)]
        pub enum StatType {
            $($variant = $code,)*
        }

        impl StatType {
            pub const ALL: &'static [StatType] = &[$(StatType::$variant,)*];

            /// Upper-snake-case name used by the service's enum mode and by
            /// the mastery tables.
            pub fn name(self) -> &'static str {
                match self {
                    $(StatType::$variant => $name,)*
                }
            }

            pub fn from_code(code: u64) -> Option<Self> {
                match code {
                    $($code => Some(StatType::$variant),)*
                    _ => None,
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(StatType::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

stat_types! {
    MaxHealth = 1 => "MAX_HEALTH",
    Strength = 2 => "STRENGTH",
    Agility = 3 => "AGILITY",
    Intelligence = 4 => "INTELLIGENCE",
    Speed = 5 => "SPEED",
    AttackDamage = 6 => "ATTACK_DAMAGE",
    AbilityPower = 7 => "ABILITY_POWER",
    Armor = 8 => "ARMOR",
    Suppression = 9 => "SUPPRESSION",
    ArmorPenetration = 10 => "ARMOR_PENETRATION",
    SuppressionPenetration = 11 => "SUPPRESSION_PENETRATION",
    DodgeRating = 12 => "DODGE_RATING",
    DeflectionRating = 13 => "DEFLECTION_RATING",
    AttackCriticalRating = 14 => "ATTACK_CRITICAL_RATING",
    AbilityCriticalRating = 15 => "ABILITY_CRITICAL_RATING",
    CriticalDamage = 16 => "CRITICAL_DAMAGE",
    Accuracy = 17 => "ACCURACY",
    Resistance = 18 => "RESISTANCE",
    DodgePercentAdditive = 19 => "DODGE_PERCENT_ADDITIVE",
    DeflectionPercentAdditive = 20 => "DEFLECTION_PERCENT_ADDITIVE",
    AttackCriticalPercentAdditive = 21 => "ATTACK_CRITICAL_PERCENT_ADDITIVE",
    AbilityCriticalPercentAdditive = 22 => "ABILITY_CRITICAL_PERCENT_ADDITIVE",
    ArmorPercentAdditive = 23 => "ARMOR_PERCENT_ADDITIVE",
    SuppressionPercentAdditive = 24 => "SUPPRESSION_PERCENT_ADDITIVE",
    ArmorPenetrationPercentAdditive = 25 => "ARMOR_PENETRATION_PERCENT_ADDITIVE",
    SuppressionPenetrationPercentAdditive = 26 => "SUPPRESSION_PENETRATION_PERCENT_ADDITIVE",
    HealthSteal = 27 => "HEALTH_STEAL",
    MaxShield = 28 => "MAX_SHIELD",
    ShieldPenetration = 29 => "SHIELD_PENETRATION",
    HealthRegen = 30 => "HEALTH_REGEN",
    AttackDamagePercentAdditive = 31 => "ATTACK_DAMAGE_PERCENT_ADDITIVE",
    AbilityPowerPercentAdditive = 32 => "ABILITY_POWER_PERCENT_ADDITIVE",
    DodgeNegatePercentAdditive = 33 => "DODGE_NEGATE_PERCENT_ADDITIVE",
    DeflectionNegatePercentAdditive = 34 => "DEFLECTION_NEGATE_PERCENT_ADDITIVE",
    AttackCriticalNegatePercentAdditive = 35 => "ATTACK_CRITICAL_NEGATE_PERCENT_ADDITIVE",
    AbilityCriticalNegatePercentAdditive = 36 => "ABILITY_CRITICAL_NEGATE_PERCENT_ADDITIVE",
    DodgeNegateRating = 37 => "DODGE_NEGATE_RATING",
    DeflectionNegateRating = 38 => "DEFLECTION_NEGATE_RATING",
    AttackCriticalNegateRating = 39 => "ATTACK_CRITICAL_NEGATE_RATING",
    AbilityCriticalNegateRating = 40 => "ABILITY_CRITICAL_NEGATE_RATING",
    Offense = 41 => "OFFENSE",
    Defense = 42 => "DEFENSE",
    DefensePenetration = 43 => "DEFENSE_PENETRATION",
    EvasionRating = 44 => "EVASION_RATING",
    CriticalRating = 45 => "CRITICAL_RATING",
    EvasionNegateRating = 46 => "EVASION_NEGATE_RATING",
    CriticalNegateRating = 47 => "CRITICAL_NEGATE_RATING",
    OffensePercentAdditive = 48 => "OFFENSE_PERCENT_ADDITIVE",
    DefensePercentAdditive = 49 => "DEFENSE_PERCENT_ADDITIVE",
    DefensePenetrationPercentAdditive = 50 => "DEFENSE_PENETRATION_PERCENT_ADDITIVE",
    EvasionPercentAdditive = 51 => "EVASION_PERCENT_ADDITIVE",
    EvasionNegatePercentAdditive = 52 => "EVASION_NEGATE_PERCENT_ADDITIVE",
    CriticalChancePercentAdditive = 53 => "CRITICAL_CHANCE_PERCENT_ADDITIVE",
    CriticalNegateChancePercentAdditive = 54 => "CRITICAL_NEGATE_CHANCE_PERCENT_ADDITIVE",
    MaxHealthPercentAdditive = 55 => "MAX_HEALTH_PERCENT_ADDITIVE",
    MaxShieldPercentAdditive = 56 => "MAX_SHIELD_PERCENT_ADDITIVE",
    SpeedPercentAdditive = 57 => "SPEED_PERCENT_ADDITIVE",
    CounterAttackRating = 58 => "COUNTER_ATTACK_RATING",
    Taunt = 59 => "TAUNT",
    DefensePenetrationTargetPercentAdditive = 60 => "DEFENSE_PENETRATION_TARGET_PERCENT_ADDITIVE",
}

impl StatType {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Lower-case name of a primary attribute, as used in mastery table ids.
    pub fn primary_name(self) -> Option<&'static str> {
        match self {
            StatType::Strength => Some("strength"),
            StatType::Agility => Some("agility"),
            StatType::Intelligence => Some("intelligence"),
            _ => None,
        }
    }
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StatType {
    type Err = crate::error::Error;

    /// Accepts either the name (`"SPEED"`) or the numeric code (`"5"`).
    fn from_str(s: &str) -> Result<Self> {
        let parsed = match s.parse::<u64>() {
            Ok(code) => StatType::from_code(code),
            Err(_) => StatType::from_name(s),
        };
        parsed.ok_or_else(|| exn::Exn::from(ErrorKind::UnknownStat(s.to_string())))
    }
}

impl TryFrom<u64> for StatType {
    type Error = crate::error::Error;

    fn try_from(code: u64) -> Result<Self> {
        StatType::from_code(code).ok_or_else(|| exn::Exn::from(ErrorKind::UnknownStat(code.to_string())))
    }
}

impl Serialize for StatType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for StatType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        StatType::from_code(code.into())
            .ok_or_else(|| serde::de::Error::custom(format!("unknown stat type code {code}")))
    }
}

/// Stat-type code to value.
pub type StatTable = BTreeMap<StatType, f64>;

/// Star rarity as the service names it.
pub fn rarity(name: &str) -> Result<u8> {
    Ok(match name {
        "ONE_STAR" => 1,
        "TWO_STAR" => 2,
        "THREE_STAR" => 3,
        "FOUR_STAR" => 4,
        "FIVE_STAR" => 5,
        "SIX_STAR" => 6,
        "SEVEN_STAR" => 7,
        _ => exn::bail!(ErrorKind::ParseError { field: "rarity", value: name.to_string() }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_enumeration_is_dense() {
        assert_eq!(StatType::ALL.len(), 60);
        for (index, stat) in StatType::ALL.iter().enumerate() {
            assert_eq!(usize::from(stat.code()), index + 1);
            assert_eq!(StatType::from_name(stat.name()), Some(*stat));
        }
    }

    #[rstest]
    #[case("SPEED", StatType::Speed)]
    #[case("5", StatType::Speed)]
    #[case("60", StatType::DefensePenetrationTargetPercentAdditive)]
    #[case("TAUNT", StatType::Taunt)]
    fn test_parse(#[case] input: &str, #[case] expected: StatType) {
        assert_eq!(input.parse::<StatType>().unwrap(), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("61")]
    #[case("speed")]
    #[case("")]
    fn test_parse_unknown(#[case] input: &str) {
        let err = input.parse::<StatType>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownStat(s) if s == input));
    }

    #[test]
    fn test_table_serializes_codes_as_keys() {
        let table = StatTable::from([(StatType::Speed, 10.0), (StatType::MaxHealth, 250.0)]);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"1":250.0,"5":10.0}"#);
        assert_eq!(serde_json::from_str::<StatTable>(&json).unwrap(), table);
    }

    #[rstest]
    #[case("ONE_STAR", 1)]
    #[case("SEVEN_STAR", 7)]
    fn test_rarity(#[case] name: &str, #[case] expected: u8) {
        assert_eq!(rarity(name).unwrap(), expected);
    }

    #[test]
    fn test_rarity_unknown() {
        assert!(rarity("EIGHT_STAR").is_err());
    }

    #[test]
    fn test_primary_name() {
        assert_eq!(StatType::Agility.primary_name(), Some("agility"));
        assert_eq!(StatType::Speed.primary_name(), None);
    }
}
