use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Tier number in a `TIER_03`-style key.
regex!(GEAR_TIER_REGEX, r"TIER_0?(\d+)");
// `<type>_<anything><digit?>`, e.g. `contract_tier3`. The type runs up to the
// last underscore.
regex!(ABILITY_KEY_REGEX, r"^(\w+)_\w+?(\d)?$");
