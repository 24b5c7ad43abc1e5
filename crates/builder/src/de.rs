//! Lenient deserializers for the service's loosely typed fields.
//!
//! Depending on the collection (and on whether enums were requested) the same
//! logical field arrives as a JSON number or as a numeric string.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// A number, or a string holding one.
pub(crate) fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(value) => Ok(value),
        NumberOrText::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected a numeric value, found {text:?}"))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdOrNumber {
    Id(String),
    Integer(u64),
}

/// An identifier, which some collections send as a bare integer.
pub(crate) fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match IdOrNumber::deserialize(deserializer)? {
        IdOrNumber::Id(id) => id,
        IdOrNumber::Integer(id) => id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "number")]
        value: f64,
        #[serde(deserialize_with = "id")]
        id: String,
    }

    #[rstest]
    #[case(json!({"value": 1.5, "id": "A"}), 1.5, "A")]
    #[case(json!({"value": "250000", "id": 7}), 250000.0, "7")]
    #[case(json!({"value": " -2 ", "id": "007"}), -2.0, "007")]
    fn test_lenient_fields(#[case] raw: serde_json::Value, #[case] value: f64, #[case] id: &str) {
        let row: Row = serde_json::from_value(raw).unwrap();
        assert_eq!(row.value, value);
        assert_eq!(row.id, id);
    }

    #[test]
    fn test_rejects_non_numeric_text() {
        assert!(serde_json::from_value::<Row>(json!({"value": "lots", "id": "A"})).is_err());
    }
}
