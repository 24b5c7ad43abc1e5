use serde::Serialize;
use serde_json::Value;

/// A request for the rows of one collection.
///
/// `filter` restricts which rows come back (field equality), `projection`
/// restricts which fields of each row come back. Both are passed through to
/// the service untouched.
///
/// ```
/// use serde_json::json;
/// use statdata_remote::Query;
///
/// let query = Query::collection("unitsList")
///     .matching(json!({"rarity": 1, "obtainable": true}))
///     .project(json!({"baseId": 1, "combatType": 1}));
/// assert_eq!(query.collection, "unitsList");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub collection: String,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(rename = "project", skip_serializing_if = "Option::is_none")]
    pub projection: Option<Value>,
}
impl Query {
    pub fn collection(name: impl Into<String>) -> Self {
        Self { collection: name.into(), filter: None, projection: None }
    }

    pub fn matching(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn project(mut self, projection: Value) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Does a (raw) row satisfy this query's filter? Every filter field must
    /// be present on the row with an equal value; an absent filter matches
    /// everything.
    pub fn matches(&self, row: &Value) -> bool {
        let Some(Value::Object(filter)) = &self.filter else {
            return true;
        };
        filter.iter().all(|(field, expected)| row.get(field) == Some(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_with_service_field_names() {
        let query = Query::collection("equipmentList").project(json!({"id": 1}));
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"collection": "equipmentList", "project": {"id": 1}})
        );
    }

    #[test]
    fn test_matches() {
        let query = Query::collection("unitsList").matching(json!({"rarity": 1, "obtainable": true}));
        assert!(query.matches(&json!({"baseId": "A", "rarity": 1, "obtainable": true})));
        assert!(!query.matches(&json!({"baseId": "A", "rarity": 2, "obtainable": true})));
        assert!(!query.matches(&json!({"baseId": "A", "obtainable": true})));
        assert!(Query::collection("unitsList").matches(&json!({"anything": 0})));
    }
}
