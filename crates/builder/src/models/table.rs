//! CR/GP lookup tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One level of a progression table: either a number or a further nesting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableValue {
    Value(f64),
    Table(ProgressionTable),
}

/// Index (level, tier, rarity, stat code, ...) to value or nested table.
pub type ProgressionTable = BTreeMap<String, TableValue>;

/// Named tables making up one of the `crTables`/`gpTables` trees.
pub type TableSet = BTreeMap<String, ProgressionTable>;

/// Insert `value` at `path` below `table`, creating intermediate tables.
///
/// A scalar sitting where a nested table is needed gets replaced.
pub fn insert_path(table: &mut ProgressionTable, path: &[&str], value: f64) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = table;
    for key in parents {
        let slot = current.entry((*key).to_string()).or_insert_with(|| TableValue::Table(ProgressionTable::new()));
        if let TableValue::Value(_) = slot {
            *slot = TableValue::Table(ProgressionTable::new());
        }
        match slot {
            TableValue::Table(next) => current = next,
            TableValue::Value(_) => return,
        }
    }
    current.insert((*last).to_string(), TableValue::Value(value));
}

/// Both output trees produced by the table pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub cr: TableSet,
    pub gp: TableSet,
}

impl TableData {
    /// Merge another set of tables in. Table names are disjoint across
    /// sources, so the result doesn't depend on merge order.
    pub fn merge(&mut self, other: TableData) {
        self.cr.extend(other.cr);
        self.gp.extend(other.gp);
    }

    pub fn is_empty(&self) -> bool {
        self.cr.is_empty() && self.gp.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_path_nests() {
        let mut table = ProgressionTable::new();
        insert_path(&mut table, &["2", "5", "1"], 10.0);
        insert_path(&mut table, &["2", "5", "2"], 12.0);
        insert_path(&mut table, &["3"], 1.0);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json, serde_json::json!({"2": {"5": {"1": 10.0, "2": 12.0}}, "3": 1.0}));
    }

    #[test]
    fn test_insert_path_replaces_scalar_parent() {
        let mut table = ProgressionTable::new();
        insert_path(&mut table, &["1"], 0.0);
        insert_path(&mut table, &["1", "2"], 5.0);
        assert_eq!(table["1"], TableValue::Table(ProgressionTable::from([("2".to_string(), TableValue::Value(5.0))])));
    }

    #[test]
    fn test_merge_is_order_independent() {
        let mut a = TableData::default();
        a.cr.insert("gearPieceCR".into(), ProgressionTable::new());
        let mut b = TableData::default();
        b.gp.insert("unitLevelGP".into(), ProgressionTable::new());

        let mut ab = a.clone();
        ab.merge(b.clone());
        let mut ba = b;
        ba.merge(a);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_untagged_roundtrip() {
        let json = r#"{"zeta":1.0,"contract":{"1":2.0}}"#;
        let table: ProgressionTable = serde_json::from_str(json).unwrap();
        assert_eq!(table["zeta"], TableValue::Value(1.0));
        assert_eq!(serde_json::to_string(&table).unwrap(), json);
    }
}
