//! Stat progression tables, shared by the unit and relic pipelines.

use crate::context::fetch_rows;
use crate::error::Result;
use crate::models::StatTables;
use crate::rows::StatProgressionRow;
use serde_json::json;
use statdata_remote::{ClientHandle, Query};

/// Only tables with this prefix are referenced by units and relics.
pub(crate) const STAT_TABLE_PREFIX: &str = "stattable_";

/// Fetch and normalize the progression tables. Called through the build
/// context's memo, never directly; owns its client so the memo can own the
/// fetch.
pub(crate) async fn fetch(client: ClientHandle) -> Result<StatTables> {
    let query = Query::collection("statProgressionList").project(json!({"id": 1, "stat": 1}));
    normalize(fetch_rows(&client, query).await?)
}

pub(crate) fn normalize(rows: Vec<StatProgressionRow>) -> Result<StatTables> {
    rows.into_iter()
        .filter(|table| table.id.starts_with(STAT_TABLE_PREFIX))
        .map(|table| Ok((table.id, table.stat.to_table()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatType;
    use crate::rows::parse_rows;

    #[test]
    fn test_keeps_stat_tables_only() {
        let rows = parse_rows(
            "statProgressionList",
            vec![
                json!({"id": "stattable_jedi_1", "stat": {"statList": [{"unitStatId": 2, "unscaledDecimalValue": 15}]}}),
                // Anything else isn't referenced, even with unparseable stats
                json!({"id": "xp_curve", "stat": {"statList": [{"unitStatId": 999, "unscaledDecimalValue": 1}]}}),
            ],
        )
        .unwrap();
        let tables = normalize(rows).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables["stattable_jedi_1"][&StatType::Strength], 15.0);
    }
}
