use crate::context::BuildContext;
use crate::error::Result;
use crate::models::{GearData, GearEntry};
use crate::pipeline::Pipeline;
use crate::rows::EquipmentRow;
use serde_json::json;
use statdata_remote::Query;
use tracing::instrument;

#[instrument(skip_all, fields(pipeline = %Pipeline::Gear))]
pub(crate) async fn load(ctx: &BuildContext) -> Result<GearData> {
    ctx.cached(Pipeline::Gear, async {
        let query = Query::collection("equipmentList").project(json!({"id": 1, "equipmentStat": 1}));
        normalize(ctx.fetch(query).await?)
    })
    .await
}

/// Gear id to base stats. Pieces without stats are left out entirely.
pub(crate) fn normalize(rows: Vec<EquipmentRow>) -> Result<GearData> {
    rows.into_iter()
        .filter(|gear| !gear.equipment_stat.is_empty())
        .map(|gear| Ok((gear.id, GearEntry { stats: gear.equipment_stat.to_table()? })))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::StatType;
    use crate::rows::parse_rows;
    use serde_json::json;

    #[test]
    fn test_empty_stat_lists_are_omitted() {
        let rows = parse_rows(
            "equipmentList",
            vec![
                json!({"id": "001", "equipmentStat": {"statList": [{"unitStatId": 5, "unscaledDecimalValue": 10000}]}}),
                json!({"id": "002", "equipmentStat": {"statList": []}}),
                json!({"id": "003"}),
            ],
        )
        .unwrap();
        let gear = normalize(rows).unwrap();
        assert_eq!(gear.keys().collect::<Vec<_>>(), ["001"]);
        assert_eq!(gear["001"].stats[&StatType::Speed], 10000.0);
    }

    #[test]
    fn test_unknown_stat_fails() {
        let rows = parse_rows(
            "equipmentList",
            vec![json!({"id": "001", "equipmentStat": {"statList": [{"unitStatId": 0, "unscaledDecimalValue": 1}]}})],
        )
        .unwrap();
        let err = normalize(rows).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownStat(_)));
    }
}
