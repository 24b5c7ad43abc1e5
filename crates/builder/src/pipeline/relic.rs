use crate::context::BuildContext;
use crate::error::Result;
use crate::models::{RelicData, RelicEntry, StatTables};
use crate::pipeline::Pipeline;
use crate::rows::RelicTierRow;
use serde_json::json;
use statdata_remote::Query;
use tracing::instrument;

#[instrument(skip_all, fields(pipeline = %Pipeline::Relic))]
pub(crate) async fn load(ctx: &BuildContext) -> Result<RelicData> {
    ctx.cached(Pipeline::Relic, async {
        let query =
            Query::collection("relicTierDefinitionList").project(json!({"id": 1, "stat": 1, "relicStatTable": 1}));
        let (stat_tables, relics) = futures::try_join!(ctx.stat_tables(), ctx.fetch(query))?;
        normalize(relics, &stat_tables)
    })
    .await
}

/// Relic tier id to its stats and growth modifiers.
pub(crate) fn normalize(rows: Vec<RelicTierRow>, stat_tables: &StatTables) -> Result<RelicData> {
    rows.into_iter()
        .map(|relic| {
            let entry = RelicEntry { stats: relic.stat.to_table()?, gms: stat_tables.get(&relic.relic_stat_table).cloned() };
            Ok((relic.id, entry))
        })
        .collect()
}
