use crate::context::BuildContext;
use crate::error::Result;
use crate::models::{ModSetData, ModSetEntry};
use crate::pipeline::Pipeline;
use crate::rows::StatModSetRow;
use serde_json::json;
use statdata_remote::Query;
use tracing::instrument;

#[instrument(skip_all, fields(pipeline = %Pipeline::ModSet))]
pub(crate) async fn load(ctx: &BuildContext) -> Result<ModSetData> {
    ctx.cached(Pipeline::ModSet, async {
        let query =
            Query::collection("statModSetList").project(json!({"id": 1, "completeBonus": 1, "setCount": 1}));
        normalize(ctx.fetch(query).await?)
    })
    .await
}

/// Mod set id to its completion bonus.
pub(crate) fn normalize(rows: Vec<StatModSetRow>) -> Result<ModSetData> {
    rows.into_iter()
        .map(|set| {
            let stat = &set.complete_bonus.stat;
            let entry = ModSetEntry {
                id: stat.unit_stat_id.resolve()?,
                count: set.set_count,
                value: stat.unscaled_decimal_value,
            };
            Ok((set.id, entry))
        })
        .collect()
}
