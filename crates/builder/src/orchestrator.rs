//! Runs the five pipelines side by side.
//!
//! Pipelines are polled concurrently on the calling task; nothing is spawned.
//! A failing pipeline is recorded and the others carry on, so a report
//! always accounts for all five.

use crate::context::BuildContext;
use crate::error::{Error, ErrorKind, Result};
use crate::models::SnapshotParts;
use crate::pipeline::{Pipeline, gear, mod_set, relic, tables, unit};
use tracing::instrument;

/// Outcome of one rebuild attempt.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Slices from the pipelines that succeeded.
    pub parts: SnapshotParts,
    /// Pipelines that failed, in [`Pipeline::ALL`] order.
    pub failures: Vec<(Pipeline, Error)>,
}

impl BuildReport {
    /// `true` only if every pipeline succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self) -> impl Iterator<Item = Pipeline> + '_ {
        self.failures.iter().map(|(pipeline, _)| *pipeline)
    }

    fn record<T>(&mut self, pipeline: Pipeline, result: Result<T>) -> Option<T> {
        match result {
            Ok(data) => {
                tracing::debug!(%pipeline, "Pipeline finished");
                Some(data)
            },
            Err(err) => {
                let err = err.raise(ErrorKind::Pipeline(pipeline));
                tracing::error!(%pipeline, error = ?err, "Pipeline failed");
                self.failures.push((pipeline, err));
                None
            },
        }
    }
}

/// Run every pipeline to completion and collect what they produced.
#[instrument(skip_all, fields(version = %ctx.version()))]
pub async fn build_all(ctx: &BuildContext) -> BuildReport {
    tracing::info!("Retrieving new game data");
    let (gear, mod_sets, tables, units, relics) =
        tokio::join!(gear::load(ctx), mod_set::load(ctx), tables::load(ctx), unit::load(ctx), relic::load(ctx));

    let mut report = BuildReport::default();
    let gear_data = report.record(Pipeline::Gear, gear);
    let mod_set_data = report.record(Pipeline::ModSet, mod_sets);
    let tables = report.record(Pipeline::Tables, tables);
    let unit_data = report.record(Pipeline::Unit, units);
    let relic_data = report.record(Pipeline::Relic, relics);
    report.parts = SnapshotParts { gear_data, mod_set_data, tables, unit_data, relic_data };
    report
}
