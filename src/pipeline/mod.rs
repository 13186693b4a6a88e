use thiserror::Error;

use crate::input::YearSnapshot;
use crate::model::degree::DegreeLevel;
use crate::model::metrics::{MetricRegistry, MetricSelection, WeightedSelection};
use crate::model::rows::ComparisonRow;

pub mod stage1_filter;
pub mod stage2_normalize;
pub mod stage3_score;
pub mod stage4_rank;
pub mod stage5_compare;

/// Weight sums at or below this are treated as "no metrics selected".
const WEIGHT_EPSILON: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown metric column: {0}")]
    UnknownMetric(String),
    #[error("negative weight {weight} for metric {column}")]
    NegativeWeight { column: String, weight: f64 },
    #[error("year {year} is not loaded; available years: {available}")]
    YearNotLoaded { year: u16, available: String },
}

/// One ranking request, as supplied by the caller.
#[derive(Debug, Clone)]
pub struct RankParams {
    pub selection: MetricSelection,
    pub min_degree: DegreeLevel,
    pub top_n: usize,
    pub hide_outsiders: bool,
}

/// The comparison table plus the column names it was scored on.
#[derive(Debug, Clone)]
pub struct RankingOutput {
    pub year: u16,
    pub metric_columns: Vec<&'static str>,
    pub rows: Vec<ComparisonRow>,
}

/// Resolve a request selection against the registry. Unknown columns and
/// negative weights fail fast; a selection whose weights sum to ~0 degrades
/// to single-metric mode on the first named metric (or the registry's first
/// metric when nothing was named) instead of dividing by near-zero.
pub fn resolve_selection(
    registry: &MetricRegistry,
    selection: &MetricSelection,
) -> Result<WeightedSelection, PipelineError> {
    let named: Vec<(String, f64)> = match selection {
        MetricSelection::Single(column) => vec![(column.clone(), 1.0)],
        MetricSelection::Weighted(weights) => weights.clone(),
    };

    let mut resolved = Vec::with_capacity(named.len());
    for (column, weight) in &named {
        let id = registry
            .resolve(column)
            .ok_or_else(|| PipelineError::UnknownMetric(column.clone()))?;
        if *weight < 0.0 {
            return Err(PipelineError::NegativeWeight {
                column: column.clone(),
                weight: *weight,
            });
        }
        resolved.push((id, *weight));
    }

    let selection = WeightedSelection { weights: resolved };
    if selection.weight_sum() <= WEIGHT_EPSILON {
        let fallback = selection.weights.first().map(|(id, _)| *id).unwrap_or(0);
        tracing::warn!(
            column = registry.spec(fallback).column,
            "selection has no effective weights; falling back to single-metric mode"
        );
        return Ok(WeightedSelection::single(fallback));
    }

    Ok(selection)
}

/// Run one request through the whole engine: filter, normalize, score, sort,
/// optionally hide outsiders, assign dense ranks, truncate, join. Pure with
/// respect to the snapshot; identical inputs produce identical output.
pub fn run_ranking(
    snapshot: &YearSnapshot,
    registry: &MetricRegistry,
    params: &RankParams,
) -> Result<RankingOutput, PipelineError> {
    let selection = resolve_selection(registry, &params.selection)?;
    let metric_ids = selection.metric_ids();
    let weights: Vec<f64> = selection.weights.iter().map(|(_, w)| *w).collect();

    let kept = stage1_filter::run_stage1(
        snapshot.table.records(),
        &metric_ids,
        params.min_degree,
    );
    let norm = stage2_normalize::run_stage2(&kept, &metric_ids, registry);
    for (k, &id) in metric_ids.iter().enumerate() {
        tracing::debug!(
            column = registry.spec(id).column,
            min = norm.bounds[k].min,
            max = norm.bounds[k].max,
            "normalization bounds"
        );
    }
    let scores = stage3_score::run_stage3(&norm.values, &weights);

    let mut ordered = stage4_rank::order_by_score(&kept, norm, scores);
    if params.hide_outsiders {
        stage5_compare::retain_listed(&mut ordered, &snapshot.table, &snapshot.reference);
    }
    let mut ranked = stage4_rank::assign_ranks(ordered);
    stage4_rank::truncate_top(&mut ranked, params.top_n);

    let rows = stage5_compare::run_stage5(&snapshot.table, &ranked, &snapshot.reference);
    Ok(RankingOutput {
        year: snapshot.table.year,
        metric_columns: metric_ids
            .iter()
            .map(|&id| registry.spec(id).column)
            .collect(),
        rows,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
