use crate::model::metrics::{MetricId, MetricRegistry};
use crate::pipeline::stage1_filter::FilteredRow;

/// Raw extrema of one metric over the current filtered set.
#[derive(Debug, Clone, Copy)]
pub struct MetricBounds {
    pub min: f64,
    pub max: f64,
}

/// Canonical values for the filtered set: `values[pos][k]` is row `pos`
/// rescaled into [0, 1] for the k-th selected metric, where 0 is always the
/// best outcome regardless of the metric's native polarity.
#[derive(Debug, Clone)]
pub struct Stage2Output {
    pub bounds: Vec<MetricBounds>,
    pub values: Vec<Vec<f64>>,
}

/// Min/max feature scaling per metric, computed over the current row set
/// (per request, never global). Higher-is-better metrics are inverted after
/// scaling so a smaller canonical value always means a better outcome. A
/// metric with zero variance collapses to a constant 0 column.
pub fn run_stage2(
    rows: &[FilteredRow],
    metric_ids: &[MetricId],
    registry: &MetricRegistry,
) -> Stage2Output {
    let mut bounds = Vec::with_capacity(metric_ids.len());
    for (k, &id) in metric_ids.iter().enumerate() {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for row in rows {
            let v = row.metrics[k];
            min = min.min(v);
            max = max.max(v);
        }
        if rows.is_empty() {
            min = 0.0;
            max = 0.0;
        } else if max - min <= 0.0 {
            tracing::warn!(
                column = registry.spec(id).column,
                value = min,
                "metric has zero variance in the filtered set; normalizing to 0"
            );
        }
        bounds.push(MetricBounds { min, max });
    }

    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        let mut canonical = Vec::with_capacity(metric_ids.len());
        for (k, &id) in metric_ids.iter().enumerate() {
            let MetricBounds { min, max } = bounds[k];
            let span = max - min;
            let scaled = if span > 0.0 {
                (row.metrics[k] - min) / span
            } else {
                0.0
            };
            let value = if registry.spec(id).lower_is_better || span <= 0.0 {
                scaled
            } else {
                1.0 - scaled
            };
            canonical.push(value);
        }
        values.push(canonical);
    }

    Stage2Output { bounds, values }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_normalize.rs"]
mod tests;
