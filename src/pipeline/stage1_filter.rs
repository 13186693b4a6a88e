use crate::model::degree::DegreeLevel;
use crate::model::metrics::MetricId;
use crate::model::record::InstitutionRecord;

/// A row that survived filtering. `metrics` holds the required metric values
/// in selection order, extracted here so nothing downstream ever sees a
/// missing value.
#[derive(Debug, Clone)]
pub struct FilteredRow {
    pub row: usize,
    pub metrics: Vec<f64>,
}

/// Keep rows whose degree level is present and at least `min_degree` and
/// whose required metrics are all present. Stable: surviving rows keep their
/// input order. Infallible; an empty result is valid output.
pub fn run_stage1(
    records: &[InstitutionRecord],
    required: &[MetricId],
    min_degree: DegreeLevel,
) -> Vec<FilteredRow> {
    let mut kept = Vec::new();
    'rows: for (row, record) in records.iter().enumerate() {
        match record.highest_degree {
            Some(level) if level >= min_degree => {}
            _ => continue,
        }
        let mut metrics = Vec::with_capacity(required.len());
        for &id in required {
            match record.metrics.get(id).copied().flatten() {
                Some(value) => metrics.push(value),
                None => continue 'rows,
            }
        }
        kept.push(FilteredRow { row, metrics });
    }
    kept
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_filter.rs"]
mod tests;
