use crate::model::rows::RankedRow;
use crate::pipeline::stage1_filter::FilteredRow;
use crate::pipeline::stage2_normalize::Stage2Output;

/// A row carrying its aggregate score, ordered but not yet ranked.
#[derive(Debug, Clone)]
pub struct ScoredRow {
    pub row: usize,
    pub aggregate: f64,
    pub normalized: Vec<f64>,
}

/// Stable ascending sort on the aggregate (lower canonical score = better).
/// Exact ties keep their filtered input order, which is what makes tie
/// ranks deterministic.
pub fn order_by_score(rows: &[FilteredRow], norm: Stage2Output, scores: Vec<f64>) -> Vec<ScoredRow> {
    let mut ordered: Vec<ScoredRow> = rows
        .iter()
        .zip(norm.values)
        .zip(scores)
        .map(|((filtered, normalized), aggregate)| ScoredRow {
            row: filtered.row,
            aggregate,
            normalized,
        })
        .collect();
    ordered.sort_by(|a, b| {
        a.aggregate
            .partial_cmp(&b.aggregate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ordered
}

/// Dense 1-based rank assignment in sorted order. Ties receive distinct
/// consecutive ranks; the output ranks are a permutation of 1..=N.
pub fn assign_ranks(ordered: Vec<ScoredRow>) -> Vec<RankedRow> {
    ordered
        .into_iter()
        .enumerate()
        .map(|(idx, scored)| RankedRow {
            row: scored.row,
            aggregate: scored.aggregate,
            normalized: scored.normalized,
            our_rank: (idx + 1) as u32,
        })
        .collect()
}

/// Keep only the first `top_n` ranked rows; 0 means no truncation. Runs
/// after rank assignment, so surviving rows keep the ranks they were given.
pub fn truncate_top(ranked: &mut Vec<RankedRow>, top_n: usize) {
    if top_n != 0 && ranked.len() > top_n {
        ranked.truncate(top_n);
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_rank.rs"]
mod tests;
