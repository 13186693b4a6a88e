use crate::input::reference::ReferenceRanking;
use crate::model::record::YearTable;
use crate::model::rows::{ComparisonRow, RankedRow, ReferenceRank};
use crate::pipeline::stage4_rank::ScoredRow;

/// Drop rows whose institution is absent from the reference ranking. Runs
/// between sorting and rank assignment: the score ordering is untouched and
/// the survivors go on to receive dense ranks.
pub fn retain_listed(ordered: &mut Vec<ScoredRow>, table: &YearTable, reference: &ReferenceRanking) {
    let before = ordered.len();
    ordered.retain(|scored| reference.contains(table.record(scored.row).unit_id));
    let dropped = before - ordered.len();
    if dropped > 0 {
        tracing::info!(
            year = reference.year,
            dropped,
            "hid institutions absent from the reference ranking"
        );
    }
}

/// Join ranked rows against the reference ranking by stable id. A miss is
/// the explicit `Unranked` sentinel; unmatched rows always stay in the
/// output.
pub fn run_stage5(
    table: &YearTable,
    ranked: &[RankedRow],
    reference: &ReferenceRanking,
) -> Vec<ComparisonRow> {
    ranked
        .iter()
        .map(|row| {
            let record = table.record(row.row);
            let reference_rank = match reference.rank_of(record.unit_id) {
                Some(rank) => ReferenceRank::Ranked(rank),
                None => ReferenceRank::Unranked,
            };
            ComparisonRow {
                our_rank: row.our_rank,
                reference_rank,
                name: record.name.clone(),
                unit_id: record.unit_id,
                aggregate_score: row.aggregate,
                normalized: row.normalized.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_compare.rs"]
mod tests;
