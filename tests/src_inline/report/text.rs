use super::*;

use crate::model::rows::{ComparisonRow, ReferenceRank};

fn sample_output() -> RankingOutput {
    RankingOutput {
        year: 2018,
        metric_columns: vec!["NPT41_PUB"],
        rows: vec![
            ComparisonRow {
                our_rank: 1,
                reference_rank: ReferenceRank::Ranked(12),
                name: "Alpha State University".to_string(),
                unit_id: 100654,
                aggregate_score: 0.0,
                normalized: vec![0.0],
            },
            ComparisonRow {
                our_rank: 2,
                reference_rank: ReferenceRank::Unranked,
                name: "Beta College".to_string(),
                unit_id: 100724,
                aggregate_score: 0.731525,
                normalized: vec![0.731525],
            },
        ],
    }
}

#[test]
fn test_text_report_lists_every_row() {
    let rendered = render_ranking_text(&sample_output());
    assert!(rendered.contains("Year: 2018"));
    assert!(rendered.contains("Institutions: 2 (1 in reference ranking)"));
    assert!(rendered.contains("Alpha State University"));
    assert!(rendered.contains("Beta College"));
    assert!(rendered.contains("unranked"));
    assert!(rendered.contains("0.731525"));
}

#[test]
fn test_text_report_header_names_metric_columns() {
    let rendered = render_ranking_text(&sample_output());
    let header = rendered
        .lines()
        .find(|line| line.starts_with("Our Rank"))
        .unwrap();
    assert!(header.contains("Ref Rank"));
    assert!(header.contains("UNITID"));
    assert!(header.contains("NPT41_PUB"));
}

#[test]
fn test_text_report_empty_table() {
    let output = RankingOutput {
        year: 2012,
        metric_columns: vec!["NPT41_PUB"],
        rows: vec![],
    };
    let rendered = render_ranking_text(&output);
    assert!(rendered.contains("No institutions matched"));
    assert!(!rendered.contains("Our Rank"));
}
