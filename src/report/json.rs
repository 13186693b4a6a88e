use serde::Serialize;

use crate::model::rows::ComparisonRow;
use crate::pipeline::RankingOutput;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    tool: &'static str,
    version: &'static str,
    year: u16,
    metric_columns: &'a [&'static str],
    n_rows: usize,
    rows: &'a [ComparisonRow],
}

pub fn render_ranking_json(output: &RankingOutput) -> Result<String, serde_json::Error> {
    let report = JsonReport {
        tool: "mobility-rank",
        version: env!("CARGO_PKG_VERSION"),
        year: output.year,
        metric_columns: &output.metric_columns,
        n_rows: output.rows.len(),
        rows: &output.rows,
    };
    let mut rendered = serde_json::to_string_pretty(&report)?;
    rendered.push('\n');
    Ok(rendered)
}
