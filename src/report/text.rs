use crate::pipeline::RankingOutput;
use crate::report::format_f64_6;

pub fn render_ranking_text(output: &RankingOutput) -> String {
    let mut out = String::new();

    out.push_str("College Economic-Mobility Ranking\n");
    out.push_str("=================================\n\n");
    out.push_str(&format!("Year: {}\n", output.year));
    out.push_str(&format!(
        "Metrics: {}\n",
        output.metric_columns.join(", ")
    ));
    let matched = output
        .rows
        .iter()
        .filter(|row| row.reference_rank.is_ranked())
        .count();
    out.push_str(&format!(
        "Institutions: {} ({} in reference ranking)\n\n",
        output.rows.len(),
        matched
    ));

    if output.rows.is_empty() {
        out.push_str("No institutions matched the requested filters.\n");
        return out;
    }

    let mut header = vec![
        "Our Rank".to_string(),
        "Ref Rank".to_string(),
        "UNITID".to_string(),
        "Score".to_string(),
        "Institution".to_string(),
    ];
    header.extend(output.metric_columns.iter().map(|c| c.to_string()));

    let mut table: Vec<Vec<String>> = vec![header];
    for row in &output.rows {
        let mut cells = vec![
            row.our_rank.to_string(),
            row.reference_rank.to_string(),
            row.unit_id.to_string(),
            format_f64_6(row.aggregate_score),
            row.name.clone(),
        ];
        cells.extend(row.normalized.iter().map(|v| format_f64_6(*v)));
        table.push(cells);
    }

    let columns = table[0].len();
    let mut widths = vec![0usize; columns];
    for row in &table {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    for (line, row) in table.iter().enumerate() {
        for (idx, cell) in row.iter().enumerate() {
            if idx > 0 {
                out.push_str("  ");
            }
            out.push_str(cell);
            if idx + 1 < columns {
                for _ in cell.chars().count()..widths[idx] {
                    out.push(' ');
                }
            }
        }
        out.push('\n');
        if line == 0 {
            let total: usize = widths.iter().sum::<usize>() + 2 * (columns - 1);
            for _ in 0..total {
                out.push('-');
            }
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/text.rs"]
mod tests;
