use clap::ValueEnum;

use crate::pipeline::RankingOutput;

pub mod json;
pub mod text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

pub fn render(output: &RankingOutput, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(text::render_ranking_text(output)),
        ReportFormat::Json => json::render_ranking_json(output),
    }
}

pub fn format_f64_6(v: f64) -> String {
    format!("{:.6}", v)
}
