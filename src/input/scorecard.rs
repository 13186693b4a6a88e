use std::path::Path;

use crate::input::cache::{self, CacheMeta};
use crate::input::{InputError, scorecard_path};
use crate::model::degree::DegreeLevel;
use crate::model::metrics::MetricRegistry;
use crate::model::record::{InstitutionRecord, YearTable};

/// Load one year's institution table, going through the on-disk cache when
/// enabled: a valid cache entry skips the large extract entirely; a miss
/// parses the extract and writes the stripped table back.
pub fn load_year_table(
    data_dir: &Path,
    cache_dir: &Path,
    use_cache: bool,
    year: u16,
    registry: &MetricRegistry,
) -> Result<YearTable, InputError> {
    let source = scorecard_path(data_dir, year)?;

    if use_cache {
        let (csv_path, meta_path) = cache::entry_paths(cache_dir, year);
        let meta = CacheMeta::for_source(&source, registry)?;
        if let Some(records) = cache::read_entry(&csv_path, &meta_path, &meta, registry)? {
            tracing::info!(year, path = %csv_path.display(), "cache hit");
            return Ok(YearTable::new(year, records));
        }
        let records = parse_extract(&source, registry)?;
        cache::write_entry(&csv_path, &meta_path, &meta, &records, registry)?;
        tracing::info!(year, path = %source.display(), "parsed extract and cached");
        return Ok(YearTable::new(year, records));
    }

    let records = parse_extract(&source, registry)?;
    Ok(YearTable::new(year, records))
}

/// Parse a raw scorecard extract. Only the columns in use are read; rows
/// lacking an id, a name, a degree code, or any registered metric are
/// stripped here so the cached table holds complete rows only.
pub fn parse_extract(
    path: &Path,
    registry: &MetricRegistry,
) -> Result<Vec<InstitutionRecord>, InputError> {
    let reader = cache::open_maybe_gz(path)?;
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let unit_id_col = required_column(&headers, "UNITID", path)?;
    let name_col = required_column(&headers, "INSTNM", path)?;
    let degree_col = required_column(&headers, "HIGHDEG", path)?;
    let mut metric_cols = Vec::with_capacity(registry.len());
    for spec in registry.specs() {
        metric_cols.push(required_column(&headers, spec.column, path)?);
    }

    let mut records = Vec::new();
    let mut stripped = 0usize;
    for row in csv_reader.records() {
        let row = row?;
        let Some(unit_id) = row.get(unit_id_col).and_then(|s| s.trim().parse::<u32>().ok())
        else {
            stripped += 1;
            continue;
        };
        let name = row.get(name_col).map(str::trim).unwrap_or_default();
        if name.is_empty() {
            stripped += 1;
            continue;
        }
        let Some(highest_degree) = row.get(degree_col).and_then(parse_degree_cell) else {
            stripped += 1;
            continue;
        };

        let mut metrics = Vec::with_capacity(metric_cols.len());
        for &col in &metric_cols {
            metrics.push(row.get(col).and_then(parse_metric_cell));
        }
        if metrics.iter().any(Option::is_none) {
            stripped += 1;
            continue;
        }

        records.push(InstitutionRecord {
            unit_id,
            name: name.to_string(),
            highest_degree: Some(highest_degree),
            metrics,
        });
    }

    tracing::info!(
        path = %path.display(),
        kept = records.len(),
        stripped,
        "parsed scorecard extract"
    );
    Ok(records)
}

fn required_column(
    headers: &csv::StringRecord,
    column: &str,
    path: &Path,
) -> Result<usize, InputError> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| {
            InputError::MissingInput(format!("column {} not found in {}", column, path.display()))
        })
}

/// Numeric cell with the source's missing-data spellings mapped to `None`.
pub fn parse_metric_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell == "NULL" || cell == "PrivacySuppressed" {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_degree_cell(cell: &str) -> Option<DegreeLevel> {
    let cell = cell.trim();
    if cell.is_empty() || cell == "NULL" || cell == "PrivacySuppressed" {
        return None;
    }
    let code = cell.parse::<f64>().ok()?;
    if code.fract() != 0.0 || !(0.0..=255.0).contains(&code) {
        return None;
    }
    DegreeLevel::from_code(code as u8)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/scorecard.rs"]
mod tests;
