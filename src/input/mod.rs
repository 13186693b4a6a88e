use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::metrics::MetricRegistry;
use crate::model::record::YearTable;

pub mod cache;
pub mod reference;
pub mod scorecard;

use reference::{ReferenceRanking, ReferenceTable};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Where the source data lives and whether the on-disk cache is consulted.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub data_dir: PathBuf,
    pub reference_path: PathBuf,
    pub cache_dir: PathBuf,
    pub use_cache: bool,
}

/// Immutable per-year view handed to every ranking request: the institution
/// table plus the matching reference ranking. Never mutated after load.
#[derive(Debug, Clone)]
pub struct YearSnapshot {
    pub table: YearTable,
    pub reference: ReferenceRanking,
}

/// Write-once, read-many store of year snapshots, built before any ranking
/// request is served.
#[derive(Debug)]
pub struct SnapshotStore {
    years: BTreeMap<u16, YearSnapshot>,
}

impl SnapshotStore {
    pub fn load(
        paths: &DataPaths,
        registry: &MetricRegistry,
        years: &[u16],
    ) -> Result<Self, InputError> {
        let reference_table = ReferenceTable::load(&paths.reference_path)?;
        let mut snapshots = BTreeMap::new();
        for &year in years {
            let table = scorecard::load_year_table(
                &paths.data_dir,
                &paths.cache_dir,
                paths.use_cache,
                year,
                registry,
            )?;
            let reference = reference_table.for_year(year);
            if reference.is_empty() {
                tracing::warn!(year, "reference table has no rankings for this year");
            }
            let unmatched = reference
                .unit_ids()
                .filter(|&id| table.row_of(id).is_none())
                .count();
            if unmatched > 0 {
                tracing::debug!(
                    year,
                    unmatched,
                    "reference entries with no institution in the year table"
                );
            }
            tracing::info!(
                year,
                institutions = table.len(),
                reference_entries = reference.len(),
                "loaded year snapshot"
            );
            snapshots.insert(year, YearSnapshot { table, reference });
        }
        Ok(Self { years: snapshots })
    }

    pub fn snapshot(&self, year: u16) -> Option<&YearSnapshot> {
        self.years.get(&year)
    }

    pub fn years(&self) -> Vec<u16> {
        self.years.keys().copied().collect()
    }
}

/// Scan the data directory for per-year extracts (`MERGED<year>_<yy>_PP.csv`
/// with an optional `.gz` suffix) and return the years found, ascending.
pub fn discover_years(data_dir: &Path) -> Result<Vec<u16>, InputError> {
    let mut years = std::collections::BTreeSet::new();
    for entry in std::fs::read_dir(data_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let stem = name
            .strip_suffix(".csv.gz")
            .or_else(|| name.strip_suffix(".csv"));
        let Some(stem) = stem else {
            continue;
        };
        if let Some(middle) = stem
            .strip_prefix("MERGED")
            .and_then(|rest| rest.strip_suffix("_PP"))
        {
            if let Some((year, _)) = middle.split_once('_') {
                if let Ok(year) = year.parse::<u16>() {
                    years.insert(year);
                }
            }
        }
    }
    Ok(years.into_iter().collect())
}

/// Resolve the extract path for one year, preferring the plain CSV over the
/// gzipped variant when both exist.
pub fn scorecard_path(data_dir: &Path, year: u16) -> Result<PathBuf, InputError> {
    let base = format!("MERGED{}_{:02}_PP.csv", year, (year + 1) % 100);
    let candidates = [base.clone(), format!("{base}.gz")];
    for name in &candidates {
        let path = data_dir.join(name);
        if path.exists() {
            return Ok(path);
        }
    }
    Err(InputError::MissingInput(format!(
        "no scorecard extract for {year}: expected {} in {}",
        base,
        data_dir.display()
    )))
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/mod.rs"]
mod tests;
