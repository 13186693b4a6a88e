use std::collections::HashMap;
use std::path::Path;

use crate::input::{InputError, cache::open_maybe_gz};

/// External rankings for one year: `unit id -> positive rank`. Sparse
/// relative to the institution table; read-only after load.
#[derive(Debug, Clone)]
pub struct ReferenceRanking {
    pub year: u16,
    by_id: HashMap<u32, u32>,
}

impl ReferenceRanking {
    pub fn new(year: u16, by_id: HashMap<u32, u32>) -> Self {
        Self { year, by_id }
    }

    pub fn empty(year: u16) -> Self {
        Self {
            year,
            by_id: HashMap::new(),
        }
    }

    pub fn rank_of(&self, unit_id: u32) -> Option<u32> {
        self.by_id.get(&unit_id).copied()
    }

    pub fn contains(&self, unit_id: u32) -> bool {
        self.by_id.contains_key(&unit_id)
    }

    pub fn unit_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_id.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// The full reference CSV: `UNITID` plus one rank column per year. Cells
/// that do not parse as a positive integer mean "not ranked that year".
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    years: HashMap<u16, HashMap<u32, u32>>,
}

impl ReferenceTable {
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let reader = open_maybe_gz(path)?;
        let mut csv_reader = csv::Reader::from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let unit_id_col = headers
            .iter()
            .position(|h| h.trim() == "UNITID")
            .ok_or_else(|| {
                InputError::MissingInput(format!(
                    "column UNITID not found in {}",
                    path.display()
                ))
            })?;

        let mut year_cols: Vec<(u16, usize)> = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Ok(year) = header.trim().parse::<u16>() {
                year_cols.push((year, idx));
            }
        }
        if year_cols.is_empty() {
            return Err(InputError::InvalidInput(format!(
                "no year columns found in {}",
                path.display()
            )));
        }

        let mut years: HashMap<u16, HashMap<u32, u32>> =
            year_cols.iter().map(|&(y, _)| (y, HashMap::new())).collect();

        for row in csv_reader.records() {
            let row = row?;
            let Some(unit_id) = row.get(unit_id_col).and_then(|s| s.trim().parse::<u32>().ok())
            else {
                continue;
            };
            for &(year, col) in &year_cols {
                let Some(rank) = row.get(col).and_then(parse_rank_cell) else {
                    continue;
                };
                if let Some(by_id) = years.get_mut(&year) {
                    by_id.insert(unit_id, rank);
                }
            }
        }

        tracing::info!(
            path = %path.display(),
            years = years.len(),
            "loaded reference rankings"
        );
        Ok(Self { years })
    }

    pub fn for_year(&self, year: u16) -> ReferenceRanking {
        match self.years.get(&year) {
            Some(by_id) => ReferenceRanking::new(year, by_id.clone()),
            None => ReferenceRanking::empty(year),
        }
    }
}

/// Positive integer rank; the source sometimes carries floats from
/// spreadsheet exports, so integral floats are accepted too.
fn parse_rank_cell(cell: &str) -> Option<u32> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    let value = cell.parse::<f64>().ok()?;
    if !value.is_finite() || value.fract() != 0.0 || value < 1.0 || value > u32::MAX as f64 {
        return None;
    }
    Some(value as u32)
}
