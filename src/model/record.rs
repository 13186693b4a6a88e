use std::collections::HashMap;

use crate::model::degree::DegreeLevel;

/// One institution for one year. Metric values sit in registry order;
/// `None` is the explicit missing-data sentinel.
#[derive(Debug, Clone)]
pub struct InstitutionRecord {
    pub unit_id: u32,
    pub name: String,
    pub highest_degree: Option<DegreeLevel>,
    pub metrics: Vec<Option<f64>>,
}

/// Immutable per-year table of institution records with an id index for
/// O(1) joins. Built once at load time, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct YearTable {
    pub year: u16,
    records: Vec<InstitutionRecord>,
    by_id: HashMap<u32, usize>,
}

impl YearTable {
    pub fn new(year: u16, records: Vec<InstitutionRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            if by_id.contains_key(&record.unit_id) {
                tracing::warn!(
                    year,
                    unit_id = record.unit_id,
                    "duplicate unit id; keeping first occurrence"
                );
                continue;
            }
            by_id.insert(record.unit_id, row);
        }
        Self {
            year,
            records,
            by_id,
        }
    }

    pub fn records(&self) -> &[InstitutionRecord] {
        &self.records
    }

    pub fn record(&self, row: usize) -> &InstitutionRecord {
        &self.records[row]
    }

    pub fn row_of(&self, unit_id: u32) -> Option<usize> {
        self.by_id.get(&unit_id).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
