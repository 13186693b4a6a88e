use std::fmt;

use serde::ser::{Serialize, Serializer};

/// A scored institution after rank assignment. `row` indexes the year table;
/// `normalized` holds the canonical (0 = best) value per selected metric,
/// retained for display. Recomputed per request, never persisted.
#[derive(Debug, Clone)]
pub struct RankedRow {
    pub row: usize,
    pub aggregate: f64,
    pub normalized: Vec<f64>,
    pub our_rank: u32,
}

/// External rank for one institution, or the explicit "not ranked" sentinel
/// for institutions absent from the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceRank {
    Ranked(u32),
    Unranked,
}

impl ReferenceRank {
    pub fn is_ranked(self) -> bool {
        matches!(self, ReferenceRank::Ranked(_))
    }
}

impl fmt::Display for ReferenceRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceRank::Ranked(rank) => write!(f, "{rank}"),
            ReferenceRank::Unranked => write!(f, "unranked"),
        }
    }
}

impl Serialize for ReferenceRank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ReferenceRank::Ranked(rank) => serializer.serialize_u32(*rank),
            ReferenceRank::Unranked => serializer.serialize_unit(),
        }
    }
}

/// One row of the final comparison table: our rank side by side with the
/// reference rank, keyed by stable id.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ComparisonRow {
    pub our_rank: u32,
    pub reference_rank: ReferenceRank,
    pub name: String,
    pub unit_id: u32,
    pub aggregate_score: f64,
    pub normalized: Vec<f64>,
}
