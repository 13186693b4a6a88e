use std::collections::HashMap;

use clap::ValueEnum;

/// A scorable column of the source extracts. `lower_is_better` records the
/// metric's native polarity: true for costs, false for outcomes.
#[derive(Debug, Clone, Copy)]
pub struct MetricSpec {
    pub column: &'static str,
    pub label: &'static str,
    pub lower_is_better: bool,
}

/// Index of a metric within its registry. Records store their metric values
/// in registry order, so lookups never go through column-name strings.
pub type MetricId = usize;

const NET_PRICE_V1: &[MetricSpec] = &[
    MetricSpec {
        column: "NPT41_PUB",
        label: "Average net price for $0-$30,000 family income (public institutions)",
        lower_is_better: true,
    },
    MetricSpec {
        column: "NPT42_PUB",
        label: "Average net price for $30,001-$48,000 family income (public institutions)",
        lower_is_better: true,
    },
    MetricSpec {
        column: "NPT43_PUB",
        label: "Average net price for $48,001-$75,000 family income (public institutions)",
        lower_is_better: true,
    },
    MetricSpec {
        column: "NPT44_PUB",
        label: "Average net price for $75,001-$110,000 family income (public institutions)",
        lower_is_better: true,
    },
    MetricSpec {
        column: "NPT45_PUB",
        label: "Average net price for $110,000+ family income (public institutions)",
        lower_is_better: true,
    },
];

const MOBILITY_V2_EXTRA: &[MetricSpec] = &[MetricSpec {
    column: "MD_EARN_WNE_P10",
    label: "Median earnings 10 years after entry",
    lower_is_better: false,
}];

/// Built-in metric profiles selectable from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Profile {
    #[default]
    NetPriceV1,
    MobilityV2,
}

impl Profile {
    pub fn registry(self) -> MetricRegistry {
        match self {
            Profile::NetPriceV1 => MetricRegistry::net_price_v1(),
            Profile::MobilityV2 => MetricRegistry::mobility_v2(),
        }
    }
}

/// Process-wide, read-only set of scorable metrics, defined once at startup.
#[derive(Debug, Clone)]
pub struct MetricRegistry {
    specs: Vec<MetricSpec>,
    by_column: HashMap<&'static str, MetricId>,
}

impl MetricRegistry {
    pub fn from_specs(specs: &[MetricSpec]) -> Self {
        let mut by_column = HashMap::with_capacity(specs.len());
        for (id, spec) in specs.iter().enumerate() {
            if by_column.insert(spec.column, id).is_some() {
                tracing::warn!(column = spec.column, "duplicate metric column; keeping last");
            }
        }
        Self {
            specs: specs.to_vec(),
            by_column,
        }
    }

    /// The five net-price-by-income-bracket columns, all lower-is-better.
    pub fn net_price_v1() -> Self {
        Self::from_specs(NET_PRICE_V1)
    }

    /// `net_price_v1` plus the median-earnings outcome column.
    pub fn mobility_v2() -> Self {
        let mut specs = NET_PRICE_V1.to_vec();
        specs.extend_from_slice(MOBILITY_V2_EXTRA);
        Self::from_specs(&specs)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn specs(&self) -> &[MetricSpec] {
        &self.specs
    }

    pub fn spec(&self, id: MetricId) -> &MetricSpec {
        &self.specs[id]
    }

    pub fn resolve(&self, column: &str) -> Option<MetricId> {
        self.by_column.get(column).copied()
    }

    /// Stable fingerprint of the registered column set, hashed into cache
    /// metadata so a profile change invalidates cached tables.
    pub fn columns_fingerprint(&self) -> String {
        let mut out = String::new();
        for spec in &self.specs {
            out.push_str(spec.column);
            out.push('|');
        }
        out
    }
}

/// Metric selection as supplied by the caller, before registry resolution.
/// Single-metric requests are the degenerate weighted case with weight 1.
#[derive(Debug, Clone)]
pub enum MetricSelection {
    Single(String),
    Weighted(Vec<(String, f64)>),
}

/// Registry-resolved selection: `(metric id, non-negative weight)` pairs.
/// Weights need not sum to 1; the scorer divides by their sum.
#[derive(Debug, Clone)]
pub struct WeightedSelection {
    pub weights: Vec<(MetricId, f64)>,
}

impl WeightedSelection {
    pub fn single(id: MetricId) -> Self {
        Self {
            weights: vec![(id, 1.0)],
        }
    }

    pub fn weight_sum(&self) -> f64 {
        self.weights.iter().map(|(_, w)| w).sum()
    }

    pub fn metric_ids(&self) -> Vec<MetricId> {
        self.weights.iter().map(|(id, _)| *id).collect()
    }
}
