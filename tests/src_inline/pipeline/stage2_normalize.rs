use super::*;

use crate::model::metrics::{MetricRegistry, MetricSpec};

const COST: MetricSpec = MetricSpec {
    column: "COST",
    label: "Cost",
    lower_is_better: true,
};
const EARN: MetricSpec = MetricSpec {
    column: "EARN",
    label: "Earnings",
    lower_is_better: false,
};

fn rows(values: &[Vec<f64>]) -> Vec<FilteredRow> {
    values
        .iter()
        .enumerate()
        .map(|(row, metrics)| FilteredRow {
            row,
            metrics: metrics.clone(),
        })
        .collect()
}

#[test]
fn test_lower_is_better_min_maps_to_zero() {
    let registry = MetricRegistry::from_specs(&[COST]);
    let rows = rows(&[vec![10.0], vec![30.0], vec![50.0]]);
    let out = run_stage2(&rows, &[0], &registry);
    assert!((out.values[0][0] - 0.0).abs() < 1e-12);
    assert!((out.values[1][0] - 0.5).abs() < 1e-12);
    assert!((out.values[2][0] - 1.0).abs() < 1e-12);
    assert_eq!(out.bounds[0].min, 10.0);
    assert_eq!(out.bounds[0].max, 50.0);
}

#[test]
fn test_higher_is_better_max_maps_to_zero() {
    let registry = MetricRegistry::from_specs(&[EARN]);
    let rows = rows(&[vec![10.0], vec![30.0], vec![50.0]]);
    let out = run_stage2(&rows, &[0], &registry);
    assert!((out.values[0][0] - 1.0).abs() < 1e-12);
    assert!((out.values[1][0] - 0.5).abs() < 1e-12);
    assert!((out.values[2][0] - 0.0).abs() < 1e-12);
}

#[test]
fn test_values_stay_in_unit_interval() {
    let registry = MetricRegistry::from_specs(&[COST, EARN]);
    let rows = rows(&[
        vec![-250.0, 0.001],
        vec![17.5, 0.5],
        vec![9000.0, 0.25],
        vec![42.0, 0.75],
    ]);
    let out = run_stage2(&rows, &[0, 1], &registry);
    for canonical in &out.values {
        for &v in canonical {
            assert!((0.0..=1.0).contains(&v));
        }
    }
}

#[test]
fn test_zero_variance_normalizes_to_zero() {
    let registry = MetricRegistry::from_specs(&[COST, EARN]);
    let rows = rows(&[vec![7.0, 7.0], vec![7.0, 7.0], vec![7.0, 7.0]]);
    let out = run_stage2(&rows, &[0, 1], &registry);
    for canonical in &out.values {
        assert_eq!(canonical, &vec![0.0, 0.0]);
    }
}

#[test]
fn test_bounds_are_per_request_not_global() {
    let registry = MetricRegistry::from_specs(&[COST]);
    let wide = rows(&[vec![0.0], vec![100.0], vec![50.0]]);
    let narrow = rows(&[vec![40.0], vec![50.0]]);
    let wide_out = run_stage2(&wide, &[0], &registry);
    let narrow_out = run_stage2(&narrow, &[0], &registry);
    assert!((wide_out.values[2][0] - 0.5).abs() < 1e-12);
    assert!((narrow_out.values[1][0] - 1.0).abs() < 1e-12);
    assert_eq!(narrow_out.bounds[0].min, 40.0);
}

#[test]
fn test_empty_row_set() {
    let registry = MetricRegistry::from_specs(&[COST]);
    let out = run_stage2(&[], &[0], &registry);
    assert!(out.values.is_empty());
    assert_eq!(out.bounds.len(), 1);
}
