/// Weighted mean of the canonical columns: `score = Σ w·n / Σ w` per row,
/// lower is better. Callers resolve the selection first (pipeline::resolve_
/// selection), so the weight sum here is always positive and every input
/// value is finite; scores are therefore finite for all filtered rows.
pub fn run_stage3(values: &[Vec<f64>], weights: &[f64]) -> Vec<f64> {
    let weight_sum: f64 = weights.iter().sum();
    debug_assert!(weight_sum > 0.0, "selection must be resolved before scoring");

    let mut scores = Vec::with_capacity(values.len());
    for canonical in values {
        debug_assert_eq!(canonical.len(), weights.len());
        let mut acc = 0.0;
        for (value, weight) in canonical.iter().zip(weights) {
            acc += value * weight;
        }
        scores.push(acc / weight_sum);
    }
    scores
}
