use super::config::PenaltyParams;

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Per-element penalty `λ_i = λ0 · mean(v) / (v_i + ε)`.
/// Low-variance elements get a large penalty and so little extra allocation.
/// Variances are taken as given; negative inputs are not clipped.
pub fn penalty_coefficients(variance: &[f64], params: PenaltyParams) -> Vec<f64> {
    let scale = params.lambda0 * mean(variance);
    variance.iter().map(|&v| scale / (v + params.eps)).collect()
}
