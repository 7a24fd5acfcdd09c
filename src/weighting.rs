/// Recency-weighted mean of a goal history (oldest first).
///
/// Entry `i` of `n` gets weight `alpha^(n-1-i)`, so the latest match always
/// weighs 1 and the oldest weighs `alpha^(n-1)`. That means `alpha > 1` leans
/// on *older* matches and `alpha < 1` on recent ones, the opposite of what the
/// knob's name suggests. Kept as is for parity with existing outputs.
pub fn recency_weighted_average(scores: &[u32], alpha: f64) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }

    let n = scores.len();
    let mut weighted = 0.0_f64;
    let mut weight_sum = 0.0_f64;
    for (i, &goals) in scores.iter().enumerate() {
        let w = alpha.powi((n - 1 - i) as i32);
        weighted += w * goals as f64;
        weight_sum += w;
    }

    if !(weight_sum > 0.0 && weight_sum.is_finite() && weighted.is_finite()) {
        return simple_mean(scores);
    }
    weighted / weight_sum
}

pub fn simple_mean(scores: &[u32]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().map(|&g| g as f64).sum::<f64>() / scores.len() as f64
}
