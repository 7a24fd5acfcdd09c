use rand::Rng;
use rand::distributions::Standard;

/// Rates under this are treated as a side that never scores.
pub const MIN_LAMBDA: f64 = 0.01;

/// Draws one goal count from Poisson(`lambda`) using Knuth's multiplication
/// method. Expected cost is O(lambda) uniform draws.
pub fn sample_poisson<R: Rng + ?Sized>(lambda: f64, rng: &mut R) -> u32 {
    if lambda.is_nan() || lambda < MIN_LAMBDA {
        return 0;
    }

    let limit = (-lambda).exp();
    let mut k = 0u32;
    let mut p = 1.0_f64;
    loop {
        k += 1;
        let u: f64 = rng.sample(Standard);
        p *= u;
        if p <= limit {
            break;
        }
    }
    k - 1
}

/// Exact 1X2 probabilities (fractions) for two independent Poisson rates,
/// truncated at `max_goals` per side with the tail folded into the last bucket.
pub fn outcome_probs_poisson(lambda_a: f64, lambda_b: f64, max_goals: u32) -> (f64, f64, f64) {
    let pmf_a = poisson_pmf(lambda_a, max_goals);
    let pmf_b = poisson_pmf(lambda_b, max_goals);

    let mut p_a = 0.0;
    let mut p_draw = 0.0;
    let mut p_b = 0.0;

    for (i, p_i) in pmf_a.iter().enumerate() {
        for (j, p_j) in pmf_b.iter().enumerate() {
            let p = p_i * p_j;
            if i > j {
                p_a += p;
            } else if i < j {
                p_b += p;
            } else {
                p_draw += p;
            }
        }
    }

    // Guard against tiny float drift.
    let sum = p_a + p_draw + p_b;
    if sum > 0.0 {
        (p_a / sum, p_draw / sum, p_b / sum)
    } else {
        (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0)
    }
}

pub fn poisson_pmf(lambda: f64, max_k: u32) -> Vec<f64> {
    let max_k = max_k as usize;
    let mut out = vec![0.0; max_k + 1];
    let lambda = if lambda < MIN_LAMBDA { 0.0 } else { lambda };

    out[0] = (-lambda).exp();
    for k in 1..=max_k {
        out[k] = out[k - 1] * lambda / k as f64;
    }

    let sum: f64 = out.iter().sum();
    if sum < 1.0 {
        out[max_k] += 1.0 - sum;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn negligible_rate_never_scores() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for lambda in [0.0, 0.005, 0.0099, -1.0, f64::NAN] {
            for _ in 0..200 {
                assert_eq!(sample_poisson(lambda, &mut rng), 0);
            }
        }
    }

    #[test]
    fn sample_mean_tracks_lambda() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let n = 50_000;
        let total: u64 = (0..n).map(|_| sample_poisson(1.6, &mut rng) as u64).sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 1.6).abs() < 0.05, "mean was {mean}");
    }

    #[test]
    fn pmf_sums_to_one() {
        let pmf = poisson_pmf(2.4, 10);
        let sum: f64 = pmf.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!((pmf[0] - (-2.4_f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn stronger_side_is_favoured_analytically() {
        let (a, d, b) = outcome_probs_poisson(2.0, 0.8, 10);
        assert!(a > b);
        assert!((a + d + b - 1.0).abs() < 1e-9);

        let (a, _, b) = outcome_probs_poisson(1.2, 1.2, 10);
        assert!((a - b).abs() < 1e-9);
    }
}
