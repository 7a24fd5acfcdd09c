use chrono::{SecondsFormat, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::adjust::{AdjustmentFactors, adjust_scores};
use crate::coupon::{CouponThresholds, generate_coupon};
use crate::error::EngineError;
use crate::model::{SimulationReport, SimulationRequest};
use crate::simulate::{ProgressReporter, ProgressWindow, SimulationParams, simulate_match};
use crate::weighting::recency_weighted_average;

// Half-time is approximated as half the full-time rate, not modelled separately.
pub const HALF_TIME_SCALE: f64 = 0.5;

const PROGRESS_ADJUSTED: u8 = 10;
const PROGRESS_FACTORS: u8 = 30;
const PROGRESS_AVERAGES: u8 = 50;
const FULL_TIME_WINDOW: ProgressWindow = ProgressWindow { start: 50, end: 80 };
const HALF_TIME_WINDOW: ProgressWindow = ProgressWindow { start: 80, end: 90 };
const PROGRESS_DONE: u8 = 100;

/// Poisson rates for both sides over the full match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpectedGoals {
    pub lambda_a: f64,
    pub lambda_b: f64,
    pub factors: AdjustmentFactors,
}

impl ExpectedGoals {
    pub fn half_time(&self) -> (f64, f64) {
        (self.lambda_a * HALF_TIME_SCALE, self.lambda_b * HALF_TIME_SCALE)
    }
}

pub fn expected_goals(request: &SimulationRequest) -> ExpectedGoals {
    let adjusted = adjust_scores(
        &request.scores_a,
        &request.scores_b,
        &request.context,
        &request.head_to_head,
    );
    let factors = adjusted.factors;
    let lambda_a = recency_weighted_average(&adjusted.scores_a, request.alpha) * factors.factor_a;
    let lambda_b = recency_weighted_average(&adjusted.scores_b, request.alpha) * factors.factor_b;
    ExpectedGoals {
        lambda_a,
        lambda_b,
        factors,
    }
}

/// Runs the whole pipeline for one request: context factors, weighted
/// averages, full-time and half-time simulations, then both coupons.
///
/// The request is trusted to be validated. Either a complete report comes
/// back or an error does; nothing partial escapes.
pub fn run_simulation<R: Rng + ?Sized>(
    request: &SimulationRequest,
    thresholds: CouponThresholds,
    rng: &mut R,
    progress: &mut ProgressReporter<'_>,
) -> Result<SimulationReport, EngineError> {
    progress.checkpoint()?;
    progress.report(PROGRESS_ADJUSTED);

    let goals = expected_goals(request);
    debug!(
        factor_a = goals.factors.factor_a,
        factor_b = goals.factors.factor_b,
        "context factors"
    );
    progress.report(PROGRESS_FACTORS);

    debug!(
        lambda_a = goals.lambda_a,
        lambda_b = goals.lambda_b,
        alpha = request.alpha,
        "expected goals"
    );
    progress.report(PROGRESS_AVERAGES);

    let full_time = simulate_match(
        SimulationParams {
            lambda_a: goals.lambda_a,
            lambda_b: goals.lambda_b,
            iterations: request.iterations,
        },
        FULL_TIME_WINDOW,
        rng,
        progress,
    )?;

    let (ht_a, ht_b) = goals.half_time();
    let half_time = simulate_match(
        SimulationParams {
            lambda_a: ht_a,
            lambda_b: ht_b,
            iterations: request.iterations,
        },
        HALF_TIME_WINDOW,
        rng,
        progress,
    )?;

    let coupon = generate_coupon(&half_time, &full_time, thresholds.standard);
    let coupon_high_confidence = generate_coupon(&half_time, &full_time, thresholds.high);
    progress.report(PROGRESS_DONE);

    info!(
        team_a = %request.team_a_name,
        team_b = %request.team_b_name,
        score = %full_time.score_exact,
        picks = coupon.len(),
        picks_high = coupon_high_confidence.len(),
        "simulation complete"
    );

    Ok(SimulationReport {
        team_a_name: request.team_a_name.clone(),
        team_b_name: request.team_b_name.clone(),
        match_settings: request.context.clone(),
        half_time,
        full_time,
        coupon,
        coupon_high_confidence,
        date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Same as `run_simulation` with a reproducible random stream.
pub fn run_seeded(
    request: &SimulationRequest,
    thresholds: CouponThresholds,
    seed: u64,
    progress: &mut ProgressReporter<'_>,
) -> Result<SimulationReport, EngineError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    run_simulation(request, thresholds, &mut rng, progress)
}
