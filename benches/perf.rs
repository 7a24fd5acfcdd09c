use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

use scorecast::coupon::{CouponThresholds, generate_coupon};
use scorecast::engine::run_simulation;
use scorecast::model::SimulationResult;
use scorecast::simulate::{ProgressReporter, ProgressWindow, SimulationParams, simulate_match};
use scorecast::validate::{InputDefaults, parse_input_json};
use scorecast::weighting::recency_weighted_average;

fn sample_result() -> SimulationResult {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    simulate_match(
        SimulationParams {
            lambda_a: 1.9,
            lambda_b: 0.9,
            iterations: 18_000,
        },
        ProgressWindow::new(0, 100),
        &mut rng,
        &mut ProgressReporter::silent(),
    )
    .unwrap()
}

fn bench_input_parse(c: &mut Criterion) {
    c.bench_function("input_parse", |b| {
        b.iter(|| {
            let req = parse_input_json(black_box(REQUEST_JSON), InputDefaults::default()).unwrap();
            black_box(req.iterations);
        })
    });
}

fn bench_weighted_average(c: &mut Criterion) {
    let scores: Vec<u32> = (0..40).map(|i| i % 5).collect();
    c.bench_function("recency_weighted_average_40", |b| {
        b.iter(|| black_box(recency_weighted_average(black_box(&scores), 1.3)))
    });
}

fn bench_simulate_match(c: &mut Criterion) {
    c.bench_function("simulate_match_18000", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        b.iter(|| {
            let result = simulate_match(
                SimulationParams {
                    lambda_a: black_box(1.9),
                    lambda_b: black_box(0.9),
                    iterations: 18_000,
                },
                ProgressWindow::new(0, 100),
                &mut rng,
                &mut ProgressReporter::silent(),
            )
            .unwrap();
            black_box(result.score_exact);
        })
    });
}

fn bench_coupon(c: &mut Criterion) {
    let result = sample_result();
    c.bench_function("generate_coupon", |b| {
        b.iter(|| black_box(generate_coupon(&result, black_box(&result), 70.0).len()))
    });
}

fn bench_full_run(c: &mut Criterion) {
    let request = parse_input_json(REQUEST_JSON, InputDefaults::default()).unwrap();
    c.bench_function("run_simulation_full", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        b.iter(|| {
            let report = run_simulation(
                black_box(&request),
                CouponThresholds::default(),
                &mut rng,
                &mut ProgressReporter::silent(),
            )
            .unwrap();
            black_box(report.coupon.len());
        })
    });
}

criterion_group!(
    perf,
    bench_input_parse,
    bench_weighted_average,
    bench_simulate_match,
    bench_coupon,
    bench_full_run
);
criterion_main!(perf);

static REQUEST_JSON: &str = include_str!("../tests/fixtures/request.json");
