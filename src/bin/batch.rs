use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use scorecast::config::EngineConfig;
use scorecast::engine::run_simulation;
use scorecast::model::SimulationReport;
use scorecast::simulate::ProgressReporter;
use scorecast::validate::parse_batch_json;

/// Simulates every match of a JSON array of inputs, one line per match.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    inputs: PathBuf,

    /// Base seed; match `i` uses `seed + i`
    #[arg(long)]
    seed: Option<u64>,

    /// Print the reports as a JSON array instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = EngineConfig::from_env();
    let seed = args.seed.or(config.seed);

    let raw = fs::read_to_string(&args.inputs)
        .with_context(|| format!("read {}", args.inputs.display()))?;
    let requests = parse_batch_json(&raw, config.input_defaults())
        .context("inputs must be a JSON array of simulation inputs")?;

    // Each match owns its rng and runs sequentially; only matches run in parallel.
    let results: Vec<(usize, Result<SimulationReport>)> = requests
        .into_par_iter()
        .enumerate()
        .map(|(idx, request)| {
            let out = request.map_err(anyhow::Error::from).and_then(|request| {
                let mut progress = ProgressReporter::silent();
                let report = match seed {
                    Some(s) => {
                        let mut rng = ChaCha8Rng::seed_from_u64(s.wrapping_add(idx as u64));
                        run_simulation(&request, config.thresholds(), &mut rng, &mut progress)
                    }
                    None => run_simulation(
                        &request,
                        config.thresholds(),
                        &mut rand::thread_rng(),
                        &mut progress,
                    ),
                };
                report.map_err(anyhow::Error::from)
            });
            (idx, out)
        })
        .collect();

    let mut reports = Vec::new();
    for (idx, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(err) => warn!(index = idx, error = %err, "skipping input"),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for r in &reports {
        let p = &r.full_time.probas;
        println!(
            "{:<20} {:<20} {:>5} ({:>5.2}%)  1 {:>5.1}%  X {:>5.1}%  2 {:>5.1}%  picks {}/{}",
            r.team_a_name,
            r.team_b_name,
            r.full_time.score_exact.to_string(),
            r.full_time.score_exact_percent,
            p.win_a,
            p.draw,
            p.win_b,
            r.coupon.len(),
            r.coupon_high_confidence.len()
        );
    }
    Ok(())
}
