use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use scorecast::config::EngineConfig;
use scorecast::engine::{expected_goals, run_simulation};
use scorecast::model::{CouponEntry, SimulationReport, SimulationResult};
use scorecast::persist::{HistoryEntry, HistoryStore, TeamBook};
use scorecast::poisson::outcome_probs_poisson;
use scorecast::simulate::ProgressReporter;
use scorecast::validate::parse_input_json;

const ANALYTIC_MAX_GOALS: u32 = 10;

#[derive(Parser, Debug)]
#[command(author, version, about = "Monte Carlo football score simulator", long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error); RUST_LOG wins when set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Directory holding history and team data
    #[arg(long, global = true, env = "SCORECAST_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate one match described by a JSON input file
    Run {
        input: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
        /// Used when the input does not set `iterations`
        #[arg(long)]
        iterations: Option<u32>,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        threshold_high: Option<f64>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
        /// Record the run in history and remember both teams
        #[arg(long)]
        save: bool,
    },
    /// List past simulations
    History {
        #[arg(long)]
        clear: bool,
    },
    /// List remembered teams and their last goal histories
    Teams,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut config = EngineConfig::from_env();
    if args.cache_dir.is_some() {
        config.cache_dir = args.cache_dir.clone();
    }

    match args.command {
        Command::Run {
            input,
            seed,
            iterations,
            threshold,
            threshold_high,
            json,
            save,
        } => {
            if let Some(n) = iterations {
                config.iterations = n;
            }
            config.override_thresholds(threshold, threshold_high);
            if seed.is_some() {
                config.seed = seed;
            }
            run(&config, &input, json, save)
        }
        Command::History { clear } => history(&config, clear),
        Command::Teams => teams(&config),
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config: &EngineConfig, input: &Path, json: bool, save: bool) -> Result<()> {
    let raw = fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?;
    let request = parse_input_json(&raw, config.input_defaults())
        .with_context(|| format!("invalid input in {}", input.display()))?;

    let mut on_progress = |pct: u8| debug!(pct, "progress");
    let mut progress = ProgressReporter::new(&mut on_progress);
    let report = match config.seed {
        Some(seed) => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            run_simulation(&request, config.thresholds(), &mut rng, &mut progress)?
        }
        None => run_simulation(
            &request,
            config.thresholds(),
            &mut rand::thread_rng(),
            &mut progress,
        )?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let goals = expected_goals(&request);
        print_report(&report, goals.lambda_a, goals.lambda_b, config);
    }

    if save {
        let dir = config
            .cache_dir
            .as_deref()
            .context("no cache directory; set SCORECAST_CACHE_DIR or HOME")?;
        HistoryStore::new(dir, config.history_limit).add(HistoryEntry::from_report(&report))?;
        let book = TeamBook::new(dir);
        book.remember(&request.team_a_name, &request.scores_a)?;
        book.remember(&request.team_b_name, &request.scores_b)?;
        info!(dir = %dir.display(), "saved to history");
    }
    Ok(())
}

fn print_report(report: &SimulationReport, lambda_a: f64, lambda_b: f64, config: &EngineConfig) {
    println!(
        "{} vs {} ({})",
        report.team_a_name,
        report.team_b_name,
        report.match_settings.label()
    );
    println!("Expected goals: {lambda_a:.2} - {lambda_b:.2}");
    print_result("Full time", &report.full_time, &report.team_a_name, &report.team_b_name);
    print_result("Half time", &report.half_time, &report.team_a_name, &report.team_b_name);

    let (pa, pd, pb) = outcome_probs_poisson(lambda_a, lambda_b, ANALYTIC_MAX_GOALS);
    println!(
        "Analytic 1X2:   {:.1}% / {:.1}% / {:.1}%",
        pa * 100.0,
        pd * 100.0,
        pb * 100.0
    );

    print_coupon(&format!("Coupon (> {:.0}%)", config.threshold), &report.coupon);
    print_coupon(
        &format!("Coupon (> {:.0}%)", config.threshold_high),
        &report.coupon_high_confidence,
    );
}

fn print_result(label: &str, r: &SimulationResult, team_a: &str, team_b: &str) {
    let p = &r.probas;
    println!();
    println!("{label}: {} ({:.2}%)", r.score_exact, r.score_exact_percent);
    println!(
        "  {team_a}: {:.1}%  Draw: {:.1}%  {team_b}: {:.1}%",
        p.win_a, p.draw, p.win_b
    );
    println!(
        "  BTTS: {:.1}%  O1.5: {:.1}%  O2.5: {:.1}%  O3.5: {:.1}%",
        p.btts, p.over15, p.over25, p.over35
    );
    let top = r
        .top_scores
        .iter()
        .map(|t| format!("{} {:.2}%", t.score, t.percent))
        .collect::<Vec<_>>()
        .join(", ");
    println!("  Top scores: {top}");
}

fn print_coupon(title: &str, coupon: &[CouponEntry]) {
    println!();
    println!("{title}:");
    if coupon.is_empty() {
        println!("  (no pick)");
    }
    for entry in coupon {
        println!(
            "  {:<16} {:<12} {:.1}%",
            entry.market, entry.pick, entry.probability
        );
    }
}

fn history(config: &EngineConfig, clear: bool) -> Result<()> {
    let dir = config
        .cache_dir
        .as_deref()
        .context("no cache directory; set SCORECAST_CACHE_DIR or HOME")?;
    let store = HistoryStore::new(dir, config.history_limit);
    if clear {
        store.clear()?;
        println!("History cleared");
        return Ok(());
    }

    let entries = store.load();
    if entries.is_empty() {
        println!("No simulations yet");
    }
    for e in entries {
        println!(
            "{}  {} vs {}  [{}]  {} ({}%)  {}  picks {}/{}",
            e.date,
            e.team_a_name,
            e.team_b_name,
            e.match_type,
            e.score,
            e.probability,
            e.outcome,
            e.coupon_count,
            e.coupon_count_high
        );
    }
    Ok(())
}

fn teams(config: &EngineConfig) -> Result<()> {
    let dir = config
        .cache_dir
        .as_deref()
        .context("no cache directory; set SCORECAST_CACHE_DIR or HOME")?;
    let data = TeamBook::new(dir).load();
    if data.recent_teams.is_empty() {
        println!("No teams yet");
    }
    for name in &data.recent_teams {
        let scores = data
            .scores
            .get(name)
            .map(|s| s.iter().map(u32::to_string).collect::<Vec<_>>().join(", "))
            .unwrap_or_default();
        println!("{name}: {scores}");
    }
    Ok(())
}
