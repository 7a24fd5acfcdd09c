use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use tracing::trace;

use crate::error::EngineError;
use crate::model::{Probas, ScoreLine, SimulationResult, TopScore, percent_of};
use crate::poisson::sample_poisson;

pub const TOP_SCORES: usize = 5;
// Progress is reported (and cancellation checked) every 1/20th of a run.
const CHECKPOINTS: u32 = 20;

/// Cooperative cancellation flag, checked at progress checkpoints.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Forwards integer percentages to a caller-supplied sink. Values never go
/// backwards and never exceed 100.
pub struct ProgressReporter<'a> {
    sink: Option<&'a mut dyn FnMut(u8)>,
    cancel: Option<CancelToken>,
    last: u8,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(sink: &'a mut dyn FnMut(u8)) -> Self {
        Self {
            sink: Some(sink),
            cancel: None,
            last: 0,
        }
    }

    pub fn silent() -> Self {
        Self {
            sink: None,
            cancel: None,
            last: 0,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn report(&mut self, percent: u8) {
        let percent = percent.min(100).max(self.last);
        self.last = percent;
        if let Some(sink) = self.sink.as_mut() {
            sink(percent);
        }
    }

    pub fn last(&self) -> u8 {
        self.last
    }

    pub fn checkpoint(&self) -> Result<(), EngineError> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(EngineError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Sub-range of the overall 0-100 scale a single run reports into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressWindow {
    pub start: u8,
    pub end: u8,
}

impl ProgressWindow {
    pub fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    pub fn at(&self, done: u32, total: u32) -> u8 {
        if total == 0 {
            return self.start;
        }
        let span = self.end as f64 - self.start as f64;
        let pct = self.start as f64 + (done as f64 / total as f64) * span;
        pct.floor().clamp(0.0, 100.0) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    pub lambda_a: f64,
    pub lambda_b: f64,
    pub iterations: u32,
}

/// Occurrence count per score line, remembering first-seen order so ties
/// resolve deterministically.
#[derive(Debug, Clone, Default)]
pub struct ScoreDistribution {
    counts: Vec<(ScoreLine, u32)>,
    index: HashMap<ScoreLine, usize>,
    total: u32,
}

impl ScoreDistribution {
    pub fn record(&mut self, score: ScoreLine) {
        match self.index.get(&score) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.index.insert(score, self.counts.len());
                self.counts.push((score, 1));
            }
        }
        self.total += 1;
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn count(&self, score: ScoreLine) -> u32 {
        self.index
            .get(&score)
            .map(|&slot| self.counts[slot].1)
            .unwrap_or(0)
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &(ScoreLine, u32)> {
        self.counts.iter()
    }

    /// Most frequent score; the first one seen wins a tie.
    pub fn mode(&self) -> Option<(ScoreLine, u32)> {
        let mut best: Option<(ScoreLine, u32)> = None;
        for &(score, count) in &self.counts {
            match best {
                Some((_, c)) if c >= count => {}
                _ => best = Some((score, count)),
            }
        }
        best
    }

    /// The `n` most frequent scores, descending, ties in first-seen order.
    pub fn top(&self, n: usize) -> Vec<(ScoreLine, u32)> {
        let mut rows = self.counts.clone();
        // Stable sort keeps encounter order among equal counts.
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows.truncate(n);
        rows
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MarketTally {
    win_a: u32,
    win_b: u32,
    draw: u32,
    btts: u32,
    over15: u32,
    over25: u32,
    over35: u32,
}

impl MarketTally {
    fn record(&mut self, score: ScoreLine) {
        if score.a == score.b {
            self.draw += 1;
        } else if score.a > score.b {
            self.win_a += 1;
        } else {
            self.win_b += 1;
        }
        if score.a > 0 && score.b > 0 {
            self.btts += 1;
        }
        let total = score.total();
        if total > 1 {
            self.over15 += 1;
        }
        if total > 2 {
            self.over25 += 1;
        }
        if total > 3 {
            self.over35 += 1;
        }
    }
}

/// Runs `iterations` independent Poisson-pair trials and summarizes them.
/// Trials run strictly in order; the mode tie-break depends on it.
pub fn simulate_match<R: Rng + ?Sized>(
    params: SimulationParams,
    window: ProgressWindow,
    rng: &mut R,
    progress: &mut ProgressReporter<'_>,
) -> Result<SimulationResult, EngineError> {
    let SimulationParams {
        lambda_a,
        lambda_b,
        iterations,
    } = params;
    if iterations == 0 {
        return Err(EngineError::InvalidParameter(
            "iterations must be positive".to_string(),
        ));
    }
    for (name, lambda) in [("lambda_a", lambda_a), ("lambda_b", lambda_b)] {
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(EngineError::InvalidParameter(format!(
                "{name} must be a finite non-negative rate, got {lambda}"
            )));
        }
    }

    let mut dist = ScoreDistribution::default();
    let mut tally = MarketTally::default();
    let step = (iterations / CHECKPOINTS).max(1);

    for i in 0..iterations {
        if i % step == 0 {
            progress.checkpoint()?;
            let pct = window.at(i, iterations);
            progress.report(pct);
            trace!(trial = i, pct, "simulation checkpoint");
        }

        let score = ScoreLine::new(
            sample_poisson(lambda_a, rng),
            sample_poisson(lambda_b, rng),
        );
        dist.record(score);
        tally.record(score);
    }

    summarize(&dist, &tally)
}

fn summarize(dist: &ScoreDistribution, tally: &MarketTally) -> Result<SimulationResult, EngineError> {
    let n = dist.total();
    let Some((mode, mode_count)) = dist.mode() else {
        return Err(EngineError::EmptyDistribution);
    };

    let probas = Probas {
        btts: percent_of(tally.btts, n, 1),
        over15: percent_of(tally.over15, n, 1),
        over25: percent_of(tally.over25, n, 1),
        over35: percent_of(tally.over35, n, 1),
        win_a: percent_of(tally.win_a, n, 1),
        win_b: percent_of(tally.win_b, n, 1),
        draw: percent_of(tally.draw, n, 1),
    };

    let top_scores = dist
        .top(TOP_SCORES)
        .into_iter()
        .map(|(score, count)| TopScore {
            score,
            percent: percent_of(count, n, 2),
        })
        .collect();

    Ok(SimulationResult {
        score_exact: mode,
        score_exact_percent: percent_of(mode_count, n, 2),
        probas,
        top_scores,
    })
}
