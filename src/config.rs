use std::path::PathBuf;

use crate::coupon::{CouponThresholds, DEFAULT_HIGH_THRESHOLD, DEFAULT_THRESHOLD};
use crate::model::{DEFAULT_ALPHA, DEFAULT_ITERATIONS};
use crate::persist::DEFAULT_HISTORY_LIMIT;
use crate::validate::{ALPHA_RANGE, ITERATIONS_RANGE, InputDefaults};

const CACHE_DIR: &str = "scorecast";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub iterations: u32,
    pub alpha: f64,
    pub threshold: f64,
    pub threshold_high: f64,
    pub seed: Option<u64>,
    pub history_limit: usize,
    pub cache_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            alpha: DEFAULT_ALPHA,
            threshold: DEFAULT_THRESHOLD,
            threshold_high: DEFAULT_HIGH_THRESHOLD,
            seed: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
            cache_dir: None,
        }
    }
}

impl EngineConfig {
    /// Reads `SCORECAST_*` variables from the process environment. Call
    /// `dotenvy` first if `.env` files should count.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse_f64 = |key: &str| {
            lookup(key)
                .and_then(|val| val.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };
        let d = Self::default();

        let iterations = lookup("SCORECAST_ITERATIONS")
            .and_then(|val| val.trim().parse::<u32>().ok())
            .unwrap_or(d.iterations)
            .clamp(ITERATIONS_RANGE.0, ITERATIONS_RANGE.1);
        let alpha = parse_f64("SCORECAST_ALPHA")
            .unwrap_or(d.alpha)
            .clamp(ALPHA_RANGE.0, ALPHA_RANGE.1);
        let threshold = parse_f64("SCORECAST_THRESHOLD")
            .and_then(percent_threshold)
            .unwrap_or(d.threshold);
        let threshold_high = parse_f64("SCORECAST_THRESHOLD_HIGH")
            .and_then(percent_threshold)
            .unwrap_or(d.threshold_high);
        let seed = lookup("SCORECAST_SEED").and_then(|val| val.trim().parse::<u64>().ok());
        let history_limit = lookup("SCORECAST_HISTORY_LIMIT")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(d.history_limit)
            .max(1);
        let cache_dir = lookup("SCORECAST_CACHE_DIR")
            .filter(|val| !val.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| default_cache_dir(&lookup));

        Self {
            iterations,
            alpha,
            threshold,
            threshold_high,
            seed,
            history_limit,
            cache_dir,
        }
    }

    /// Applies command-line thresholds with the same rules as the
    /// environment: non-finite values are ignored, the rest clamped to 0..=100.
    pub fn override_thresholds(&mut self, standard: Option<f64>, high: Option<f64>) {
        if let Some(t) = standard.and_then(percent_threshold) {
            self.threshold = t;
        }
        if let Some(t) = high.and_then(percent_threshold) {
            self.threshold_high = t;
        }
    }

    pub fn thresholds(&self) -> CouponThresholds {
        CouponThresholds {
            standard: self.threshold,
            high: self.threshold_high,
        }
    }

    pub fn input_defaults(&self) -> InputDefaults {
        InputDefaults {
            alpha: self.alpha,
            iterations: self.iterations,
        }
    }
}

fn percent_threshold(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.clamp(0.0, 100.0))
}

fn default_cache_dir(lookup: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Some(base) = lookup("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = lookup("HOME")?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}
