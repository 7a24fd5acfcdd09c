use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const DEFAULT_ALPHA: f64 = 1.3;
pub const DEFAULT_ITERATIONS: u32 = 18_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

/// An ordered `(goals A, goals B)` pair, written as `"A-B"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScoreLine {
    pub a: u32,
    pub b: u32,
}

impl ScoreLine {
    pub fn new(a: u32, b: u32) -> Self {
        Self { a, b }
    }

    pub fn total(&self) -> u32 {
        self.a + self.b
    }
}

impl fmt::Display for ScoreLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid score line: {0:?}")]
pub struct ParseScoreError(pub String);

impl FromStr for ScoreLine {
    type Err = ParseScoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let err = || ParseScoreError(raw.to_string());
        let (a, b) = raw.trim().split_once('-').ok_or_else(err)?;
        let a = a.trim().parse::<u32>().map_err(|_| err())?;
        let b = b.trim().parse::<u32>().map_err(|_| err())?;
        Ok(Self { a, b })
    }
}

impl Serialize for ScoreLine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScoreLine {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHead {
    pub score_a: u32,
    pub score_b: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchType {
    Friendly,
    League,
    Competition,
}

impl MatchType {
    pub fn key(self) -> &'static str {
        match self {
            MatchType::Friendly => "friendly",
            MatchType::League => "league",
            MatchType::Competition => "competition",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompetitionType {
    ChampionsLeague,
    EuropaLeague,
    DomesticCup,
    WorldCup,
}

impl CompetitionType {
    pub fn label(self) -> &'static str {
        match self {
            CompetitionType::ChampionsLeague => "Champions League",
            CompetitionType::EuropaLeague => "Europa League",
            CompetitionType::DomesticCup => "Domestic Cup",
            CompetitionType::WorldCup => "World Cup",
        }
    }
}

/// Match settings as echoed back in the report (`matchSettings`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchContext {
    pub match_type: MatchType,
    pub is_home_team_a: bool,
    pub is_home_team_b: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank_a: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank_b: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition_type: Option<CompetitionType>,
    #[serde(default)]
    pub is_knockout_stage: bool,
}

impl MatchContext {
    pub fn new(match_type: MatchType) -> Self {
        Self {
            match_type,
            is_home_team_a: false,
            is_home_team_b: false,
            rank_a: None,
            rank_b: None,
            competition_type: None,
            is_knockout_stage: false,
        }
    }

    pub fn home_side(&self) -> Option<Side> {
        if self.is_home_team_a {
            Some(Side::A)
        } else if self.is_home_team_b {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self.match_type {
            MatchType::Friendly => "Friendly",
            MatchType::League => "League",
            MatchType::Competition => self
                .competition_type
                .map(CompetitionType::label)
                .unwrap_or("Competition"),
        }
    }
}

/// A validated simulation request. Build one through `validate::validate_input`
/// unless the inputs are already known to be sane.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub team_a_name: String,
    pub team_b_name: String,
    // Oldest first; order drives recency weighting.
    pub scores_a: Vec<u32>,
    pub scores_b: Vec<u32>,
    pub head_to_head: Vec<HeadToHead>,
    pub context: MatchContext,
    pub alpha: f64,
    pub iterations: u32,
}

impl SimulationRequest {
    pub fn new(
        team_a_name: impl Into<String>,
        team_b_name: impl Into<String>,
        scores_a: Vec<u32>,
        scores_b: Vec<u32>,
    ) -> Self {
        Self {
            team_a_name: team_a_name.into(),
            team_b_name: team_b_name.into(),
            scores_a,
            scores_b,
            head_to_head: Vec::new(),
            context: MatchContext::new(MatchType::Friendly),
            alpha: DEFAULT_ALPHA,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Market probabilities in percent, rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probas {
    #[serde(with = "pct1")]
    pub btts: f64,
    #[serde(with = "pct1")]
    pub over15: f64,
    #[serde(with = "pct1")]
    pub over25: f64,
    #[serde(with = "pct1")]
    pub over35: f64,
    #[serde(rename = "victoireA", with = "pct1")]
    pub win_a: f64,
    #[serde(rename = "victoireB", with = "pct1")]
    pub win_b: f64,
    #[serde(rename = "nul", with = "pct1")]
    pub draw: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopScore {
    pub score: ScoreLine,
    #[serde(rename = "pourcentage", with = "pct2")]
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    #[serde(rename = "scoreExact")]
    pub score_exact: ScoreLine,
    #[serde(rename = "scoreExactPourcentage", with = "pct2")]
    pub score_exact_percent: f64,
    pub probas: Probas,
    #[serde(rename = "topScores")]
    pub top_scores: Vec<TopScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponEntry {
    #[serde(rename = "type")]
    pub market: String,
    pub pick: String,
    #[serde(with = "pct1")]
    pub probability: f64,
}

impl CouponEntry {
    pub fn new(market: impl Into<String>, pick: impl Into<String>, probability: f64) -> Self {
        Self {
            market: market.into(),
            pick: pick.into(),
            probability: round_to(probability, 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub team_a_name: String,
    pub team_b_name: String,
    pub match_settings: MatchContext,
    #[serde(rename = "resultatsHT")]
    pub half_time: SimulationResult,
    #[serde(rename = "resultatsFT")]
    pub full_time: SimulationResult,
    #[serde(rename = "couponParis")]
    pub coupon: Vec<CouponEntry>,
    #[serde(rename = "couponParisHighConfidence")]
    pub coupon_high_confidence: Vec<CouponEntry>,
    pub date: String,
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round() / scale
}

pub fn percent_of(count: u32, total: u32, decimals: i32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(count as f64 / total as f64 * 100.0, decimals)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPercent {
    Number(f64),
    Text(String),
}

fn deserialize_percent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match RawPercent::deserialize(deserializer)? {
        RawPercent::Number(v) => Ok(v),
        RawPercent::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

mod pct1 {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{value:.1}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        super::deserialize_percent(deserializer)
    }
}

mod pct2 {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{value:.2}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        super::deserialize_percent(deserializer)
    }
}
