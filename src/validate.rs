use serde::Deserialize;
use thiserror::Error;

use crate::model::{
    CompetitionType, DEFAULT_ALPHA, DEFAULT_ITERATIONS, HeadToHead, MatchContext, MatchType, Side,
    SimulationRequest,
};

pub const MIN_SCORES: usize = 3;
// Per match. Knuth sampling underflows for rates near 745.
pub const MAX_GOALS: u32 = 99;
pub const ALPHA_RANGE: (f64, f64) = (0.0, 3.0);
pub const ITERATIONS_RANGE: (u32, u32) = (1_000, 20_000);
pub const RANK_RANGE: (i64, i64) = (1, 20);

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("malformed simulation input: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("team {0} name is required")]
    MissingTeamName(Side),

    #[error("team {side} needs at least 3 scores, got {len}")]
    TooFewScores { side: Side, len: usize },

    #[error("team {side} score #{index} is not a whole number of goals in 0..=99: {value}")]
    InvalidScore { side: Side, index: usize, value: f64 },

    #[error("head-to-head entry #{index} is not a pair of whole numbers in 0..=99")]
    InvalidHeadToHead { index: usize },

    #[error("only one team can play at home")]
    BothHome,

    #[error("alpha must be within [0, 3], got {0}")]
    AlphaOutOfRange(f64),

    #[error("iterations must be within [1000, 20000], got {0}")]
    IterationsOutOfRange(u32),

    #[error("team {side} rank must be within 1..=20, got {rank}")]
    RankOutOfRange { side: Side, rank: i64 },
}

/// Loose form of the input as it arrives from a form or a JSON file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInput {
    pub team_a_name: String,
    pub team_b_name: String,
    pub scores_a: Vec<f64>,
    pub scores_b: Vec<f64>,
    #[serde(default)]
    pub h2h_scores: Vec<RawHeadToHead>,
    #[serde(default)]
    pub is_home_team_a: bool,
    #[serde(default)]
    pub is_home_team_b: bool,
    pub match_type: MatchType,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub iterations: Option<u32>,
    #[serde(default)]
    pub rank_a: Option<i64>,
    #[serde(default)]
    pub rank_b: Option<i64>,
    #[serde(default)]
    pub competition_type: Option<CompetitionType>,
    #[serde(default)]
    pub is_knockout_stage: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHeadToHead {
    pub score_a: f64,
    pub score_b: f64,
}

/// Fallbacks for fields the input may leave out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputDefaults {
    pub alpha: f64,
    pub iterations: u32,
}

impl Default for InputDefaults {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

pub fn parse_input_json(raw: &str, defaults: InputDefaults) -> Result<SimulationRequest, ValidationError> {
    let input: SimulationInput = serde_json::from_str(raw)?;
    validate_input(input, defaults)
}

/// Parses a JSON array of inputs, validating each element on its own so one
/// bad entry does not sink the rest. Only a non-array document fails whole.
pub fn parse_batch_json(
    raw: &str,
    defaults: InputDefaults,
) -> Result<Vec<Result<SimulationRequest, ValidationError>>, ValidationError> {
    let items: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    Ok(items
        .into_iter()
        .map(|item| {
            let input: SimulationInput = serde_json::from_value(item)?;
            validate_input(input, defaults)
        })
        .collect())
}

/// Checks every field and returns the first problem found.
pub fn validate_input(
    input: SimulationInput,
    defaults: InputDefaults,
) -> Result<SimulationRequest, ValidationError> {
    let team_a_name = required_name(&input.team_a_name, Side::A)?;
    let team_b_name = required_name(&input.team_b_name, Side::B)?;
    let scores_a = goal_history(&input.scores_a, Side::A)?;
    let scores_b = goal_history(&input.scores_b, Side::B)?;

    let head_to_head = input
        .h2h_scores
        .iter()
        .enumerate()
        .map(|(index, m)| match (whole_goals(m.score_a), whole_goals(m.score_b)) {
            (Some(score_a), Some(score_b)) => Ok(HeadToHead { score_a, score_b }),
            _ => Err(ValidationError::InvalidHeadToHead { index }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if input.is_home_team_a && input.is_home_team_b {
        return Err(ValidationError::BothHome);
    }

    let alpha = input.alpha.unwrap_or(defaults.alpha);
    if !alpha.is_finite() || alpha < ALPHA_RANGE.0 || alpha > ALPHA_RANGE.1 {
        return Err(ValidationError::AlphaOutOfRange(alpha));
    }

    let iterations = input.iterations.unwrap_or(defaults.iterations);
    if iterations < ITERATIONS_RANGE.0 || iterations > ITERATIONS_RANGE.1 {
        return Err(ValidationError::IterationsOutOfRange(iterations));
    }

    let rank_a = rank(input.rank_a, Side::A)?;
    let rank_b = rank(input.rank_b, Side::B)?;

    Ok(SimulationRequest {
        team_a_name,
        team_b_name,
        scores_a,
        scores_b,
        head_to_head,
        context: MatchContext {
            match_type: input.match_type,
            is_home_team_a: input.is_home_team_a,
            is_home_team_b: input.is_home_team_b,
            rank_a,
            rank_b,
            competition_type: input.competition_type,
            is_knockout_stage: input.is_knockout_stage,
        },
        alpha,
        iterations,
    })
}

fn required_name(raw: &str, side: Side) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingTeamName(side));
    }
    Ok(name.to_string())
}

fn goal_history(raw: &[f64], side: Side) -> Result<Vec<u32>, ValidationError> {
    if raw.len() < MIN_SCORES {
        return Err(ValidationError::TooFewScores {
            side,
            len: raw.len(),
        });
    }
    raw.iter()
        .enumerate()
        .map(|(index, &value)| {
            whole_goals(value).ok_or(ValidationError::InvalidScore { side, index, value })
        })
        .collect()
}

fn whole_goals(value: f64) -> Option<u32> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= MAX_GOALS as f64 {
        Some(value as u32)
    } else {
        None
    }
}

fn rank(raw: Option<i64>, side: Side) -> Result<Option<u8>, ValidationError> {
    match raw {
        None => Ok(None),
        Some(rank) if (RANK_RANGE.0..=RANK_RANGE.1).contains(&rank) => Ok(Some(rank as u8)),
        Some(rank) => Err(ValidationError::RankOutOfRange { side, rank }),
    }
}
