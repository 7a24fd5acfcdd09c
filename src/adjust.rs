use tracing::debug;

use crate::model::{HeadToHead, MatchContext, MatchType, Side};

pub const HOME_ADVANTAGE: f64 = 1.2;

const RANK_STEP: f64 = 0.01;
const RANK_FACTOR_MIN: f64 = 0.8;
const RANK_FACTOR_MAX: f64 = 1.2;

const COMPETITION_BOOST: f64 = 1.05;
// Knockout ties are tighter: fewer goals despite the intensity.
const KNOCKOUT_DAMPING: f64 = 0.9;

const H2H_RATIO_CAP: f64 = 1.3;
const H2H_WEIGHT: f64 = 0.3;

/// Multiplicative corrections applied to each side's weighted average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentFactors {
    pub factor_a: f64,
    pub factor_b: f64,
}

impl Default for AdjustmentFactors {
    fn default() -> Self {
        Self {
            factor_a: 1.0,
            factor_b: 1.0,
        }
    }
}

impl AdjustmentFactors {
    fn scale(&mut self, side: Side, by: f64) {
        match side {
            Side::A => self.factor_a *= by,
            Side::B => self.factor_b *= by,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedScores {
    pub scores_a: Vec<u32>,
    pub scores_b: Vec<u32>,
    pub factors: AdjustmentFactors,
}

/// Copies both histories and derives the context factors. The histories are
/// returned untouched; all context lives in the factors.
pub fn adjust_scores(
    scores_a: &[u32],
    scores_b: &[u32],
    ctx: &MatchContext,
    h2h: &[HeadToHead],
) -> AdjustedScores {
    AdjustedScores {
        scores_a: scores_a.to_vec(),
        scores_b: scores_b.to_vec(),
        factors: adjustment_factors(ctx, h2h),
    }
}

/// Applies, in order: home advantage, league rank gap, competition intensity,
/// head-to-head dominance. Steps whose inputs are missing are skipped.
pub fn adjustment_factors(ctx: &MatchContext, h2h: &[HeadToHead]) -> AdjustmentFactors {
    let mut factors = AdjustmentFactors::default();

    if let Some(home) = ctx.home_side() {
        factors.scale(home, HOME_ADVANTAGE);
        debug!(side = %home, factor = HOME_ADVANTAGE, "home advantage");
    }

    if ctx.match_type == MatchType::League {
        if let (Some(rank_a), Some(rank_b)) = (ctx.rank_a, ctx.rank_b) {
            // Only A moves; B stays at baseline.
            let f = rank_factor(rank_a, rank_b);
            factors.factor_a *= f;
            debug!(rank_a, rank_b, factor = f, "rank differential");
        }
    }

    if ctx.match_type == MatchType::Competition {
        factors.factor_a *= COMPETITION_BOOST;
        factors.factor_b *= COMPETITION_BOOST;
        if ctx.is_knockout_stage {
            factors.factor_a *= KNOCKOUT_DAMPING;
            factors.factor_b *= KNOCKOUT_DAMPING;
        }
    }

    if let Some((side, boost)) = head_to_head_boost(h2h) {
        factors.scale(side, boost);
        debug!(side = %side, factor = boost, "head-to-head dominance");
    }

    factors
}

pub fn rank_factor(rank_a: u8, rank_b: u8) -> f64 {
    let diff = rank_b as f64 - rank_a as f64;
    (1.0 + diff * RANK_STEP).clamp(RANK_FACTOR_MIN, RANK_FACTOR_MAX)
}

/// The side that outscored the other across past meetings and its boost,
/// capped at +9%. `None` when totals are level.
pub fn head_to_head_boost(h2h: &[HeadToHead]) -> Option<(Side, f64)> {
    let goals_a: u64 = h2h.iter().map(|m| m.score_a as u64).sum();
    let goals_b: u64 = h2h.iter().map(|m| m.score_b as u64).sum();

    let (side, dominant, other) = if goals_a > goals_b {
        (Side::A, goals_a, goals_b)
    } else if goals_b > goals_a {
        (Side::B, goals_b, goals_a)
    } else {
        return None;
    };

    let ratio = (dominant as f64 / other.max(1) as f64).min(H2H_RATIO_CAP);
    Some((side, 1.0 + (ratio - 1.0) * H2H_WEIGHT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CompetitionType;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn neutral_friendly_is_identity() {
        let f = adjustment_factors(&MatchContext::new(MatchType::Friendly), &[]);
        assert_eq!(f, AdjustmentFactors::default());
    }

    #[test]
    fn only_one_side_gets_home_bonus() {
        let mut ctx = MatchContext::new(MatchType::Friendly);
        ctx.is_home_team_b = true;
        let f = adjustment_factors(&ctx, &[]);
        assert!(close(f.factor_a, 1.0));
        assert!(close(f.factor_b, 1.2));
    }

    #[test]
    fn rank_gap_is_clamped_and_asymmetric() {
        let mut ctx = MatchContext::new(MatchType::League);
        ctx.rank_a = Some(1);
        ctx.rank_b = Some(20);
        let f = adjustment_factors(&ctx, &[]);
        assert!(close(f.factor_a, 1.19));
        assert!(close(f.factor_b, 1.0));

        assert!(close(rank_factor(20, 1), 0.81));
        assert!(close(rank_factor(10, 10), 1.0));
    }

    #[test]
    fn ranks_ignored_outside_league() {
        let mut ctx = MatchContext::new(MatchType::Friendly);
        ctx.rank_a = Some(1);
        ctx.rank_b = Some(20);
        assert_eq!(adjustment_factors(&ctx, &[]), AdjustmentFactors::default());

        let mut ctx = MatchContext::new(MatchType::League);
        ctx.rank_a = Some(1);
        assert_eq!(adjustment_factors(&ctx, &[]), AdjustmentFactors::default());
    }

    #[test]
    fn knockout_competition_nets_below_one() {
        let mut ctx = MatchContext::new(MatchType::Competition);
        ctx.competition_type = Some(CompetitionType::ChampionsLeague);
        let f = adjustment_factors(&ctx, &[]);
        assert!(close(f.factor_a, 1.05));
        ctx.is_knockout_stage = true;
        let f = adjustment_factors(&ctx, &[]);
        assert!(close(f.factor_a, 1.05 * 0.9));
        assert!(close(f.factor_b, 1.05 * 0.9));
    }

    #[test]
    fn head_to_head_boost_caps_at_nine_percent() {
        let h2h = [
            HeadToHead { score_a: 2, score_b: 0 },
            HeadToHead { score_a: 3, score_b: 1 },
            HeadToHead { score_a: 1, score_b: 0 },
            HeadToHead { score_a: 2, score_b: 1 },
            HeadToHead { score_a: 2, score_b: 0 },
        ];
        let f = adjustment_factors(&MatchContext::new(MatchType::Friendly), &h2h);
        assert!(close(f.factor_a, 1.09));
        assert!(close(f.factor_b, 1.0));
    }

    #[test]
    fn head_to_head_small_edge_and_level_totals() {
        // 5 vs 4: ratio 1.25.
        let h2h = [HeadToHead { score_a: 4, score_b: 5 }];
        let (side, boost) = head_to_head_boost(&h2h).unwrap();
        assert_eq!(side, Side::B);
        assert!(close(boost, 1.0 + 0.25 * 0.3));

        let level = [HeadToHead { score_a: 2, score_b: 2 }];
        assert!(head_to_head_boost(&level).is_none());
        assert!(head_to_head_boost(&[]).is_none());
    }

    #[test]
    fn adjusted_histories_are_untouched_copies() {
        let out = adjust_scores(&[1, 2, 3], &[0, 0, 1], &MatchContext::new(MatchType::Friendly), &[]);
        assert_eq!(out.scores_a, vec![1, 2, 3]);
        assert_eq!(out.scores_b, vec![0, 0, 1]);
    }
}
