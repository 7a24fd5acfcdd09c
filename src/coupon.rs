use crate::model::{CouponEntry, ScoreLine, SimulationResult, round_to};

pub const DEFAULT_THRESHOLD: f64 = 70.0;
pub const DEFAULT_HIGH_THRESHOLD: f64 = 75.0;

pub const MARKET_EXACT_SCORE: &str = "Exact score";
pub const MARKET_BTTS: &str = "BTTS";
pub const MARKET_DOUBLE_CHANCE: &str = "Double chance";
pub const MARKET_1X2: &str = "1X2";
pub const MARKET_CORNERS: &str = "Corners";
pub const MARKET_CARDS: &str = "Yellow cards";
pub const MARKET_FOULS: &str = "Fouls";
pub const MARKET_THROW_INS: &str = "Throw-ins";

/// Confidence cut-offs (percent) for the two coupons of a report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouponThresholds {
    pub standard: f64,
    pub high: f64,
}

impl Default for CouponThresholds {
    fn default() -> Self {
        Self {
            standard: DEFAULT_THRESHOLD,
            high: DEFAULT_HIGH_THRESHOLD,
        }
    }
}

/// Side-market figures extrapolated from the full-time mode score. These are
/// not simulated; they read a "playing style" off the most likely scoreline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleEstimate {
    pub intensity: f64,
    pub corners: f64,
    pub corner_confidence: f64,
    pub cards: f64,
    pub card_confidence: f64,
    pub fouls: f64,
    pub foul_confidence: f64,
    pub throw_ins: f64,
    pub throw_in_confidence: f64,
}

pub fn estimate_style(score: ScoreLine) -> StyleEstimate {
    let goals_a = score.a as f64;
    let goals_b = score.b as f64;
    let total = goals_a + goals_b;

    let corners = (7.0 + total * 1.3).round();
    let corner_confidence = (70.0 + total * 3.0).min(95.0);

    let mut intensity = 0.0_f64;
    // Close game.
    if (goals_a - goals_b).abs() < 1.0 {
        intensity += 1.0;
    }
    if total > 2.5 {
        intensity += 0.5;
    }
    if goals_a > 0.0 && goals_b > 0.0 {
        intensity += 0.5;
    }

    let cards = (3.0 + intensity * 1.5).round();
    let card_confidence = (65.0 + intensity * 7.0).min(90.0);

    StyleEstimate {
        intensity,
        corners,
        corner_confidence,
        cards,
        card_confidence,
        fouls: cards * 4.0,
        foul_confidence: card_confidence - 5.0,
        throw_ins: (25.0 + intensity * 3.0).round(),
        throw_in_confidence: (60.0 + intensity * 5.0).min(85.0),
    }
}

/// Lists every market whose confidence beats `threshold` (strictly).
///
/// Goal markets read the full-time simulation. The half-time result is taken
/// so callers hand over the whole report pair, but no rule uses it yet.
pub fn generate_coupon(
    _half_time: &SimulationResult,
    full_time: &SimulationResult,
    threshold: f64,
) -> Vec<CouponEntry> {
    let mut coupon = Vec::new();
    let p = &full_time.probas;

    if full_time.score_exact_percent > threshold {
        coupon.push(CouponEntry::new(
            MARKET_EXACT_SCORE,
            full_time.score_exact.to_string(),
            full_time.score_exact_percent,
        ));
    }

    push_yes_no(&mut coupon, MARKET_BTTS, ("Yes", "No"), p.btts, threshold);
    for (line, prob) in [("1.5", p.over15), ("2.5", p.over25), ("3.5", p.over35)] {
        let market = format!("Over/Under {line}");
        let over = format!("Over {line}");
        let under = format!("Under {line}");
        push_yes_no(&mut coupon, &market, (over.as_str(), under.as_str()), prob, threshold);
    }

    let double_chance = [
        ("1X", p.win_a + p.draw),
        ("12", p.win_a + p.win_b),
        ("X2", p.draw + p.win_b),
    ];
    // Raw sum against the threshold; the entry rounds it for display.
    for (pick, prob) in double_chance {
        if prob > threshold {
            coupon.push(CouponEntry::new(MARKET_DOUBLE_CHANCE, pick, prob));
        }
    }

    // One outcome at most, checked A, B, draw.
    let outcome = [("1", p.win_a), ("2", p.win_b), ("X", p.draw)]
        .into_iter()
        .find(|(_, prob)| *prob > threshold);
    if let Some((pick, prob)) = outcome {
        coupon.push(CouponEntry::new(MARKET_1X2, pick, prob));
    }

    push_style_markets(&mut coupon, full_time.score_exact, threshold);
    coupon
}

fn push_yes_no(
    coupon: &mut Vec<CouponEntry>,
    market: &str,
    (yes, no): (&str, &str),
    prob: f64,
    threshold: f64,
) {
    let against = round_to(100.0 - prob, 1);
    if prob > threshold {
        coupon.push(CouponEntry::new(market, yes, prob));
    } else if against > threshold {
        coupon.push(CouponEntry::new(market, no, against));
    }
}

fn push_style_markets(coupon: &mut Vec<CouponEntry>, score: ScoreLine, threshold: f64) {
    let est = estimate_style(score);

    if est.corner_confidence > threshold {
        if est.corners >= 10.0 {
            coupon.push(CouponEntry::new(MARKET_CORNERS, "Over 8.5", est.corner_confidence));
        } else if est.corners <= 7.0 {
            coupon.push(CouponEntry::new(MARKET_CORNERS, "Under 9.5", est.corner_confidence));
        }
    }

    if est.card_confidence > threshold {
        if est.cards >= 5.0 {
            coupon.push(CouponEntry::new(MARKET_CARDS, "Over 3.5", est.card_confidence));
        } else if est.cards <= 3.0 {
            coupon.push(CouponEntry::new(MARKET_CARDS, "Under 3.5", est.card_confidence));
        }
    }

    if est.foul_confidence > threshold {
        let pick = if est.fouls >= 20.0 { "Over 19.5" } else { "Under 21.5" };
        coupon.push(CouponEntry::new(MARKET_FOULS, pick, est.foul_confidence));
    }

    if est.throw_in_confidence > threshold {
        let pick = if est.throw_ins >= 30.0 { "Over 27.5" } else { "Under 32.5" };
        coupon.push(CouponEntry::new(MARKET_THROW_INS, pick, est.throw_in_confidence));
    }
}
