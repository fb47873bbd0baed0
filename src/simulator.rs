use rand::Rng;

use crate::prediction::{PredictionResult, SidePair};

pub const HOME_CORNERS: (u32, u32) = (3, 10);
pub const AWAY_CORNERS: (u32, u32) = (2, 9);
pub const CARDS: (u32, u32) = (1, 5);

// Chance the dominant side keeps a clean sheet (2-0 instead of 2-1).
const CLEAN_SHEET_P: f64 = 0.4;

/// Placeholder prediction used when the model endpoint is unreachable.
///
/// Not a model: three uniform draws normalised to sum to one, a score read
/// off whichever outcome dominates, and uniform corner/card counts.
pub fn simulate_prediction<R: Rng + ?Sized>(rng: &mut R) -> PredictionResult {
    let (home_win, draw, away_win) = normalised_triple(rng.r#gen(), rng.r#gen(), rng.r#gen());

    let max = home_win.max(draw).max(away_win);
    // Later outcomes win ties.
    let score = if away_win == max {
        SidePair::both(f64::from(losing_goals(rng)), 2.0)
    } else if draw == max {
        SidePair::both(1.0, 1.0)
    } else {
        SidePair::both(2.0, f64::from(losing_goals(rng)))
    };

    let corners = SidePair::both(
        f64::from(uniform(rng, HOME_CORNERS)),
        f64::from(uniform(rng, AWAY_CORNERS)),
    );
    let cards = SidePair::both(f64::from(uniform(rng, CARDS)), f64::from(uniform(rng, CARDS)));

    PredictionResult {
        home_win: Some(home_win),
        draw: Some(draw),
        away_win: Some(away_win),
        score: Some(score),
        corners: Some(corners),
        cards: Some(cards),
    }
}

/// Inclusive uniform integer in `range`.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, range: (u32, u32)) -> u32 {
    rng.gen_range(range.0..=range.1)
}

fn losing_goals<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    if rng.gen_bool(CLEAN_SHEET_P) { 0 } else { 1 }
}

fn normalised_triple(a: f64, b: f64, c: f64) -> (f64, f64, f64) {
    let sum = a + b + c;
    if sum <= f64::EPSILON {
        return (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);
    }
    (a / sum, b / sum, c / sum)
}
