use rand::Rng;

use crate::prediction::{PredictionResult, SidePair};
use crate::simulator::{self, CARDS};

// Renderer fills missing corners from the same range on both sides.
const DEFAULT_CORNERS: (u32, u32) = (2, 9);
const DEFAULT_SCORE: u32 = 1;

/// Everything the prediction panel shows, already coerced to display values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionView {
    pub home_pct: u8,
    pub draw_pct: u8,
    pub away_pct: u8,
    pub score: (u32, u32),
    pub corners: (u32, u32),
    pub cards: (u32, u32),
}

impl PredictionView {
    pub fn score_text(&self) -> String {
        format!("{} - {}", self.score.0, self.score.1)
    }
}

/// round(p * 100), missing reads as 0, clamped to a drawable bar width.
pub fn to_percent(p: Option<f64>) -> u8 {
    let pct = (p.unwrap_or(0.0) * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Coerce a possibly partial result. Never fails.
pub fn render_prediction<R: Rng + ?Sized>(res: &PredictionResult, rng: &mut R) -> PredictionView {
    let score = pair_or(res.score, || DEFAULT_SCORE);
    let corners = pair_or(res.corners, || simulator::uniform(rng, DEFAULT_CORNERS));
    let cards = pair_or(res.cards, || simulator::uniform(rng, CARDS));

    PredictionView {
        home_pct: to_percent(res.home_win),
        draw_pct: to_percent(res.draw),
        away_pct: to_percent(res.away_win),
        score,
        corners,
        cards,
    }
}

fn pair_or(pair: Option<SidePair>, mut fallback: impl FnMut() -> u32) -> (u32, u32) {
    let pair = pair.unwrap_or_default();
    let home = pair.home.map(round_count).unwrap_or_else(|| fallback());
    let away = pair.away.map(round_count).unwrap_or_else(|| fallback());
    (home, away)
}

fn round_count(value: f64) -> u32 {
    value.round().max(0.0) as u32
}
