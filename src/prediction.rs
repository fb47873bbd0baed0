use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body sent to the prediction endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub home_name: String,
    pub away_name: String,
    pub home_code: u32,
    pub away_code: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SidePair {
    pub home: Option<f64>,
    pub away: Option<f64>,
}

impl SidePair {
    pub fn both(home: f64, away: f64) -> Self {
        Self {
            home: Some(home),
            away: Some(away),
        }
    }
}

/// A prediction as it arrived. Remote payloads may leave any field out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PredictionResult {
    pub home_win: Option<f64>,
    pub draw: Option<f64>,
    pub away_win: Option<f64>,
    pub score: Option<SidePair>,
    pub corners: Option<SidePair>,
    pub cards: Option<SidePair>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionSource {
    Remote,
    Simulated,
}

impl PredictionSource {
    pub fn label(self) -> &'static str {
        match self {
            PredictionSource::Remote => "MODEL",
            PredictionSource::Simulated => "SIMULATED",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub result: PredictionResult,
    pub source: PredictionSource,
}

impl PredictionResult {
    /// Lenient read of a decoded response body.
    ///
    /// Returns `None` when the body is not a JSON object. Numbers may arrive as
    /// JSON numbers or numeric strings; anything else counts as absent.
    pub fn from_json(root: &Value) -> Option<Self> {
        if !root.is_object() {
            return None;
        }
        Some(Self {
            home_win: pick_f64(root, "home_win"),
            draw: pick_f64(root, "draw"),
            away_win: pick_f64(root, "away_win"),
            score: pick_pair(root, "score"),
            corners: pick_pair(root, "corners"),
            cards: pick_pair(root, "cards"),
        })
    }
}

fn pick_pair(root: &Value, key: &str) -> Option<SidePair> {
    let obj = root.get(key).filter(|v| v.is_object())?;
    Some(SidePair {
        home: pick_f64(obj, "home"),
        away: pick_f64(obj, "away"),
    })
}

fn pick_f64(value: &Value, key: &str) -> Option<f64> {
    let v = value.get(key)?;
    let num = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    num.is_finite().then_some(num)
}
