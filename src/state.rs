use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, TryRecvError};

use chrono::Local;
use tracing::{error, info, warn};

use crate::assets::AssetSlot;
use crate::predict_client::PredictError;
use crate::prediction::PredictionOutcome;
use crate::render::{self, PredictionView};
use crate::selection::{Selection, SelectionController, Side};

pub const UNEXPECTED_NOTICE: &str = "An unexpected error occurred. Check the log.";
const MAX_LOGS: usize = 200;

pub struct AppState {
    pub selection: SelectionController,
    pub background: AssetSlot,
    pub focus: Side,
    pub prediction: Option<PredictionView>,
    pub calculating: bool,
    pub notice: Option<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub endpoint: String,
}

impl AppState {
    pub fn new(selection: SelectionController, background: AssetSlot, endpoint: String) -> Self {
        Self {
            selection,
            background,
            focus: Side::Home,
            prediction: None,
            calculating: false,
            notice: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            endpoint,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let stamped = format!("{} {}", Local::now().format("%H:%M:%S"), msg.into());
        self.logs.push_back(stamped);
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = self.focus.other();
    }

    pub fn cycle_focused(&mut self, step: isize) {
        self.selection.cycle(self.focus, step);
    }

    pub fn swap(&mut self) {
        self.selection.swap();
        self.push_log(format!(
            "[INFO] Swapped: {} vs {}",
            self.selection.home_name(),
            self.selection.away_name()
        ));
    }

    pub fn trigger_label(&self) -> &'static str {
        if self.calculating {
            "Calculating…"
        } else {
            "Predict"
        }
    }

    /// Marks a prediction in flight and returns what to predict.
    ///
    /// While one is already running the trigger is disabled and this is a
    /// no-op returning `None`.
    pub fn begin_prediction(&mut self) -> Option<Selection> {
        if self.calculating {
            return None;
        }
        self.calculating = true;
        self.notice = None;
        let selection = self.selection.selection();
        self.push_log(format!(
            "[INFO] Predicting {} vs {}",
            selection.home.name, selection.away.name
        ));
        Some(selection)
    }

    pub fn fail_prediction(&mut self, err: &PredictError) {
        error!(error = %err, "prediction flow failed");
        self.calculating = false;
        self.notice = Some(UNEXPECTED_NOTICE.to_string());
        self.push_log(format!("[ERROR] {err}"));
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    PredictionReady(PredictionOutcome),
    PredictionFailed(PredictError),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Predict(Selection),
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::PredictionReady(outcome) => {
            let view = render::render_prediction(&outcome.result, &mut rand::thread_rng());
            info!(
                source = outcome.source.label(),
                home = view.home_pct,
                draw = view.draw_pct,
                away = view.away_pct,
                "prediction rendered"
            );
            state.prediction = Some(view);
            state.calculating = false;
            // The source stays out of the console: a simulated fallback looks
            // the same to the user as a model answer.
            state.push_log(format!("[INFO] Prediction ready: {}", view.score_text()));
        }
        Delta::PredictionFailed(err) => state.fail_prediction(&err),
    }
}

/// Applies every pending delta. Returns `false` once the worker is gone.
///
/// A prediction still in flight when the worker disappears is failed, so the
/// trigger comes back.
pub fn drain_deltas(state: &mut AppState, rx: &Receiver<Delta>) -> bool {
    loop {
        match rx.try_recv() {
            Ok(delta) => apply_delta(state, delta),
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => {
                if state.calculating {
                    warn!("prediction worker exited mid-request");
                    state.fail_prediction(&PredictError::WorkerGone);
                }
                return false;
            }
        }
    }
}
