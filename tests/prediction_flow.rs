use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use upsbet_terminal::assets::AssetSlot;
use upsbet_terminal::predict_client::{
    FetchError, HttpBackend, PredictError, PredictionBackend, PredictionClient,
};
use upsbet_terminal::prediction::{PredictionRequest, PredictionResult, PredictionSource};
use upsbet_terminal::provider::spawn_prediction_worker;
use upsbet_terminal::registry::TeamRegistry;
use upsbet_terminal::selection::SelectionController;
use upsbet_terminal::state::{
    AppState, Delta, ProviderCommand, UNEXPECTED_NOTICE, apply_delta, drain_deltas,
};

struct NotFound;

impl PredictionBackend for NotFound {
    fn fetch(&self, _request: &PredictionRequest) -> Result<PredictionResult, FetchError> {
        Err(FetchError::Status(404))
    }
}

struct Exploding;

impl PredictionBackend for Exploding {
    fn fetch(&self, _request: &PredictionRequest) -> Result<PredictionResult, FetchError> {
        panic!("backend blew up");
    }
}

fn app_state(home: &str, away: &str) -> AppState {
    let selection =
        SelectionController::initialize(TeamRegistry::builtin(), "./img/", home, away).unwrap();
    AppState::new(
        selection,
        AssetSlot::hidden("background"),
        "http://127.0.0.1:9/api/predict".to_string(),
    )
}

/// Serves exactly one HTTP response and hands back the raw request it saw.
fn one_shot_server(
    status_line: &'static str,
    body: &'static str,
) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (seen_tx, seen_rx) = mpsc::channel();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).unwrap_or(0);
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if request_complete(&raw) {
                break;
            }
        }
        let response = format!(
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        let _ = seen_tx.send(String::from_utf8_lossy(&raw).into_owned());
    });
    (format!("http://{addr}/api/predict"), seen_rx)
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    raw.len() >= header_end + 4 + content_length
}

#[test]
fn not_found_backend_still_fills_every_widget_without_notice() {
    let mut state = app_state("Emelec", "Barcelona SC");
    let client = PredictionClient::new(TeamRegistry::builtin(), NotFound);

    let selection = state.begin_prediction().expect("trigger enabled");
    assert!(state.calculating);
    assert_eq!(state.trigger_label(), "Calculating…");
    assert_eq!(selection.home.code, 4);
    assert_eq!(selection.away.code, 0);

    let outcome = client
        .predict(&selection, &mut rand::thread_rng())
        .expect("fallback never errors");
    assert_eq!(outcome.source, PredictionSource::Simulated);
    apply_delta(&mut state, Delta::PredictionReady(outcome));

    let view = state.prediction.expect("prediction rendered");
    let total = u32::from(view.home_pct) + u32::from(view.draw_pct) + u32::from(view.away_pct);
    assert!((99..=101).contains(&total), "total {total}");
    assert!(view.score.0 <= 2 && view.score.1 <= 2);
    assert!((3..=10).contains(&view.corners.0));
    assert!((2..=9).contains(&view.corners.1));
    assert!((1..=5).contains(&view.cards.0));
    assert!((1..=5).contains(&view.cards.1));
    assert!(state.notice.is_none());
    assert!(!state.calculating);
    assert_eq!(state.trigger_label(), "Predict");
}

#[test]
fn trigger_is_disabled_while_calculating() {
    let mut state = app_state("Emelec", "Barcelona SC");
    assert!(state.begin_prediction().is_some());
    assert!(state.begin_prediction().is_none());
    assert!(state.calculating);
}

#[test]
fn unexpected_failure_shows_notice_and_next_attempt_clears_it() {
    let mut state = app_state("Emelec", "Barcelona SC");
    state.begin_prediction().unwrap();
    apply_delta(&mut state, Delta::PredictionFailed(PredictError::WorkerGone));
    assert_eq!(state.notice.as_deref(), Some(UNEXPECTED_NOTICE));
    assert!(!state.calculating);
    assert!(state.prediction.is_none());

    state.begin_prediction().unwrap();
    assert!(state.notice.is_none());
}

#[test]
fn notice_can_be_dismissed() {
    let mut state = app_state("Emelec", "Barcelona SC");
    state.fail_prediction(&PredictError::UnknownTeam("Nobody".to_string()));
    assert!(state.notice.is_some());
    state.dismiss_notice();
    assert!(state.notice.is_none());
}

#[test]
fn same_team_on_both_sides_rolls_to_next_entry() {
    let mut state = app_state("Emelec", "Barcelona SC");
    state.selection.on_home_changed("Aucas").unwrap();
    state.selection.on_away_changed("Aucas").unwrap();
    assert_eq!(state.selection.away_name(), "Aucas");
    assert_eq!(state.selection.home_name(), "Universidad Catolica");

    state.selection.on_home_changed("Aucas").unwrap();
    assert_eq!(state.selection.home_name(), "Aucas");
    assert_eq!(state.selection.away_name(), "Universidad Catolica");

    let mut state = app_state("Aucas", "Aucas");
    assert_eq!(state.selection.home_name(), "Aucas");
    assert_eq!(state.selection.away_name(), "Universidad Catolica");
    state.swap();
    assert_eq!(state.selection.home_name(), "Universidad Catolica");
    assert_eq!(state.selection.display().home_label, "Wins Universidad Catolica");
}

#[test]
fn worker_answers_over_channels() {
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let handle = spawn_prediction_worker(
        PredictionClient::new(TeamRegistry::builtin(), NotFound),
        tx,
        cmd_rx,
    );

    let mut state = app_state("Emelec", "Barcelona SC");
    let selection = state.begin_prediction().unwrap();
    cmd_tx.send(ProviderCommand::Predict(selection)).unwrap();

    let delta = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("worker replies");
    assert!(matches!(delta, Delta::PredictionReady(_)));
    apply_delta(&mut state, delta);
    assert!(state.prediction.is_some());

    drop(cmd_tx);
    handle.join().unwrap();
}

#[test]
fn panicking_backend_reports_failure_and_worker_keeps_serving() {
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let handle = spawn_prediction_worker(
        PredictionClient::new(TeamRegistry::builtin(), Exploding),
        tx,
        cmd_rx,
    );

    let mut state = app_state("Emelec", "Barcelona SC");
    let selection = state.begin_prediction().unwrap();
    cmd_tx.send(ProviderCommand::Predict(selection)).unwrap();
    let delta = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("worker replies");
    assert!(matches!(
        delta,
        Delta::PredictionFailed(PredictError::BackendPanic(ref msg)) if msg == "backend blew up"
    ));
    apply_delta(&mut state, delta);
    assert!(!state.calculating);
    assert_eq!(state.trigger_label(), "Predict");
    assert_eq!(state.notice.as_deref(), Some(UNEXPECTED_NOTICE));

    // Still alive for the next request.
    let selection = state.begin_prediction().unwrap();
    cmd_tx.send(ProviderCommand::Predict(selection)).unwrap();
    assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());

    drop(cmd_tx);
    handle.join().unwrap();
}

#[test]
fn worker_gone_mid_request_releases_trigger() {
    let (tx, rx) = mpsc::channel::<Delta>();
    let mut state = app_state("Emelec", "Barcelona SC");
    state.begin_prediction().unwrap();
    assert!(drain_deltas(&mut state, &rx));
    assert!(state.calculating);

    drop(tx);
    assert!(!drain_deltas(&mut state, &rx));
    assert!(!state.calculating);
    assert_eq!(state.trigger_label(), "Predict");
    assert_eq!(state.notice.as_deref(), Some(UNEXPECTED_NOTICE));

    // Later ticks see the same closed channel and leave an idle state alone.
    state.dismiss_notice();
    assert!(!drain_deltas(&mut state, &rx));
    assert!(state.notice.is_none());
}

#[test]
fn drain_applies_pending_deltas_before_reporting_disconnect() {
    let (tx, rx) = mpsc::channel();
    let mut state = app_state("Emelec", "Barcelona SC");
    let selection = state.begin_prediction().unwrap();
    let outcome = PredictionClient::new(TeamRegistry::builtin(), NotFound)
        .predict(&selection, &mut rand::thread_rng())
        .unwrap();
    tx.send(Delta::PredictionReady(outcome)).unwrap();
    drop(tx);

    assert!(!drain_deltas(&mut state, &rx));
    assert!(state.prediction.is_some());
    assert!(state.notice.is_none());
    assert!(!state.calculating);
}

#[test]
fn http_404_falls_back_to_simulation() {
    let (url, seen) = one_shot_server("HTTP/1.1 404 Not Found", "{\"error\":\"missing\"}");
    let client = PredictionClient::new(TeamRegistry::builtin(), HttpBackend::new(url, None));
    let state = app_state("Emelec", "Barcelona SC");

    let outcome = client
        .predict(&state.selection.selection(), &mut rand::thread_rng())
        .unwrap();
    assert_eq!(outcome.source, PredictionSource::Simulated);

    let raw = seen.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(raw.starts_with("POST /api/predict"));
    assert!(raw.contains("\"home_name\":\"Emelec\""));
    assert!(raw.contains("\"home_code\":4"));
    assert!(raw.contains("\"away_code\":0"));
}

#[test]
fn http_success_is_used_as_is() {
    let (url, _seen) = one_shot_server(
        "HTTP/1.1 200 OK",
        "{\"home_win\":0.52,\"draw\":0.27,\"away_win\":0.21,\"score\":{\"home\":2,\"away\":1}}",
    );
    let client = PredictionClient::new(TeamRegistry::builtin(), HttpBackend::new(url, None));
    let mut state = app_state("Emelec", "Barcelona SC");
    let selection = state.begin_prediction().unwrap();

    let outcome = client.predict(&selection, &mut rand::thread_rng()).unwrap();
    assert_eq!(outcome.source, PredictionSource::Remote);
    apply_delta(&mut state, Delta::PredictionReady(outcome));

    let view = state.prediction.unwrap();
    assert_eq!((view.home_pct, view.draw_pct, view.away_pct), (52, 27, 21));
    assert_eq!(view.score, (2, 1));
    // Corners and cards were absent and get filled locally.
    assert!((2..=9).contains(&view.corners.0));
    assert!((2..=9).contains(&view.corners.1));
    assert!((1..=5).contains(&view.cards.0));
}

#[test]
fn malformed_success_body_falls_back() {
    let (url, _seen) = one_shot_server("HTTP/1.1 200 OK", "not json at all");
    let client = PredictionClient::new(TeamRegistry::builtin(), HttpBackend::new(url, None));
    let state = app_state("Delfin", "Libertad");
    let outcome = client
        .predict(&state.selection.selection(), &mut rand::thread_rng())
        .unwrap();
    assert_eq!(outcome.source, PredictionSource::Simulated);
}

#[test]
fn unreachable_backend_falls_back() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = PredictionClient::new(
        TeamRegistry::builtin(),
        HttpBackend::new(format!("http://{addr}/api/predict"), None),
    );
    let state = app_state("Emelec", "Barcelona SC");
    let outcome = client
        .predict(&state.selection.selection(), &mut rand::thread_rng())
        .unwrap();
    assert_eq!(outcome.source, PredictionSource::Simulated);
}
