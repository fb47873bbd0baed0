use anyhow::{Context, Result};

use upsbet_terminal::config::AppConfig;
use upsbet_terminal::predict_client::{HttpBackend, PredictionClient};
use upsbet_terminal::registry::TeamRegistry;
use upsbet_terminal::render;
use upsbet_terminal::selection::SelectionController;

fn main() -> Result<()> {
    let cfg = AppConfig::load();
    let registry = TeamRegistry::builtin();

    let mut selection = SelectionController::initialize(
        registry,
        cfg.assets_base.clone(),
        &cfg.default_home,
        &cfg.default_away,
    )
    .context("failed to set up team selection")?;
    if let Some(home) = parse_named_arg("--home") {
        selection.on_home_changed(&home)?;
    }
    if let Some(away) = parse_named_arg("--away") {
        selection.on_away_changed(&away)?;
    }

    let client = PredictionClient::new(
        registry,
        HttpBackend::new(cfg.endpoint_url(), cfg.timeout),
    );
    let mut rng = rand::thread_rng();
    let outcome = client.predict(&selection.selection(), &mut rng)?;
    let view = render::render_prediction(&outcome.result, &mut rng);
    let display = selection.display();

    println!("{} vs {}", selection.home_name(), selection.away_name());
    println!("Endpoint: {}", client.backend().url());
    println!("Source: {}", outcome.source.label());
    println!("{}: {}%", display.home_label, view.home_pct);
    println!("Draw: {}%", view.draw_pct);
    println!("{}: {}%", display.away_label, view.away_pct);
    println!("Score: {}", view.score_text());
    println!("Corners: {} / {}", view.corners.0, view.corners.1);
    println!("Cards: {} / {}", view.cards.0, view.cards.1);

    Ok(())
}

fn parse_named_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
