use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

use crate::assets::{self, AssetSlot};
use crate::registry::{self, Team, TeamRegistry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("unknown team: {0}")]
    UnknownTeam(String),
    #[error("registry needs at least two teams, has {0}")]
    TooFewTeams(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub home: &'static Team,
    pub away: &'static Team,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDisplay {
    pub home_label: String,
    pub away_label: String,
    pub home_logo: AssetSlot,
    pub away_logo: AssetSlot,
}

/// Keeps the home/away pair distinct and the labels/logos in step with it.
#[derive(Debug, Clone)]
pub struct SelectionController {
    registry: TeamRegistry,
    assets_base: PathBuf,
    home: usize,
    away: usize,
    display: SelectionDisplay,
}

impl SelectionController {
    pub fn initialize(
        registry: TeamRegistry,
        assets_base: impl Into<PathBuf>,
        default_home: &str,
        default_away: &str,
    ) -> Result<Self, SelectionError> {
        if registry.len() < 2 {
            return Err(SelectionError::TooFewTeams(registry.len()));
        }

        let home = resolve_default(&registry, default_home, registry::DEFAULT_HOME, 0);
        let mut away = resolve_default(&registry, default_away, registry::DEFAULT_AWAY, 1);
        if away == home {
            away = registry.wrap_index(home, 1);
        }

        let mut controller = Self {
            registry,
            assets_base: assets_base.into(),
            home,
            away,
            display: SelectionDisplay::default(),
        };
        controller.refresh_display();
        Ok(controller)
    }

    pub fn registry(&self) -> &TeamRegistry {
        &self.registry
    }

    pub fn options(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn home_index(&self) -> usize {
        self.home
    }

    pub fn away_index(&self) -> usize {
        self.away
    }

    pub fn home_name(&self) -> &'static str {
        self.team_at(self.home).name
    }

    pub fn away_name(&self) -> &'static str {
        self.team_at(self.away).name
    }

    pub fn selection(&self) -> Selection {
        Selection {
            home: self.team_at(self.home),
            away: self.team_at(self.away),
        }
    }

    pub fn display(&self) -> &SelectionDisplay {
        &self.display
    }

    pub fn on_home_changed(&mut self, name: &str) -> Result<(), SelectionError> {
        self.set_side(Side::Home, name)
    }

    pub fn on_away_changed(&mut self, name: &str) -> Result<(), SelectionError> {
        self.set_side(Side::Away, name)
    }

    /// Move one side `step` entries through registry order.
    pub fn cycle(&mut self, side: Side, step: isize) {
        let current = match side {
            Side::Home => self.home,
            Side::Away => self.away,
        };
        let idx = self.registry.wrap_index(current, step);
        let Some(team) = self.registry.get(idx) else {
            return;
        };
        // Names come straight from the registry, so this cannot miss.
        let _ = self.set_side(side, team.name);
    }

    pub fn cycle_home(&mut self, step: isize) {
        self.cycle(Side::Home, step);
    }

    pub fn cycle_away(&mut self, step: isize) {
        self.cycle(Side::Away, step);
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.home, &mut self.away);
        self.refresh_display();
    }

    pub fn refresh_display(&mut self) {
        let home = self.home_name();
        let away = self.away_name();
        self.display = SelectionDisplay {
            home_label: format!("Wins {home}"),
            away_label: format!("Wins {away}"),
            home_logo: assets::load_slot(self.registry.logo_path(home, &self.assets_base), home),
            away_logo: assets::load_slot(self.registry.logo_path(away, &self.assets_base), away),
        };
    }

    fn set_side(&mut self, side: Side, name: &str) -> Result<(), SelectionError> {
        let idx = self
            .registry
            .index_of(name)
            .ok_or_else(|| SelectionError::UnknownTeam(name.to_string()))?;
        let next = self.registry.wrap_index(idx, 1);

        let (this, other) = match side {
            Side::Home => (&mut self.home, &mut self.away),
            Side::Away => (&mut self.away, &mut self.home),
        };
        *this = idx;
        if *other == idx {
            *other = next;
            debug!(
                changed = ?side,
                rolled = ?side.other(),
                "selection collision resolved"
            );
        }
        self.refresh_display();
        Ok(())
    }

    fn team_at(&self, idx: usize) -> &'static Team {
        // Indices only ever come from the registry itself.
        &self.registry.teams()[idx]
    }
}

fn resolve_default(registry: &TeamRegistry, wanted: &str, builtin: &str, fallback: usize) -> usize {
    if let Some(idx) = registry.index_of(wanted) {
        return idx;
    }
    warn!(team = wanted, "unknown default team, using {builtin}");
    registry.index_of(builtin).unwrap_or(fallback)
}
