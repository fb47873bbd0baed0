use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Team {
    pub name: &'static str,
    pub code: u32,
    pub logo_file: Option<&'static str>,
}

// Registry order drives both selector population and collision rollover.
const TEAMS: &[Team] = &[
    team("Barcelona SC", 0, "Barcelona_Sporting_Club_Logo.png"),
    team("El Nacional", 2, "Nacional.png"),
    team("Emelec", 4, "EscudoCSEmelec.png"),
    team("LDU de Quito", 5, "Liga_Deportiva_Universitaria_de_Quito.png"),
    team("Mushuc Runa SC", 6, "MushucRuna.png"),
    team("Independiente del Valle", 7, "Independiente_del_Valle_Logo_2022.png"),
    team("CD Tecnico Universitario", 8, "Técnico_Universitario.png"),
    team("Delfin", 9, "Delfín_SC_logo.png"),
    team("Deportivo Cuenca", 10, "Depcuenca.png"),
    team("Aucas", 12, "SD_Aucas_logo.png"),
    team("Universidad Catolica", 13, "Ucatólica.png"),
    team("CSD Macara", 14, "Macara_6.png"),
    team("Orense SC", 15, "Orense_SC_logo.png"),
    team("Manta FC", 17, "Manta_F.C.png"),
    team("Libertad", 20, "Libertad_FC_Ecuador.png"),
    team("Vinotinto", 22, "Vinotinto.png"),
];

const fn team(name: &'static str, code: u32, logo_file: &'static str) -> Team {
    Team {
        name,
        code,
        logo_file: Some(logo_file),
    }
}

pub const DEFAULT_HOME: &str = "Emelec";
pub const DEFAULT_AWAY: &str = "Barcelona SC";

/// Read-only view over a fixed team table.
///
/// The built-in table is what the app ships with; `from_teams` exists so the
/// rollover rules can be exercised against smaller tables.
#[derive(Debug, Clone, Copy)]
pub struct TeamRegistry {
    teams: &'static [Team],
}

impl Default for TeamRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TeamRegistry {
    pub fn builtin() -> Self {
        Self { teams: TEAMS }
    }

    pub fn from_teams(teams: &'static [Team]) -> Self {
        Self { teams }
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn teams(&self) -> &'static [Team] {
        self.teams
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.teams.iter().map(|t| t.name)
    }

    pub fn get(&self, idx: usize) -> Option<&'static Team> {
        self.teams.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.teams.iter().position(|t| t.name == name)
    }

    pub fn find(&self, name: &str) -> Option<&'static Team> {
        self.teams.iter().find(|t| t.name == name)
    }

    pub fn code_of(&self, name: &str) -> Option<u32> {
        self.find(name).map(|t| t.code)
    }

    /// Full logo path under `base`, or `None` when the team has no logo file.
    pub fn logo_path(&self, name: &str, base: &Path) -> Option<PathBuf> {
        let file = self.find(name)?.logo_file?;
        Some(base.join(file))
    }

    /// Index `step` positions away from `idx`, wrapping in both directions.
    pub fn wrap_index(&self, idx: usize, step: isize) -> usize {
        let len = self.teams.len() as isize;
        if len == 0 {
            return 0;
        }
        (idx as isize + step).rem_euclid(len) as usize
    }

    pub fn next_after(&self, name: &str) -> Option<&'static str> {
        let idx = self.index_of(name)?;
        self.get(self.wrap_index(idx, 1)).map(|t| t.name)
    }
}
