//! Roster lookup: which students exist, which group they attend, and which
//! team owns their mission record.
//!
//! The roster is read-only reference data. It loads from a `roster.toml`
//! next to the mission data when one exists, else from an embedded default.
//! The store's `select_team` is driven by the `team` value found here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use mision_types::TeamId;

const DEFAULT_ROSTER: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/roster.toml"));

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster file {path}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse roster: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Error)]
pub enum StudentError {
    #[error("student name must not be empty")]
    EmptyName,
    #[error("student group must not be empty")]
    EmptyGroup,
}

#[derive(Deserialize)]
struct RawStudent {
    name: String,
    team: TeamId,
    group: String,
}

/// One roster entry.
///
/// Invariant: `name` and `group` are non-empty and `team` is nonzero
/// (enforced at the deserialization boundary).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawStudent")]
pub struct Student {
    name: String,
    team: TeamId,
    group: String,
}

impl TryFrom<RawStudent> for Student {
    type Error = StudentError;

    fn try_from(raw: RawStudent) -> Result<Self, Self::Error> {
        if raw.name.trim().is_empty() {
            return Err(StudentError::EmptyName);
        }
        if raw.group.trim().is_empty() {
            return Err(StudentError::EmptyGroup);
        }
        Ok(Self {
            name: raw.name,
            team: raw.team,
            group: raw.group,
        })
    }
}

impl Student {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn team(&self) -> TeamId {
        self.team
    }

    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }
}

#[derive(Deserialize)]
struct RawRoster {
    #[serde(default)]
    students: Vec<Student>,
}

#[derive(Debug, Clone)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    pub fn from_toml(text: &str) -> Result<Self, RosterError> {
        let raw: RawRoster = toml::from_str(text)?;
        Ok(Self {
            students: raw.students,
        })
    }

    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let text = fs::read_to_string(path).map_err(|source| RosterError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Load `path` when it exists; fall back to the embedded default roster
    /// otherwise, or when the file fails to parse (logged, not surfaced).
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(roster) => roster,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Ignoring unreadable roster file: {e}");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// All group ids, sorted and deduplicated.
    #[must_use]
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = self.students.iter().map(|s| s.group.as_str()).collect();
        groups.sort_unstable();
        groups.dedup();
        groups
    }

    /// Students of one group, sorted by name.
    #[must_use]
    pub fn students_in_group(&self, group: &str) -> Vec<&Student> {
        let mut students: Vec<&Student> =
            self.students.iter().filter(|s| s.group == group).collect();
        students.sort_by(|a, b| a.name.cmp(&b.name));
        students
    }

    /// Exact-name lookup.
    #[must_use]
    pub fn find_student(&self, name: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.name == name)
    }

    /// Members of one team, sorted by name.
    #[must_use]
    pub fn team_members(&self, team: TeamId) -> Vec<&Student> {
        let mut students: Vec<&Student> =
            self.students.iter().filter(|s| s.team == team).collect();
        students.sort_by(|a, b| a.name.cmp(&b.name));
        students
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::from_toml(DEFAULT_ROSTER).expect("embedded default roster must parse")
    }
}
