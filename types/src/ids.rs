use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DataPointId(u64);

impl DataPointId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DataPointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TeamIdError {
    #[error("team number must be greater than zero")]
    Zero,
    #[error("team name must look like \"Equipo N\": {0:?}")]
    Name(String),
}

/// Identity of a team: a small nonzero number.
///
/// The canonical display form is `"Equipo N"`, which is also what the
/// durable record and the export artifact carry in `teamName`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TeamId(u32);

impl TeamId {
    pub fn new(number: u32) -> Result<Self, TeamIdError> {
        if number == 0 {
            Err(TeamIdError::Zero)
        } else {
            Ok(Self(number))
        }
    }

    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    /// Canonical team name carried in `MissionState::team_name`.
    #[must_use]
    pub fn team_name(self) -> String {
        format!("Equipo {}", self.0)
    }

    /// Recover a team id from a `"Equipo N"` name.
    ///
    /// Used by the import path to find which durable slot an imported
    /// record belongs to.
    pub fn from_team_name(name: &str) -> Result<Self, TeamIdError> {
        let rest = name
            .trim()
            .strip_prefix("Equipo")
            .ok_or_else(|| TeamIdError::Name(name.to_string()))?;
        let number: u32 = rest
            .trim()
            .parse()
            .map_err(|_| TeamIdError::Name(name.to_string()))?;
        Self::new(number).map_err(|_| TeamIdError::Name(name.to_string()))
    }
}

impl TryFrom<u32> for TeamId {
    type Error = TeamIdError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TeamId> for u32 {
    fn from(value: TeamId) -> Self {
        value.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
