//! Transfer codec: the portable text form of a [`MissionState`].
//!
//! Serialization is plain pretty-printed JSON of the state record (the same
//! schema the durable record uses). Deserialization validates the whole
//! document before anything is adopted: schema and identity constraints are
//! enforced here, and a failed import mutates nothing.
//!
//! Raw deserialization structs (with `Option` fields and defaults) stay
//! private in this module; they are resolved into domain types at the parse
//! boundary.

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use mision_types::{DataPoint, DataPointId, MissionState, Task, TaskId, TeamId, TeamIdError};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("document is not valid JSON: {0}")]
    Syntax(serde_json::Error),
    #[error("document does not match the mission schema: {0}")]
    Schema(serde_json::Error),
    #[error("currentModule is missing")]
    MissingCurrentModule,
    #[error("teamName is missing or empty")]
    MissingTeamName,
    #[error(transparent)]
    TeamName(#[from] TeamIdError),
    #[error("duplicate task id {0}")]
    DuplicateTaskId(u64),
    #[error("duplicate data point id {0}")]
    DuplicateDataPointId(u64),
    #[error("data point {0} has a non-finite value")]
    NonFiniteValue(u64),
}

/// A validated import: the parsed record plus the team identity recovered
/// from its `teamName`, which selects the durable slot the record belongs to.
#[derive(Debug, Clone)]
pub struct Import {
    pub team: TeamId,
    pub state: MissionState,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMissionState {
    current_module: Option<u32>,
    team_name: Option<String>,
    #[serde(default)]
    observations: Vec<String>,
    #[serde(default)]
    problem_statement: String,
    #[serde(default)]
    action_plan_tasks: Vec<RawTask>,
    #[serde(default)]
    hypothesis: String,
    #[serde(default)]
    experiment_data: Vec<RawDataPoint>,
    #[serde(default)]
    analysis: String,
    #[serde(default)]
    conclusion: String,
}

// Task `id` and `action` are required with correct types; the descriptive
// fields default to empty so older exports stay importable.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTask {
    id: u64,
    action: String,
    #[serde(default)]
    materials: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    time: String,
    #[serde(default)]
    indicator: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataPoint {
    id: u64,
    label: String,
    value: f64,
}

/// Serialize a state record to its portable text form.
///
/// Deterministic and human-readable; the output round-trips through
/// [`deserialize`] losslessly.
#[must_use]
pub fn serialize(state: &MissionState) -> String {
    serde_json::to_string_pretty(state).expect("MissionState serializes to JSON infallibly")
}

/// Parse and validate a portable text document.
///
/// Rejects the whole document unless it is well-formed JSON, `currentModule`
/// is present and an integer, `teamName` is present and names a team, and
/// every nested task and data point carries its required fields with correct
/// types. Unknown extra fields are ignored for forward compatibility.
pub fn deserialize(text: &str) -> Result<Import, ImportError> {
    let raw: RawMissionState = serde_json::from_str(text).map_err(|e| {
        if matches!(
            e.classify(),
            serde_json::error::Category::Syntax | serde_json::error::Category::Eof
        ) {
            ImportError::Syntax(e)
        } else {
            ImportError::Schema(e)
        }
    })?;

    let current_module = raw
        .current_module
        .ok_or(ImportError::MissingCurrentModule)?;
    let team_name = raw
        .team_name
        .filter(|name| !name.trim().is_empty())
        .ok_or(ImportError::MissingTeamName)?;
    let team = TeamId::from_team_name(&team_name)?;

    let mut task_ids = HashSet::new();
    let mut action_plan_tasks = Vec::with_capacity(raw.action_plan_tasks.len());
    for task in raw.action_plan_tasks {
        if !task_ids.insert(task.id) {
            return Err(ImportError::DuplicateTaskId(task.id));
        }
        action_plan_tasks.push(Task {
            id: TaskId::new(task.id),
            action: task.action,
            materials: task.materials,
            role: task.role,
            time: task.time,
            indicator: task.indicator,
        });
    }

    let mut data_ids = HashSet::new();
    let mut experiment_data = Vec::with_capacity(raw.experiment_data.len());
    for point in raw.experiment_data {
        if !data_ids.insert(point.id) {
            return Err(ImportError::DuplicateDataPointId(point.id));
        }
        if !point.value.is_finite() {
            return Err(ImportError::NonFiniteValue(point.id));
        }
        experiment_data.push(DataPoint {
            id: DataPointId::new(point.id),
            label: point.label,
            value: point.value,
        });
    }

    Ok(Import {
        team,
        state: MissionState {
            current_module,
            team_name,
            observations: raw.observations,
            problem_statement: raw.problem_statement,
            action_plan_tasks,
            hypothesis: raw.hypothesis,
            experiment_data,
            analysis: raw.analysis,
            conclusion: raw.conclusion,
        },
    })
}

/// Filename for the export artifact: the team name with whitespace collapsed
/// to a filename-safe separator.
#[must_use]
pub fn export_file_name(state: &MissionState) -> String {
    let name = state
        .team_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("mision_datos_{name}.json")
}

#[cfg(test)]
mod tests {
    use super::{ImportError, deserialize, export_file_name, serialize};
    use mision_types::{DataPoint, DataPointId, MissionState, TaskDraft, TaskId, TeamId};

    fn populated_state() -> MissionState {
        let team = TeamId::new(3).unwrap();
        let mut state = MissionState::fresh(team);
        state.current_module = 4;
        state.observations = vec!["El agua sale turbia".to_string(), "Fugas".to_string()];
        state.problem_statement = "¿Cuántos litros se pierden al día?".to_string();
        state.action_plan_tasks.push(
            TaskDraft {
                action: "Recoger muestras".to_string(),
                materials: "Botellas".to_string(),
                role: "Ana".to_string(),
                time: "Lunes".to_string(),
                indicator: "6 muestras".to_string(),
            }
            .into_task(TaskId::new(1)),
        );
        state.hypothesis = "Se pierden más de 20 litros".to_string();
        state.experiment_data.push(DataPoint {
            id: DataPointId::new(1),
            label: "Día 1".to_string(),
            value: 23.5,
        });
        state.analysis = "La pérdida supera lo esperado".to_string();
        state.conclusion = "Hay que reparar la toma".to_string();
        state
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let state = populated_state();
        let text = serialize(&state);
        let import = deserialize(&text).unwrap();
        assert_eq!(import.team, TeamId::new(3).unwrap());
        assert_eq!(import.state, state);
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            deserialize("not json at all"),
            Err(ImportError::Syntax(_))
        ));
    }

    #[test]
    fn rejects_missing_team_name() {
        let err = deserialize(r#"{"currentModule": 2}"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingTeamName));
    }

    #[test]
    fn rejects_blank_team_name() {
        let err = deserialize(r#"{"currentModule": 2, "teamName": "   "}"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingTeamName));
    }

    #[test]
    fn rejects_unrecognized_team_name() {
        let err = deserialize(r#"{"currentModule": 2, "teamName": "Grupo 9"}"#).unwrap_err();
        assert!(matches!(err, ImportError::TeamName(_)));
    }

    #[test]
    fn rejects_missing_current_module() {
        let err = deserialize(r#"{"teamName": "Equipo 2"}"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingCurrentModule));
    }

    #[test]
    fn rejects_non_integer_current_module() {
        let err = deserialize(r#"{"currentModule": 2.5, "teamName": "Equipo 2"}"#).unwrap_err();
        assert!(matches!(err, ImportError::Schema(_)));
        let err = deserialize(r#"{"currentModule": "2", "teamName": "Equipo 2"}"#).unwrap_err();
        assert!(matches!(err, ImportError::Schema(_)));
    }

    #[test]
    fn rejects_task_without_action() {
        let text = r#"{
            "currentModule": 2,
            "teamName": "Equipo 2",
            "actionPlanTasks": [{"id": 1}]
        }"#;
        assert!(matches!(deserialize(text), Err(ImportError::Schema(_))));
    }

    #[test]
    fn rejects_duplicate_task_ids() {
        let text = r#"{
            "currentModule": 2,
            "teamName": "Equipo 2",
            "actionPlanTasks": [
                {"id": 1, "action": "a"},
                {"id": 1, "action": "b"}
            ]
        }"#;
        assert!(matches!(
            deserialize(text),
            Err(ImportError::DuplicateTaskId(1))
        ));
    }

    #[test]
    fn rejects_data_point_with_non_numeric_value() {
        let text = r#"{
            "currentModule": 2,
            "teamName": "Equipo 2",
            "experimentData": [{"id": 1, "label": "pH", "value": "alto"}]
        }"#;
        assert!(matches!(deserialize(text), Err(ImportError::Schema(_))));
    }

    #[test]
    fn tolerates_unknown_fields_and_defaults_missing_sections() {
        let text = r#"{
            "currentModule": 1,
            "teamName": "Equipo 5",
            "schemaVersion": 99,
            "actionPlanTasks": [{"id": 2, "action": "Medir pH", "assignee": "x"}]
        }"#;
        let import = deserialize(text).unwrap();
        assert_eq!(import.team.value(), 5);
        assert_eq!(import.state.action_plan_tasks.len(), 1);
        assert_eq!(import.state.action_plan_tasks[0].action, "Medir pH");
        assert_eq!(import.state.action_plan_tasks[0].materials, "");
        assert!(import.state.observations.is_empty());
    }

    #[test]
    fn export_file_name_normalizes_whitespace() {
        let state = MissionState::fresh(TeamId::new(12).unwrap());
        assert_eq!(export_file_name(&state), "mision_datos_Equipo_12.json");
    }
}
