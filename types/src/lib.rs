//! Core domain types for Misión.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies. The state record serializes in camelCase because the durable
//! record and the export artifact share one schema.

mod ids;
pub use ids::{DataPointId, TaskId, TeamId, TeamIdError};

use serde::Serialize;

// ============================================================================
// Mission Modules
// ============================================================================

/// One stage of the fixed mission sequence.
///
/// `MissionState::current_module` stores the stage as a plain integer (0 means
/// "no team loaded"); this enum exists for display code that needs the
/// canonical titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Problem,
    Plan,
    Hypothesis,
    Experiment,
    Analysis,
    Conclusion,
}

impl Module {
    pub const COUNT: u32 = 6;

    pub const ALL: [Self; 6] = [
        Self::Problem,
        Self::Plan,
        Self::Hypothesis,
        Self::Experiment,
        Self::Analysis,
        Self::Conclusion,
    ];

    /// 1-based stage index, matching `MissionState::current_module`.
    #[must_use]
    pub fn index(self) -> u32 {
        match self {
            Self::Problem => 1,
            Self::Plan => 2,
            Self::Hypothesis => 3,
            Self::Experiment => 4,
            Self::Analysis => 5,
            Self::Conclusion => 6,
        }
    }

    #[must_use]
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            1 => Some(Self::Problem),
            2 => Some(Self::Plan),
            3 => Some(Self::Hypothesis),
            4 => Some(Self::Experiment),
            5 => Some(Self::Analysis),
            6 => Some(Self::Conclusion),
            _ => None,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Problem => "Pregunta de investigación",
            Self::Plan => "Plan de acción",
            Self::Hypothesis => "Hipótesis",
            Self::Experiment => "Experimento",
            Self::Analysis => "Análisis",
            Self::Conclusion => "Conclusión",
        }
    }
}

// ============================================================================
// Action Plan Tasks
// ============================================================================

/// One task of the action plan.
///
/// Ids are assigned by the store from a monotonic counter; they are unique
/// within the list and never reused after deletion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub action: String,
    pub materials: String,
    pub role: String,
    pub time: String,
    pub indicator: String,
}

/// Caller-supplied task fields; the store assigns the id.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub action: String,
    pub materials: String,
    pub role: String,
    pub time: String,
    pub indicator: String,
}

impl TaskDraft {
    /// A draft is rejected by `add_task` unless its action has content.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.action.trim().is_empty()
    }

    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            action: self.action,
            materials: self.materials,
            role: self.role,
            time: self.time,
            indicator: self.indicator,
        }
    }
}

// ============================================================================
// Experiment Data
// ============================================================================

/// One measured value of the experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub id: DataPointId,
    pub label: String,
    pub value: f64,
}

impl DataPoint {
    /// A label/value pair is rejected by `add_experiment_data_point` unless
    /// the label has content and the value is finite.
    #[must_use]
    pub fn fields_are_valid(label: &str, value: f64) -> bool {
        !label.trim().is_empty() && value.is_finite()
    }
}

// ============================================================================
// Mission State
// ============================================================================

/// The persisted aggregate: one record per team.
///
/// `current_module` 0 means "no team loaded"; 1..=6 are the ordered stages.
/// Sequence order is meaningful everywhere (display order for observations,
/// insertion order for tasks and data points).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionState {
    pub current_module: u32,
    pub team_name: String,
    pub observations: Vec<String>,
    pub problem_statement: String,
    pub action_plan_tasks: Vec<Task>,
    pub hypothesis: String,
    pub experiment_data: Vec<DataPoint>,
    pub analysis: String,
    pub conclusion: String,
}

impl Default for MissionState {
    /// The unselected template: no team, mission not started.
    fn default() -> Self {
        Self {
            current_module: 0,
            team_name: String::new(),
            observations: Vec::new(),
            problem_statement: String::new(),
            action_plan_tasks: Vec::new(),
            hypothesis: String::new(),
            experiment_data: Vec::new(),
            analysis: String::new(),
            conclusion: String::new(),
        }
    }
}

impl MissionState {
    /// Fresh template for a team that has no durable record yet.
    #[must_use]
    pub fn fresh(team: TeamId) -> Self {
        Self {
            current_module: Module::Problem.index(),
            team_name: team.team_name(),
            ..Self::default()
        }
    }

    /// Next free task id: one past the highest id in the list.
    #[must_use]
    pub fn next_task_id(&self) -> u64 {
        self.action_plan_tasks
            .iter()
            .map(|t| t.id.value())
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Next free data point id: one past the highest id in the list.
    #[must_use]
    pub fn next_data_point_id(&self) -> u64 {
        self.experiment_data
            .iter()
            .map(|d| d.id.value())
            .max()
            .map_or(1, |max| max + 1)
    }
}
