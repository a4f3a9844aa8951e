//! The Mission State Store.
//!
//! Single source of truth for the active team's [`MissionState`]. Every
//! mutation is persisted before returning control to the caller; reads always
//! reflect the last successful mutation. Operations are synchronous and never
//! re-entrant - the store is only ever driven by one caller context at a time.
//!
//! Persistence failures are logged and do **not** roll back the in-memory
//! mutation: the operation is considered to have succeeded for the session
//! even if not durable. For a fire-and-forget local tool this favors
//! availability over durability.

use mision_types::{DataPoint, DataPointId, MissionState, Task, TaskDraft, TaskId, TeamId};

use crate::codec::{self, ImportError};
use crate::persistence::StateDir;

pub struct MissionStore {
    storage: StateDir,
    active_team: Option<TeamId>,
    state: MissionState,
    /// The single most-recently-removed task, kept for one-step recovery.
    /// A second removal before an undo overwrites it.
    pending_undo: Option<Task>,
    next_task_id: u64,
    next_data_point_id: u64,
}

impl MissionStore {
    /// Create a store over a state directory, with no team selected.
    #[must_use]
    pub fn new(storage: StateDir) -> Self {
        Self {
            storage,
            active_team: None,
            state: MissionState::default(),
            pending_undo: None,
            next_task_id: 1,
            next_data_point_id: 1,
        }
    }

    // ------------------------------------------------------------------
    // Team lifecycle
    // ------------------------------------------------------------------

    /// Make `team` the active team, loading its durable record if one
    /// exists, else starting from a fresh template.
    ///
    /// Malformed durable data falls back to a fresh template (logged inside
    /// the persistence layer, not surfaced). Any pending undo is dropped and
    /// id counters reseed above the loaded record's ids.
    pub fn select_team(&mut self, team: TeamId) {
        let state = self
            .storage
            .load(team)
            .unwrap_or_else(|| MissionState::fresh(team));
        self.next_task_id = state.next_task_id();
        self.next_data_point_id = state.next_data_point_id();
        self.state = state;
        self.active_team = Some(team);
        self.pending_undo = None;
    }

    /// Erase the active team's durable record and reset to the unselected
    /// template. Irreversible; obtaining confirmation is the caller's
    /// concern.
    pub fn clear_active_team(&mut self) {
        if let Some(team) = self.active_team.take()
            && let Err(e) = self.storage.remove(team)
        {
            tracing::warn!("Failed to erase durable record for team {team}: {e}");
        }
        self.reset_in_memory();
    }

    /// Navigate to module `n`.
    ///
    /// `n == 0` behaves as "exit": the in-memory state resets to the
    /// unselected template without touching durable storage, so progress
    /// remains recoverable by re-selecting the team. `n > 0` sets the module
    /// and persists.
    pub fn go_to_module(&mut self, n: u32) {
        if n == 0 {
            self.active_team = None;
            self.reset_in_memory();
        } else {
            self.state.current_module = n;
            self.persist();
        }
    }

    /// Advance to the next module.
    pub fn advance_module(&mut self) {
        self.state.current_module += 1;
        self.persist();
    }

    #[must_use]
    pub fn active_team(&self) -> Option<TeamId> {
        self.active_team
    }

    /// Read-only view of the current state for rendering and reports.
    #[must_use]
    pub fn snapshot(&self) -> &MissionState {
        &self.state
    }

    // ------------------------------------------------------------------
    // Field setters
    // ------------------------------------------------------------------

    /// Replace the problem statement. The external validation gates *when*
    /// this is called, not this store.
    pub fn set_problem_statement(&mut self, text: String) {
        self.state.problem_statement = text;
        self.persist();
    }

    pub fn set_hypothesis(&mut self, text: String) {
        self.state.hypothesis = text;
        self.persist();
    }

    pub fn set_analysis(&mut self, text: String) {
        self.state.analysis = text;
        self.persist();
    }

    pub fn set_conclusion(&mut self, text: String) {
        self.state.conclusion = text;
        self.persist();
    }

    // ------------------------------------------------------------------
    // Observations
    // ------------------------------------------------------------------

    /// Append a brainstorm entry; text that trims to empty is a no-op.
    pub fn add_observation(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.state.observations.push(text.to_string());
        self.persist();
    }

    /// Replace an entry in place; out-of-range indices are a no-op.
    pub fn update_observation(&mut self, index: usize, text: String) {
        let Some(slot) = self.state.observations.get_mut(index) else {
            return;
        };
        *slot = text;
        self.persist();
    }

    /// Remove the entry at `index` if in range.
    pub fn remove_observation(&mut self, index: usize) {
        if index >= self.state.observations.len() {
            return;
        }
        self.state.observations.remove(index);
        self.persist();
    }

    // ------------------------------------------------------------------
    // Action plan tasks
    // ------------------------------------------------------------------

    /// Append a task from a draft, assigning a fresh unique id.
    ///
    /// Returns `None` (no-op) when the draft's action trims to empty.
    pub fn add_task(&mut self, draft: TaskDraft) -> Option<TaskId> {
        if !draft.is_valid() {
            return None;
        }
        let id = TaskId::new(self.next_task_id);
        self.next_task_id += 1;
        self.state.action_plan_tasks.push(draft.into_task(id));
        self.persist();
        Some(id)
    }

    /// Remove a task, keeping it as the single pending-undo item.
    ///
    /// Returns the removed task so the caller can drive a time-limited
    /// "Undo" affordance - the expiry window is caller policy, not a store
    /// guarantee. An unknown id is a no-op.
    pub fn remove_task(&mut self, id: TaskId) -> Option<Task> {
        let index = self.state.action_plan_tasks.iter().position(|t| t.id == id)?;
        let task = self.state.action_plan_tasks.remove(index);
        self.pending_undo = Some(task.clone());
        self.persist();
        Some(task)
    }

    /// Reinsert the pending-undo task at its sort position by id, which for
    /// monotonically increasing ids reproduces the original insertion order.
    ///
    /// Returns false (no-op) when nothing is pending.
    pub fn undo_remove_task(&mut self) -> bool {
        let Some(task) = self.pending_undo.take() else {
            return false;
        };
        let tasks = &mut self.state.action_plan_tasks;
        let index = tasks
            .iter()
            .position(|t| t.id > task.id)
            .unwrap_or(tasks.len());
        tasks.insert(index, task);
        self.persist();
        true
    }

    // ------------------------------------------------------------------
    // Experiment data
    // ------------------------------------------------------------------

    /// Append a data point with a fresh unique id.
    ///
    /// Returns `None` (no-op) when the label trims to empty or the value is
    /// not finite.
    pub fn add_experiment_data_point(&mut self, label: &str, value: f64) -> Option<DataPointId> {
        if !DataPoint::fields_are_valid(label, value) {
            return None;
        }
        let id = DataPointId::new(self.next_data_point_id);
        self.next_data_point_id += 1;
        self.state.experiment_data.push(DataPoint {
            id,
            label: label.to_string(),
            value,
        });
        self.persist();
        Some(id)
    }

    /// Remove a data point if present. No undo tracking here - the
    /// asymmetry with tasks is a deliberate design choice.
    pub fn remove_experiment_data_point(&mut self, id: DataPointId) -> bool {
        let Some(index) = self.state.experiment_data.iter().position(|d| d.id == id) else {
            return false;
        };
        self.state.experiment_data.remove(index);
        self.persist();
        true
    }

    // ------------------------------------------------------------------
    // Import / export
    // ------------------------------------------------------------------

    /// Validate and adopt an imported document as the active state for the
    /// team named inside it, then persist.
    ///
    /// On failure the active state is untouched and the error is returned as
    /// a value - no partial import.
    pub fn import(&mut self, text: &str) -> Result<TeamId, ImportError> {
        let import = codec::deserialize(text)?;
        self.active_team = Some(import.team);
        self.next_task_id = import.state.next_task_id();
        self.next_data_point_id = import.state.next_data_point_id();
        self.state = import.state;
        self.pending_undo = None;
        self.persist();
        Ok(import.team)
    }

    /// The portable text form of the current state, or `None` when no team
    /// is selected.
    #[must_use]
    pub fn export(&self) -> Option<String> {
        self.active_team.map(|_| codec::serialize(&self.state))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn reset_in_memory(&mut self) {
        self.state = MissionState::default();
        self.pending_undo = None;
        self.next_task_id = 1;
        self.next_data_point_id = 1;
    }

    /// Best-effort durable write of the active record.
    fn persist(&self) {
        let Some(team) = self.active_team else {
            return;
        };
        if let Err(e) = self.storage.save(team, &self.state) {
            tracing::warn!("Failed to persist mission state for team {team}: {e}");
        }
    }
}
