//! End-to-end properties of the mission store: undo protocol, persistence
//! across store instances, and the import/export contract.

use mision_core::{MissionStore, StateDir, export_file_name};
use mision_types::{TaskDraft, TaskId, TeamId};

fn team(n: u32) -> TeamId {
    TeamId::new(n).unwrap()
}

fn draft(action: &str) -> TaskDraft {
    TaskDraft {
        action: action.to_string(),
        ..TaskDraft::default()
    }
}

#[test]
fn undo_after_single_removal_restores_content_and_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = MissionStore::new(StateDir::open(dir.path()));
    store.select_team(team(3));

    let first = store.add_task(draft("Recoger muestras")).unwrap();
    let second = store.add_task(draft("Medir pH")).unwrap();
    let before = store.snapshot().action_plan_tasks.clone();

    let removed = store.remove_task(first).expect("task exists");
    assert_eq!(removed.action, "Recoger muestras");
    assert_eq!(store.snapshot().action_plan_tasks.len(), 1);

    assert!(store.undo_remove_task());
    let after = &store.snapshot().action_plan_tasks;
    assert_eq!(after, &before, "exact pre-removal content and order");
    assert_eq!(after[0].id, first);
    assert_eq!(after[1].id, second);

    // The slot is spent: a second undo is a no-op.
    assert!(!store.undo_remove_task());
}

#[test]
fn only_the_most_recent_removal_is_recoverable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = MissionStore::new(StateDir::open(dir.path()));
    store.select_team(team(1));

    let a = store.add_task(draft("A")).unwrap();
    let b = store.add_task(draft("B")).unwrap();
    store.remove_task(a);
    store.remove_task(b);
    assert!(store.undo_remove_task());

    let actions: Vec<&str> = store
        .snapshot()
        .action_plan_tasks
        .iter()
        .map(|t| t.action.as_str())
        .collect();
    assert_eq!(actions, ["B"], "A is permanently gone");
}

#[test]
fn undo_reinserts_between_surviving_tasks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = MissionStore::new(StateDir::open(dir.path()));
    store.select_team(team(1));

    store.add_task(draft("uno"));
    let middle = store.add_task(draft("dos")).unwrap();
    store.add_task(draft("tres"));

    store.remove_task(middle);
    assert!(store.undo_remove_task());

    let actions: Vec<&str> = store
        .snapshot()
        .action_plan_tasks
        .iter()
        .map(|t| t.action.as_str())
        .collect();
    assert_eq!(actions, ["uno", "dos", "tres"]);
}

#[test]
fn progress_survives_a_new_store_instance() {
    let dir = tempfile::tempdir().expect("tempdir");

    {
        let mut store = MissionStore::new(StateDir::open(dir.path()));
        store.select_team(team(3));
        store.add_task(draft("Recoger muestras"));
        store.add_task(draft("Medir pH"));
        store.set_hypothesis("Se pierde agua por fugas".to_string());
        store.advance_module();
    }

    let mut store = MissionStore::new(StateDir::open(dir.path()));
    store.select_team(team(3));
    let state = store.snapshot();
    assert_eq!(state.current_module, 2);
    assert_eq!(state.action_plan_tasks.len(), 2);
    assert_eq!(state.hypothesis, "Se pierde agua por fugas");

    // Counters reseed above persisted ids.
    let next = store.add_task(draft("Graficar")).unwrap();
    assert_eq!(next, TaskId::new(3));
}

#[test]
fn exit_resets_in_memory_but_keeps_durable_progress() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = MissionStore::new(StateDir::open(dir.path()));

    store.select_team(team(4));
    store.add_observation("el agua llega sucia");
    store.go_to_module(5);

    store.go_to_module(0);
    assert_eq!(store.snapshot().current_module, 0);
    assert_eq!(store.active_team(), None);
    assert!(store.snapshot().observations.is_empty());

    store.select_team(team(4));
    assert_eq!(store.snapshot().current_module, 5);
    assert_eq!(store.snapshot().observations, ["el agua llega sucia"]);
}

#[test]
fn clear_active_team_is_irreversible() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = MissionStore::new(StateDir::open(dir.path()));

    store.select_team(team(6));
    store.add_observation("datos importantes");
    store.clear_active_team();
    assert_eq!(store.active_team(), None);
    assert_eq!(store.snapshot().current_module, 0);

    store.select_team(team(6));
    assert!(store.snapshot().observations.is_empty(), "fresh template");
    assert_eq!(store.snapshot().current_module, 1);
}

#[test]
fn selecting_another_team_discards_pending_undo() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = MissionStore::new(StateDir::open(dir.path()));

    store.select_team(team(1));
    let id = store.add_task(draft("solo del equipo 1")).unwrap();
    store.remove_task(id);

    store.select_team(team(2));
    assert!(!store.undo_remove_task(), "undo must not cross teams");
    assert!(store.snapshot().action_plan_tasks.is_empty());
}

#[test]
fn export_import_round_trip_across_machines() {
    let source_dir = tempfile::tempdir().expect("tempdir");
    let mut source = MissionStore::new(StateDir::open(source_dir.path()));
    source.select_team(team(3));
    source.add_observation("observación");
    source.add_task(TaskDraft {
        action: "Recoger muestras".to_string(),
        materials: "Botellas".to_string(),
        role: "Luis".to_string(),
        time: "Martes".to_string(),
        indicator: "6 muestras".to_string(),
    });
    source.add_experiment_data_point("Día 1", 23.5);
    source.set_conclusion("Conclusión final".to_string());
    let exported = source.export().expect("active team");
    assert_eq!(export_file_name(source.snapshot()), "mision_datos_Equipo_3.json");

    // A different machine: fresh directory, fresh store.
    let target_dir = tempfile::tempdir().expect("tempdir");
    let mut target = MissionStore::new(StateDir::open(target_dir.path()));
    let adopted = target.import(&exported).expect("valid export");
    assert_eq!(adopted, team(3));
    assert_eq!(target.active_team(), Some(team(3)));
    assert_eq!(target.snapshot(), source.snapshot());

    // The import persisted immediately: re-selecting reloads it.
    let mut reopened = MissionStore::new(StateDir::open(target_dir.path()));
    reopened.select_team(team(3));
    assert_eq!(reopened.snapshot(), source.snapshot());

    // Imported ids seed the counters.
    let next = reopened.add_task(draft("nueva tarea")).unwrap();
    assert_eq!(next, TaskId::new(2));
}

#[test]
fn failed_import_leaves_the_store_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = MissionStore::new(StateDir::open(dir.path()));
    store.select_team(team(2));
    store.add_observation("intacta");
    let before = store.snapshot().clone();

    assert!(store.import("{").is_err());
    assert!(store.import(r#"{"currentModule": 1}"#).is_err());
    assert!(
        store
            .import(r#"{"teamName": "Equipo 2"}"#)
            .is_err()
    );

    assert_eq!(store.snapshot(), &before);
    assert_eq!(store.active_team(), Some(team(2)));
}

#[test]
fn scenario_team_three_undo_preserves_order_and_ids() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = MissionStore::new(StateDir::open(dir.path()));

    store.select_team(team(3));
    let recoger = store.add_task(draft("Recoger muestras")).unwrap();
    let medir = store.add_task(draft("Medir pH")).unwrap();
    store.remove_task(recoger);
    assert!(store.undo_remove_task());

    let tasks = &store.snapshot().action_plan_tasks;
    let actions: Vec<&str> = tasks.iter().map(|t| t.action.as_str()).collect();
    assert_eq!(actions, ["Recoger muestras", "Medir pH"]);
    assert_eq!(tasks[0].id, recoger);
    assert_eq!(tasks[1].id, medir);
}
