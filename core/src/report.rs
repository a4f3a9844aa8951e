//! Read-only report and progress summary.
//!
//! Both are pure functions of the store snapshot: no state mutation,
//! regenerable at any time.

use std::fmt::Write;

use mision_types::{MissionState, Module};

const EMPTY_SECTION: &str = "(pendiente)";

/// Completed/pending checklist of the mission, one entry per stage artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionSummary {
    pub completed: Vec<&'static str>,
    pub pending: Vec<&'static str>,
}

/// Build the completed/pending checklist from a snapshot.
#[must_use]
pub fn mission_summary(state: &MissionState) -> MissionSummary {
    let checks: [(bool, &'static str, &'static str); 7] = [
        (
            !state.observations.is_empty(),
            "✅ Lluvia de ideas inicial",
            "✏️ Realizar la lluvia de ideas inicial",
        ),
        (
            !state.problem_statement.is_empty(),
            "✅ Pregunta de investigación definida",
            "✏️ Definir la pregunta de investigación",
        ),
        (
            !state.action_plan_tasks.is_empty(),
            "✅ Plan de acción creado",
            "✏️ Crear el plan de acción",
        ),
        (
            !state.hypothesis.is_empty(),
            "✅ Hipótesis formulada",
            "✏️ Formular una hipótesis",
        ),
        (
            !state.experiment_data.is_empty(),
            "✅ Datos del experimento recolectados",
            "✏️ Recolectar datos del experimento",
        ),
        (
            !state.analysis.is_empty(),
            "✅ Análisis de resultados escrito",
            "✏️ Escribir el análisis de resultados",
        ),
        (
            !state.conclusion.is_empty(),
            "✅ Conclusión de la misión escrita",
            "✏️ Escribir la conclusión de la misión",
        ),
    ];

    let mut summary = MissionSummary {
        completed: Vec::new(),
        pending: Vec::new(),
    };
    for (done, completed, pending) in checks {
        if done {
            summary.completed.push(completed);
        } else {
            summary.pending.push(pending);
        }
    }
    summary
}

/// Render the full mission report in fixed section order:
/// Problem → Plan → Hypothesis → Experiment → Analysis → Conclusion.
#[must_use]
pub fn mission_report(state: &MissionState) -> String {
    let mut out = String::new();
    let title = if state.team_name.is_empty() {
        "Reporte de misión".to_string()
    } else {
        format!("Reporte de misión — {}", state.team_name)
    };
    let _ = writeln!(out, "# {title}");
    if let Some(module) = Module::from_index(state.current_module) {
        let _ = writeln!(out, "Módulo actual: {}", module.title());
    }

    for module in Module::ALL {
        let _ = writeln!(out, "\n## {}", module.title());
        match module {
            Module::Problem => {
                push_text(&mut out, &state.problem_statement);
                if !state.observations.is_empty() {
                    let _ = writeln!(out, "\nLluvia de ideas:");
                    for observation in &state.observations {
                        let _ = writeln!(out, "- {observation}");
                    }
                }
            }
            Module::Plan => {
                if state.action_plan_tasks.is_empty() {
                    let _ = writeln!(out, "{EMPTY_SECTION}");
                }
                for task in &state.action_plan_tasks {
                    let _ = writeln!(out, "- {}", task.action);
                    for (label, value) in [
                        ("Materiales", &task.materials),
                        ("Responsable", &task.role),
                        ("Tiempo", &task.time),
                        ("Indicador", &task.indicator),
                    ] {
                        if !value.is_empty() {
                            let _ = writeln!(out, "  - {label}: {value}");
                        }
                    }
                }
            }
            Module::Hypothesis => push_text(&mut out, &state.hypothesis),
            Module::Experiment => {
                if state.experiment_data.is_empty() {
                    let _ = writeln!(out, "{EMPTY_SECTION}");
                }
                for point in &state.experiment_data {
                    let _ = writeln!(out, "- {}: {}", point.label, point.value);
                }
            }
            Module::Analysis => push_text(&mut out, &state.analysis),
            Module::Conclusion => push_text(&mut out, &state.conclusion),
        }
    }

    out
}

fn push_text(out: &mut String, text: &str) {
    let text = if text.is_empty() { EMPTY_SECTION } else { text };
    let _ = writeln!(out, "{text}");
}
