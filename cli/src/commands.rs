//! Command handlers over one store session.
//!
//! Each CLI invocation is short-lived, so the "active team" the store keeps
//! in memory is restored from a pointer file in the data directory. The
//! pointer is a surface convenience owned by this layer: `select` writes it,
//! `exit` removes it without touching durable team data, `clear` removes
//! both.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use mision_core::{MissionStore, StateDir, export_file_name, mission_report, mission_summary};
use mision_feedback::FeedbackClient;
use mision_roster::Roster;
use mision_types::{DataPointId, Module, TaskDraft, TaskId, TeamId};

const ACTIVE_TEAM_FILE: &str = "active_team";
const ROSTER_FILE: &str = "roster.toml";

pub struct Session {
    data_dir: PathBuf,
    store: MissionStore,
}

impl Session {
    /// Open the store over the data directory and restore the active team
    /// from the pointer file, if any.
    pub fn open(data_dir: PathBuf) -> Self {
        let mut store = MissionStore::new(StateDir::open(&data_dir));
        if let Some(team) = read_active_team(&data_dir) {
            store.select_team(team);
        }
        Self { data_dir, store }
    }

    fn active(&self) -> Result<TeamId> {
        self.store
            .active_team()
            .context("No hay equipo activo; usa `mision select <equipo>`")
    }

    fn module_label(&self) -> String {
        let current = self.store.snapshot().current_module;
        match Module::from_index(current) {
            Some(module) => format!("Módulo {current} de {} — {}", Module::COUNT, module.title()),
            None => format!("Módulo {current}"),
        }
    }

    // ------------------------------------------------------------------
    // Team lifecycle
    // ------------------------------------------------------------------

    pub fn select(&mut self, team: u32) -> Result<()> {
        let team = TeamId::new(team)?;
        self.store.select_team(team);
        write_active_team(&self.data_dir, team);
        println!("{} listo. {}", team.team_name(), self.module_label());
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.store.go_to_module(0);
        clear_active_team_pointer(&self.data_dir);
        println!("Misión cerrada. El progreso guardado queda intacto.");
        Ok(())
    }

    pub fn clear(&mut self, yes: bool) -> Result<()> {
        let team = self.active()?;
        if !yes {
            bail!(
                "Esto borra todo el progreso de {} y no se puede deshacer; repite con --yes",
                team.team_name()
            );
        }
        self.store.clear_active_team();
        clear_active_team_pointer(&self.data_dir);
        println!("Progreso de {} borrado.", team.team_name());
        Ok(())
    }

    pub fn status(&self) -> Result<()> {
        let team = self.active()?;
        let state = self.store.snapshot();
        println!("{} — {}", team.team_name(), self.module_label());
        println!(
            "Observaciones: {} | Tareas: {} | Datos: {}",
            state.observations.len(),
            state.action_plan_tasks.len(),
            state.experiment_data.len()
        );
        let summary = mission_summary(state);
        println!(
            "Avance: {} de {} pasos completados",
            summary.completed.len(),
            summary.completed.len() + summary.pending.len()
        );
        Ok(())
    }

    pub fn goto(&mut self, module: u32) -> Result<()> {
        if module == 0 {
            return self.exit();
        }
        self.active()?;
        if module > Module::COUNT {
            bail!("La misión tiene {} módulos", Module::COUNT);
        }
        self.store.go_to_module(module);
        println!("{}", self.module_label());
        Ok(())
    }

    pub fn next(&mut self) -> Result<()> {
        self.active()?;
        if self.store.snapshot().current_module >= Module::COUNT {
            bail!("Ya están en el último módulo; generen el reporte con `mision report`");
        }
        self.store.advance_module();
        println!("{}", self.module_label());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Observations
    // ------------------------------------------------------------------

    pub fn observe_add(&mut self, text: &str) -> Result<()> {
        self.active()?;
        if text.trim().is_empty() {
            bail!("La observación no puede estar vacía");
        }
        self.store.add_observation(text);
        println!("Observación agregada.");
        Ok(())
    }

    pub fn observe_edit(&mut self, index: usize, text: String) -> Result<()> {
        self.active()?;
        if index >= self.store.snapshot().observations.len() {
            bail!("No existe la observación {index}");
        }
        self.store.update_observation(index, text);
        println!("Observación {index} actualizada.");
        Ok(())
    }

    pub fn observe_rm(&mut self, index: usize) -> Result<()> {
        self.active()?;
        if index >= self.store.snapshot().observations.len() {
            bail!("No existe la observación {index}");
        }
        self.store.remove_observation(index);
        println!("Observación {index} eliminada.");
        Ok(())
    }

    pub fn observe_list(&self) -> Result<()> {
        self.active()?;
        let observations = &self.store.snapshot().observations;
        if observations.is_empty() {
            println!("Sin observaciones todavía.");
        }
        for (index, observation) in observations.iter().enumerate() {
            println!("[{index}] {observation}");
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stage texts
    // ------------------------------------------------------------------

    pub fn set_problem(&mut self, text: String) -> Result<()> {
        self.active()?;
        self.store.set_problem_statement(text);
        println!("Pregunta de investigación guardada.");
        Ok(())
    }

    pub fn set_hypothesis(&mut self, text: String) -> Result<()> {
        self.active()?;
        self.store.set_hypothesis(text);
        println!("Hipótesis guardada.");
        Ok(())
    }

    pub fn set_analysis(&mut self, text: String) -> Result<()> {
        self.active()?;
        self.store.set_analysis(text);
        println!("Análisis guardado.");
        Ok(())
    }

    pub fn set_conclusion(&mut self, text: String) -> Result<()> {
        self.active()?;
        self.store.set_conclusion(text);
        println!("Conclusión guardada.");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Action plan tasks
    // ------------------------------------------------------------------

    pub fn task_add(
        &mut self,
        action: String,
        materials: String,
        role: String,
        time: String,
        indicator: String,
    ) -> Result<()> {
        self.active()?;
        let draft = TaskDraft {
            action,
            materials,
            role,
            time,
            indicator,
        };
        match self.store.add_task(draft) {
            Some(id) => println!("Tarea [{id}] agregada al plan."),
            None => bail!("La acción de la tarea no puede estar vacía"),
        }
        Ok(())
    }

    pub fn task_rm(&mut self, id: u64) -> Result<()> {
        self.active()?;
        match self.store.remove_task(TaskId::new(id)) {
            Some(task) => println!(
                "Tarea [{id}] \"{}\" eliminada. Recupérala con `mision task undo`.",
                task.action
            ),
            None => bail!("No existe la tarea {id}"),
        }
        Ok(())
    }

    pub fn task_undo(&mut self) -> Result<()> {
        self.active()?;
        if self.store.undo_remove_task() {
            println!("Tarea restaurada en su lugar original.");
        } else {
            println!("No hay nada que deshacer.");
        }
        Ok(())
    }

    pub fn task_list(&self) -> Result<()> {
        self.active()?;
        let tasks = &self.store.snapshot().action_plan_tasks;
        if tasks.is_empty() {
            println!("El plan de acción está vacío.");
        }
        for task in tasks {
            println!("[{}] {}", task.id, task.action);
            for (label, value) in [
                ("Materiales", &task.materials),
                ("Responsable", &task.role),
                ("Tiempo", &task.time),
                ("Indicador", &task.indicator),
            ] {
                if !value.is_empty() {
                    println!("      {label}: {value}");
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Experiment data
    // ------------------------------------------------------------------

    pub fn data_add(&mut self, label: &str, value: f64) -> Result<()> {
        self.active()?;
        match self.store.add_experiment_data_point(label, value) {
            Some(id) => println!("Dato [{id}] registrado."),
            None => bail!("El dato necesita una etiqueta y un valor numérico finito"),
        }
        Ok(())
    }

    pub fn data_rm(&mut self, id: u64) -> Result<()> {
        self.active()?;
        if self.store.remove_experiment_data_point(DataPointId::new(id)) {
            println!("Dato [{id}] eliminado.");
        } else {
            bail!("No existe el dato {id}");
        }
        Ok(())
    }

    pub fn data_list(&self) -> Result<()> {
        self.active()?;
        let data = &self.store.snapshot().experiment_data;
        if data.is_empty() {
            println!("Sin datos del experimento todavía.");
        }
        for point in data {
            println!("[{}] {}: {}", point.id, point.label, point.value);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Import / export / report
    // ------------------------------------------------------------------

    pub fn export(&self, out: Option<PathBuf>) -> Result<()> {
        self.active()?;
        let text = self.store.export().context("No hay equipo activo")?;
        let path = out.unwrap_or_else(|| PathBuf::from(export_file_name(self.store.snapshot())));
        fs::write(&path, text)
            .with_context(|| format!("No se pudo escribir {}", path.display()))?;
        println!("Exportado a {}", path.display());
        Ok(())
    }

    pub fn import(&mut self, file: &Path) -> Result<()> {
        let text = fs::read_to_string(file)
            .with_context(|| format!("No se pudo leer {}", file.display()))?;
        match self.store.import(&text) {
            Ok(team) => {
                write_active_team(&self.data_dir, team);
                println!("Registro de {} importado y activo.", team.team_name());
                Ok(())
            }
            Err(e) => bail!("Importación rechazada: {e}"),
        }
    }

    pub fn report(&self, summary_only: bool) -> Result<()> {
        self.active()?;
        let state = self.store.snapshot();
        if summary_only {
            let summary = mission_summary(state);
            for line in &summary.completed {
                println!("{line}");
            }
            for line in &summary.pending {
                println!("{line}");
            }
        } else {
            print!("{}", mission_report(state));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Roster
    // ------------------------------------------------------------------

    fn roster(&self) -> Roster {
        Roster::load_or_default(&self.data_dir.join(ROSTER_FILE))
    }

    pub fn roster_groups(&self) -> Result<()> {
        for group in self.roster().groups() {
            println!("{group}");
        }
        Ok(())
    }

    pub fn roster_students(&self, group: &str) -> Result<()> {
        let roster = self.roster();
        let students = roster.students_in_group(group);
        if students.is_empty() {
            bail!("No hay estudiantes en el grupo {group}");
        }
        for student in students {
            println!("{} — {}", student.name(), student.team().team_name());
        }
        Ok(())
    }

    pub fn roster_find(&self, name: &str) -> Result<()> {
        let roster = self.roster();
        let student = roster
            .find_student(name)
            .with_context(|| format!("No se encontró a {name}"))?;
        println!(
            "{} — {} ({})",
            student.name(),
            student.team().team_name(),
            student.group()
        );
        Ok(())
    }

    pub fn roster_team(&self, team: u32) -> Result<()> {
        let team = TeamId::new(team)?;
        let roster = self.roster();
        let members = roster.team_members(team);
        if members.is_empty() {
            bail!("El {} no tiene integrantes en el directorio", team.team_name());
        }
        for student in members {
            println!("{}", student.name());
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mission guide (async boundary)
    // ------------------------------------------------------------------

    pub fn ask(&self, question: &str) -> Result<()> {
        let client = FeedbackClient::from_env();
        let verdict = runtime()?.block_on(client.assess_question(question));
        println!("{}", verdict.feedback);
        if verdict.is_measurable {
            println!("Guárdala con: mision problem \"{question}\"");
        }
        Ok(())
    }

    pub fn ideas(&self, topic: &str) -> Result<()> {
        let client = FeedbackClient::from_env();
        let ideas = runtime()?.block_on(client.suggest_topics(topic));
        if ideas.ideas.is_empty() {
            println!("El guía no tiene ideas por ahora; intenten de nuevo.");
        }
        for idea in &ideas.ideas {
            println!("- {idea}");
        }
        Ok(())
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("No se pudo iniciar el runtime para consultar al guía")
}

// ----------------------------------------------------------------------
// Active-team pointer file
// ----------------------------------------------------------------------

fn active_team_path(data_dir: &Path) -> PathBuf {
    data_dir.join(ACTIVE_TEAM_FILE)
}

fn read_active_team(data_dir: &Path) -> Option<TeamId> {
    let text = fs::read_to_string(active_team_path(data_dir)).ok()?;
    match text.trim().parse::<u32>().map(TeamId::new) {
        Ok(Ok(team)) => Some(team),
        _ => {
            tracing::warn!("Ignoring unreadable active-team pointer");
            None
        }
    }
}

/// Best-effort: losing the pointer only costs a re-`select`.
fn write_active_team(data_dir: &Path, team: TeamId) {
    if let Err(e) = fs::create_dir_all(data_dir)
        .and_then(|()| fs::write(active_team_path(data_dir), team.value().to_string()))
    {
        tracing::warn!("Failed to write active-team pointer: {e}");
    }
}

fn clear_active_team_pointer(data_dir: &Path) {
    if let Err(e) = fs::remove_file(active_team_path(data_dir))
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!("Failed to remove active-team pointer: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::{Session, read_active_team, write_active_team};
    use mision_types::TeamId;
    use std::fs;

    #[test]
    fn pointer_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let team = TeamId::new(3).unwrap();
        write_active_team(dir.path(), team);
        assert_eq!(read_active_team(dir.path()), Some(team));
    }

    #[test]
    fn garbage_pointer_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("active_team"), "equipo tres").unwrap();
        assert_eq!(read_active_team(dir.path()), None);
        fs::write(dir.path().join("active_team"), "0").unwrap();
        assert_eq!(read_active_team(dir.path()), None);
    }

    #[test]
    fn session_restores_the_active_team() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let mut session = Session::open(dir.path().to_path_buf());
            session.select(3).expect("select");
            session.observe_add("el agua sale turbia").expect("observe");
        }

        let session = Session::open(dir.path().to_path_buf());
        assert_eq!(session.store.active_team(), Some(TeamId::new(3).unwrap()));
        assert_eq!(
            session.store.snapshot().observations,
            ["el agua sale turbia"]
        );
    }

    #[test]
    fn exit_keeps_durable_progress_but_drops_the_pointer() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let mut session = Session::open(dir.path().to_path_buf());
            session.select(2).expect("select");
            session.set_hypothesis("se pierde agua".to_string()).expect("set");
            session.exit().expect("exit");
        }

        let mut session = Session::open(dir.path().to_path_buf());
        assert_eq!(session.store.active_team(), None);
        session.select(2).expect("select");
        assert_eq!(session.store.snapshot().hypothesis, "se pierde agua");
    }
}
