//! Misión CLI - binary entry point.
//!
//! # Architecture
//!
//! The binary is a thin dispatch layer over [`mision_core`]: it resolves the
//! data directory, restores the active team from the pointer file, hands the
//! parsed subcommand to [`commands::Session`], and prints the result. All
//! mission semantics live in the library crates; stdout carries command
//! output, stderr carries the tracing log.
//!
//! The store itself is synchronous. The two guide commands (`ask`, `ideas`)
//! spin up a current-thread tokio runtime for the one HTTP round trip.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::Session;
use mision_core::default_data_dir;

#[derive(Parser)]
#[command(
    name = "mision",
    version,
    about = "Guía de misión: acompaña a tu equipo de la pregunta de investigación a la conclusión"
)]
struct Cli {
    /// Carpeta de datos de la misión (por defecto, la del sistema)
    #[arg(long, global = true, env = "MISION_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Elegir el equipo activo, cargando o creando su registro
    Select {
        /// Número de equipo
        team: u32,
    },
    /// Salir de la misión sin tocar el progreso guardado
    Exit,
    /// Borrar todo el progreso del equipo activo (irreversible)
    Clear {
        /// Confirmar el borrado
        #[arg(long)]
        yes: bool,
    },
    /// Mostrar el equipo activo y su avance
    Status,
    /// Ir a un módulo (1-6); 0 sale de la misión
    Goto {
        /// Número de módulo
        module: u32,
    },
    /// Avanzar al siguiente módulo
    Next,
    /// Lluvia de ideas: observaciones del problema
    #[command(subcommand)]
    Observe(ObserveCommand),
    /// Fijar la pregunta de investigación (ya aprobada por el guía)
    Problem {
        /// Texto de la pregunta
        text: String,
    },
    /// Tareas del plan de acción
    #[command(subcommand)]
    Task(TaskCommand),
    /// Fijar la hipótesis
    Hypothesis {
        /// Texto de la hipótesis
        text: String,
    },
    /// Datos del experimento
    #[command(subcommand)]
    Data(DataCommand),
    /// Fijar el análisis de resultados
    Analysis {
        /// Texto del análisis
        text: String,
    },
    /// Fijar la conclusión de la misión
    Conclusion {
        /// Texto de la conclusión
        text: String,
    },
    /// Exportar el registro del equipo a un archivo portátil
    Export {
        /// Ruta de salida (por defecto, el nombre estándar del archivo)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Importar un archivo exportado, adoptando a su equipo
    Import {
        /// Archivo a importar
        file: PathBuf,
    },
    /// Generar el reporte de la misión
    Report {
        /// Mostrar sólo el resumen de avance
        #[arg(long)]
        summary: bool,
    },
    /// Consultas al directorio de grupos y estudiantes
    #[command(subcommand)]
    Roster(RosterCommand),
    /// Preguntar al guía si una pregunta de investigación es medible
    Ask {
        /// La pregunta del equipo
        question: String,
    },
    /// Pedir al guía ideas de preguntas sobre un tema
    Ideas {
        /// El tema a explorar
        topic: String,
    },
}

#[derive(Subcommand)]
enum ObserveCommand {
    /// Agregar una observación
    Add { text: String },
    /// Reemplazar una observación por índice
    Edit { index: usize, text: String },
    /// Quitar una observación por índice
    Rm { index: usize },
    /// Listar las observaciones
    List,
}

#[derive(Subcommand)]
enum TaskCommand {
    /// Agregar una tarea al plan de acción
    Add {
        /// Qué se va a hacer
        action: String,
        /// Materiales necesarios
        #[arg(long, default_value = "")]
        materials: String,
        /// Quién es responsable
        #[arg(long, default_value = "")]
        role: String,
        /// Cuándo se hará
        #[arg(long, default_value = "")]
        time: String,
        /// Cómo sabremos que quedó hecha
        #[arg(long, default_value = "")]
        indicator: String,
    },
    /// Quitar una tarea por id (se puede deshacer una vez)
    Rm { id: u64 },
    /// Deshacer la última tarea quitada
    Undo,
    /// Listar las tareas del plan
    List,
}

#[derive(Subcommand)]
enum DataCommand {
    /// Registrar un dato del experimento
    Add { label: String, value: f64 },
    /// Quitar un dato por id
    Rm { id: u64 },
    /// Listar los datos registrados
    List,
}

#[derive(Subcommand)]
enum RosterCommand {
    /// Listar los grupos
    Groups,
    /// Listar los estudiantes de un grupo
    Students { group: String },
    /// Buscar a un estudiante por nombre y mostrar su equipo
    Find { name: String },
    /// Listar a los integrantes de un equipo
    Team { team: u32 },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let mut session = Session::open(data_dir);

    match cli.command {
        Command::Select { team } => session.select(team),
        Command::Exit => session.exit(),
        Command::Clear { yes } => session.clear(yes),
        Command::Status => session.status(),
        Command::Goto { module } => session.goto(module),
        Command::Next => session.next(),
        Command::Observe(ObserveCommand::Add { text }) => session.observe_add(&text),
        Command::Observe(ObserveCommand::Edit { index, text }) => {
            session.observe_edit(index, text)
        }
        Command::Observe(ObserveCommand::Rm { index }) => session.observe_rm(index),
        Command::Observe(ObserveCommand::List) => session.observe_list(),
        Command::Problem { text } => session.set_problem(text),
        Command::Task(TaskCommand::Add {
            action,
            materials,
            role,
            time,
            indicator,
        }) => session.task_add(action, materials, role, time, indicator),
        Command::Task(TaskCommand::Rm { id }) => session.task_rm(id),
        Command::Task(TaskCommand::Undo) => session.task_undo(),
        Command::Task(TaskCommand::List) => session.task_list(),
        Command::Hypothesis { text } => session.set_hypothesis(text),
        Command::Data(DataCommand::Add { label, value }) => session.data_add(&label, value),
        Command::Data(DataCommand::Rm { id }) => session.data_rm(id),
        Command::Data(DataCommand::List) => session.data_list(),
        Command::Analysis { text } => session.set_analysis(text),
        Command::Conclusion { text } => session.set_conclusion(text),
        Command::Export { out } => session.export(out),
        Command::Import { file } => session.import(&file),
        Command::Report { summary } => session.report(summary),
        Command::Roster(RosterCommand::Groups) => session.roster_groups(),
        Command::Roster(RosterCommand::Students { group }) => session.roster_students(&group),
        Command::Roster(RosterCommand::Find { name }) => session.roster_find(&name),
        Command::Roster(RosterCommand::Team { team }) => session.roster_team(team),
        Command::Ask { question } => session.ask(&question),
        Command::Ideas { topic } => session.ideas(&topic),
    }
}
