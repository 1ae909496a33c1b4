// --- kebiao: catálogo de cursos y conflictos de horario ---

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use kebiao::algorithm::{course_clash, Selection};
use kebiao::{AppConfig, AppState, CourseLoader, CourseUid, LoadResult};

#[derive(Parser)]
#[command(name = "kebiao", version, about = "Catálogo de cursos: interpretación de horarios y conflictos")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Origen del catálogo; cada opción pisa la variable `KEBIAO_*` equivalente.
#[derive(Args)]
struct Source {
    /// Archivo del catálogo (.xlsx, .xls, .ods o .csv)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Hoja del libro (por defecto `courses`)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Tabla horaria en JSON
    #[arg(long)]
    timetable: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Diagnóstico de la carga: filas, duplicados, salas vacías, segmentos no interpretados
    Summary {
        #[command(flatten)]
        source: Source,

        /// Imprime el resumen como JSON
        #[arg(long)]
        json: bool,
    },
    /// Conflictos entre las secciones indicadas (`课程号:班号`)
    Check {
        #[command(flatten)]
        source: Source,

        #[arg(required = true, num_args = 2..)]
        uids: Vec<String>,
    },
    /// Levanta la API HTTP
    Serve {
        #[command(flatten)]
        source: Source,

        /// Dirección de escucha (por defecto 127.0.0.1:8080)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

fn apply_source(mut config: AppConfig, source: Source) -> AppConfig {
    if source.file.is_some() {
        config.catalog = source.file;
    }
    if source.sheet.is_some() {
        config.sheet = source.sheet;
    }
    if source.timetable.is_some() {
        config.timetable = source.timetable;
    }
    config
}

fn load(config: &AppConfig) -> Result<(CourseLoader, LoadResult)> {
    let path = config
        .catalog
        .as_ref()
        .context("falta el archivo del catálogo (--file o KEBIAO_CATALOG)")?;
    let loader = config.loader().context("no se pudo preparar el parser")?;
    let result = loader
        .load_file(path, config.sheet.as_deref())
        .with_context(|| format!("no se pudo cargar {}", path.display()))?;
    Ok((loader, result))
}

fn print_summary(result: &LoadResult, as_json: bool) -> Result<()> {
    let s = result.summary();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&s)?);
        return Ok(());
    }
    println!("=== {} ===", s.source);
    println!("filas leídas:            {}", s.total_rows);
    println!("cursos:                  {}", s.courses);
    println!("filas omitidas:          {} (duplicadas: {})", s.skipped_rows, s.duplicate_rows);
    println!("cursos con avisos:       {} ({} segmentos)", s.courses_with_warnings, s.segment_warnings);
    println!("cursos sin sesiones:     {}", s.courses_without_meetings);
    println!("cursos sin sala:         {}", s.courses_without_room);
    for (title, lines) in [
        ("avisos de carga", &s.load_warnings),
        ("segmentos no interpretados", &s.segment_warning_examples),
        ("sala vacía", &s.empty_room_examples),
    ] {
        if !lines.is_empty() {
            println!("\n-- {} --", title);
            for line in lines.iter().take(10) {
                println!("  {}", line);
            }
        }
    }
    Ok(())
}

fn check(result: &LoadResult, raw: &[String], credit_limit: f64) -> Result<bool> {
    let uids = raw
        .iter()
        .map(|s| s.parse::<CourseUid>().map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()?;
    let selection = Selection::from_uids(result, &uids, credit_limit)?;
    let courses = selection.courses();

    let mut any = false;
    for (i, a) in courses.iter().enumerate() {
        for b in &courses[i + 1..] {
            if let Some(clash) = course_clash(a, b) {
                any = true;
                println!("冲突  {} {}  ×  {} {}  @ {}", a.uid(), a.name, b.uid(), b.name, clash);
            }
        }
    }
    if !any {
        println!("sin conflictos entre {} secciones", courses.len());
    }
    let total = selection.total_credits();
    println!("créditos: {} / {}", total, credit_limit);
    Ok(!any)
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG tiene prioridad sobre el nivel por defecto
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let env_config = AppConfig::from_env();

    match cli.command {
        Command::Summary { source, json } => {
            let config = apply_source(env_config, source);
            let (_, result) = load(&config)?;
            print_summary(&result, json)?;
        }
        Command::Check { source, uids } => {
            let config = apply_source(env_config, source);
            let (_, result) = load(&config)?;
            if !check(&result, &uids, config.credit_limit)? {
                bail!("hay conflictos de horario");
            }
        }
        Command::Serve { source, bind } => {
            let mut config = apply_source(env_config, source);
            if let Some(bind) = bind {
                config.bind = bind;
            }
            let (loader, result) = load(&config)?;
            println!("=== kebiao (API) ===");
            println!("Iniciando servidor en http://{}", config.bind);
            kebiao::run_server(AppState::new(config, loader, result)).await?;
        }
    }
    Ok(())
}
