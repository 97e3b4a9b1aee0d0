use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use coldorm_core::TableSchema;
use coldorm_sqlite::{Engine, EngineConfig, Fields, ModelFile, create_table_sql, log_enabled_from_env};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "coldorm")]
#[command(about = "Create and inspect SQLite databases from coldorm model files")]
struct Cli {
    /// Log every statement and its parameters.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the CREATE TABLE statements for a model file.
    Ddl(DdlArgs),
    /// Create every table of a model file in the database.
    Migrate(DbArgs),
    /// List the tables present in the database.
    Tables(DbArgs),
    /// Print the rows of one table as JSON.
    Dump(DumpArgs),
    /// Drop one registered table from the database.
    Drop(DropArgs),
}

#[derive(Debug, Args)]
struct DdlArgs {
    /// Model file (YAML, or JSON by extension).
    #[arg(long)]
    models: PathBuf,
}

#[derive(Debug, Args)]
struct DbArgs {
    /// Model file (YAML, or JSON by extension).
    #[arg(long)]
    models: PathBuf,
    /// Database name; overrides the model file's engine section.
    #[arg(long)]
    db_name: Option<String>,
    /// Directory holding the database file.
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct DumpArgs {
    #[command(flatten)]
    db: DbArgs,
    /// Table to read.
    #[arg(long)]
    table: String,
    /// Comma-separated fields to select (default: all).
    #[arg(long)]
    fields: Option<String>,
}

#[derive(Debug, Args)]
struct DropArgs {
    #[command(flatten)]
    db: DbArgs,
    /// Table to drop.
    #[arg(long)]
    table: String,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Ddl(args) => run_ddl(args),
        Command::Migrate(args) => run_migrate(args, cli.verbose),
        Command::Tables(args) => run_tables(args, cli.verbose),
        Command::Dump(args) => run_dump(args, cli.verbose),
        Command::Drop(args) => run_drop(args, cli.verbose),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose || log_enabled_from_env() {
        "warn,coldorm_sqlite=info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

// ---------------------------------------------------------------------------
// commands
// ---------------------------------------------------------------------------

fn run_ddl(args: DdlArgs) -> Result<(), String> {
    let file = load_models(&args.models)?;
    for model in &file.models {
        let schema = TableSchema::extract(model)
            .map_err(|e| format!("Invalid model '{}': {e}", model.name))?;
        let sql = create_table_sql(&schema).map_err(|e| e.to_string())?;
        println!("{sql};");
    }
    Ok(())
}

fn run_migrate(args: DbArgs, verbose: bool) -> Result<(), String> {
    let (config, file) = resolve(&args, verbose)?;
    let config = config.with_migration(true);
    fs::create_dir_all(&config.directory).map_err(|e| {
        format!(
            "Failed to create directory '{}': {e}",
            config.directory.display()
        )
    })?;

    let path = config.db_path();
    let engine =
        Engine::open(config, &file.models).map_err(|e| format!("Migration failed: {e}"))?;
    engine
        .commit()
        .map_err(|e| format!("Commit failed: {e}"))?;

    println!(
        "Migration complete. Created {} table(s) in '{}'.",
        engine.tables().len(),
        path.display()
    );
    Ok(())
}

fn run_tables(args: DbArgs, verbose: bool) -> Result<(), String> {
    let engine = open_existing(&args, verbose)?;
    let tables = engine
        .list_tables()
        .map_err(|e| format!("Failed to list tables: {e}"))?;
    for table in tables {
        println!("{table}");
    }
    Ok(())
}

fn run_dump(args: DumpArgs, verbose: bool) -> Result<(), String> {
    let engine = open_existing(&args.db, verbose)?;
    let table = engine.table(&args.table).map_err(|e| e.to_string())?;
    let fields = parse_fields(args.fields.as_deref());

    let rows = table
        .get_all(&fields)
        .map_err(|e| format!("Failed to read '{}': {e}", args.table))?;
    let json = serde_json::to_string_pretty(&rows)
        .map_err(|e| format!("Failed to serialize rows: {e}"))?;
    println!("{json}");
    Ok(())
}

fn run_drop(args: DropArgs, verbose: bool) -> Result<(), String> {
    let engine = open_existing(&args.db, verbose)?;
    engine
        .drop_table(&args.table)
        .map_err(|e| format!("Failed to drop '{}': {e}", args.table))?;
    engine
        .commit()
        .map_err(|e| format!("Commit failed: {e}"))?;
    println!("Dropped table '{}'.", args.table);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_models(path: &Path) -> Result<ModelFile, String> {
    ModelFile::load(path)
        .map_err(|e| format!("Failed to load model file '{}': {e}", path.display()))
}

/// Builds the engine configuration: model file section first, then flags,
/// then `ORMLOG`.
fn resolve(args: &DbArgs, verbose: bool) -> Result<(EngineConfig, ModelFile), String> {
    let file = load_models(&args.models)?;

    let mut config = match (&args.db_name, &file.engine) {
        (Some(name), Some(engine)) => EngineConfig {
            name: name.clone(),
            ..engine.clone()
        },
        (Some(name), None) => EngineConfig::new(name.clone()),
        (None, Some(engine)) => engine.clone(),
        (None, None) => {
            return Err(
                "No database name: pass --db-name or add an engine section to the model file"
                    .to_string(),
            );
        }
    };
    if let Some(dir) = &args.dir {
        config.directory = dir.clone();
    }
    if verbose {
        config.log_statements = true;
    }
    let config = config.with_env_overrides();
    debug!(?config, "Resolved engine configuration");

    Ok((config, file))
}

/// Opens the database without creating tables.
fn open_existing(args: &DbArgs, verbose: bool) -> Result<Engine, String> {
    let (config, file) = resolve(args, verbose)?;
    let path = config.db_path();
    if !path.exists() {
        return Err(format!("Database '{}' does not exist", path.display()));
    }
    Engine::open(config.with_migration(false), &file.models)
        .map_err(|e| format!("Failed to open database '{}': {e}", path.display()))
}

fn parse_fields(raw: Option<&str>) -> Fields {
    let names: Vec<&str> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        Fields::All
    } else {
        Fields::only(names)
    }
}
