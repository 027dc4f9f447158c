//! sql-migrate-parse CLI
//!
//! Parses migration scripts and prints the statement plan for each file.
//!
//! Exit codes:
//! - 0: Every file parsed
//! - 1: One or more files were rejected by the parser
//! - 2: Tool error (config error, missing path, I/O error writing output, etc.)

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sql_migrate_parse::config::validate_line_separator;
use sql_migrate_parse::input::sql::SqlLoader;
use sql_migrate_parse::output::{FileReport, OutputFormat, reporter_for};
use sql_migrate_parse::{Config, Direction, MigrationParser};

/// Default config file name used when --config is not explicitly provided.
const DEFAULT_CONFIG_FILE: &str = "sql-migrate-parse.toml";

#[derive(Parser, Debug)]
#[command(name = "sql-migrate-parse")]
#[command(about = "Split annotated SQL migration scripts into statements", long_about = None)]
struct Args {
    /// Migration files or directories (overrides the configured paths)
    paths: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override output format (text, json)
    #[arg(long)]
    format: Option<String>,

    /// Treat a line containing only this text as a statement boundary (e.g. GO)
    #[arg(long, env = "SQL_MIGRATE_LINE_SEPARATOR")]
    line_separator: Option<String>,

    /// Only show statements for one direction
    #[arg(long, value_enum)]
    direction: Option<DirectionArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DirectionArg {
    Up,
    Down,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Up => Direction::Up,
            DirectionArg::Down => Direction::Down,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(all_parsed) => {
            if !all_parsed {
                std::process::exit(1);
            }
            // exit 0 is implicit
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            std::process::exit(2);
        }
    }
}

/// Parse every migration file and emit the report.
///
/// Returns `Ok(true)` if every file parsed, `Ok(false)` if at least one was
/// rejected, or `Err` on tool errors.
fn run(args: Args) -> Result<bool> {
    let mut config = load_config(&args.config)?;

    if let Some(separator) = args.line_separator {
        validate_line_separator(&separator).context("Invalid --line-separator")?;
        config.parser.line_separator = separator;
    }

    let format_name = args.format.unwrap_or_else(|| config.output.format.clone());
    let format = OutputFormat::parse(&format_name)
        .with_context(|| format!("Unknown output format '{}'", format_name))?;

    let paths = if args.paths.is_empty() {
        config.migrations.paths.clone()
    } else {
        args.paths
    };

    let parser =
        MigrationParser::from_config(&config.parser).context("Invalid line separator")?;
    let loader = SqlLoader::new(parser);
    let outcomes = loader
        .load_each(&paths)
        .context("Failed to collect migration files")?;

    let reports: Vec<FileReport> = outcomes
        .into_iter()
        .map(|(file, outcome)| FileReport {
            file,
            outcome: outcome.map(|m| m.document),
        })
        .collect();

    let reporter = reporter_for(format, args.direction.map(Direction::from));
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    reporter
        .emit(&reports, &mut handle)
        .context(format!("Failed to write {} report", format_name))?;

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    tracing::info!(files = reports.len(), failed, "parse complete");
    eprintln!(
        "sql-migrate-parse: {} file(s), {} failed",
        reports.len(),
        failed
    );

    Ok(failed == 0)
}

/// Load configuration from file.
///
/// If `config_path` is `Some`, the user explicitly passed `--config` and the file
/// must exist (error if not found). If `None`, the default config path is used;
/// a missing default config file is not an error (falls back to defaults with a warning).
fn load_config(config_path: &Option<PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Config::from_file(path).context("Failed to load configuration")
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                Config::from_file(&default_path).context("Failed to load configuration")
            } else {
                tracing::warn!(
                    path = %default_path.display(),
                    "config file not found, using defaults"
                );
                Ok(Config::default())
            }
        }
    }
}
