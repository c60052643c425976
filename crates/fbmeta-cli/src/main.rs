//! fbmeta CLI - build, export and update Firebird schemas from SQL scripts.

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use fbmeta::error::EXIT_USAGE_ERROR;
use fbmeta::{Config, MetaError, Orchestrator};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "fbmeta")]
#[command(about = "Build, export and update Firebird database schemas")]
#[command(version)]
struct Cli {
    /// Path to optional YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output JSON result to stdout
    #[arg(long, global = true)]
    output_json: bool,

    /// Exit with an error when any statement failed
    #[arg(long, global = true)]
    strict: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text", global = true)]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info", global = true)]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new database and apply the scripts to it
    BuildDb {
        /// Directory for the new database file
        #[arg(long)]
        db_dir: PathBuf,

        /// Directory holding domains*.sql, tables*.sql and procedures*.sql
        #[arg(long)]
        scripts_dir: PathBuf,
    },

    /// Export domains, tables and procedures to SQL scripts
    ExportScripts {
        /// Firebird URL or Key=Value connection string
        #[arg(long)]
        connection_string: String,

        /// Directory for domains.sql, tables.sql and procedures.sql
        #[arg(long)]
        output_dir: PathBuf,
    },

    /// Apply the scripts to an existing database
    UpdateDb {
        /// Firebird URL or Key=Value connection string
        #[arg(long)]
        connection_string: String,

        /// Directory holding domains*.sql, tables*.sql and procedures*.sql
        #[arg(long)]
        scripts_dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Fails only when the stream is closed; the exit code still applies.
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_USAGE_ERROR),
            };
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), MetaError> {
    setup_logging(&cli.verbosity, &cli.log_format);

    let config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    };

    let strict = cli.strict || config.execution.fail_on_statement_errors;
    let orchestrator = Orchestrator::new(config).with_strict(strict);

    match cli.command {
        Commands::BuildDb {
            db_dir,
            scripts_dir,
        } => {
            let result = orchestrator.build(&db_dir, &scripts_dir)?;

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                println!("\nDatabase built successfully!");
                if let Some(ref db) = result.database {
                    println!("  Database: {}", db.display());
                }
                print_apply_summary(&result);
            }
        }

        Commands::ExportScripts {
            connection_string,
            output_dir,
        } => {
            let result = orchestrator.export(&connection_string, &output_dir)?;

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                println!("\nScripts exported successfully!");
                println!("  Run ID: {}", result.run_id);
                println!("  Duration: {:.2}s", result.duration_seconds);
                for file in &result.files {
                    println!("  {}: {} ({} objects)", file.category, file.path.display(), file.objects);
                }
            }
        }

        Commands::UpdateDb {
            connection_string,
            scripts_dir,
        } => {
            let result = orchestrator.update(&connection_string, &scripts_dir)?;

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                println!("\nDatabase updated successfully!");
                print_apply_summary(&result);
            }
        }
    }

    Ok(())
}

fn print_apply_summary(result: &fbmeta::ApplyResult) {
    println!("  Run ID: {}", result.run_id);
    println!("  Duration: {:.2}s", result.duration_seconds);
    println!("  Files: {}", result.files.len());
    println!("  Statements executed: {}", result.report.executed);
    println!("  Already existing: {}", result.report.skipped_existing);
    if !result.report.is_clean() {
        println!("  Failed statements: {}", result.report.failed());
        for failure in &result.report.failures {
            println!(
                "    {}#{}: {}",
                failure.file.as_deref().unwrap_or("-"),
                failure.index,
                failure.message.lines().next().unwrap_or("")
            );
        }
    }
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
