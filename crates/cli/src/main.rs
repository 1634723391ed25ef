// portavoz - fills spokesperson identifier columns in batch reports

mod exit_codes;
mod resolve;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use portavoz_resolve::{Requirement, ResolveError};

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "portavoz")]
#[command(about = "Resolve spokesperson names in batch reports to canonical identifiers")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill `ID <column>` columns and write a reconciliation report
    #[command(after_help = "\
Unresolved names are listed in the report but do not fail the run unless
--strict is given (exit 6).

Examples:
  portavoz resolve noticias.xlsx porta_vozes.xlsx
  portavoz resolve noticias.csv porta_vozes.csv --in-place
  portavoz resolve noticias.xlsx porta_vozes.xlsx --columns 'Porta-vozes iFood'
  portavoz resolve noticias.xlsx porta_vozes.xlsx --threshold 0.9 --json | jq .summary
  portavoz resolve noticias.xlsx porta_vozes.xlsx --config portavoz.toml --strict")]
    Resolve {
        /// Batch report to annotate (.csv, .xlsx, .json)
        input: PathBuf,

        /// Reference table of spokespeople (.csv, .xlsx, .json)
        lookup: PathBuf,

        /// TOML config file (see `portavoz config`)
        #[arg(long, short = 'c', env = "PORTAVOZ_CONFIG")]
        config: Option<PathBuf>,

        /// Overwrite the input instead of writing `<stem>_with_ids_<ts>`
        #[arg(long)]
        in_place: bool,

        /// Lower bound of the similarity band for ambiguous candidates
        #[arg(long, value_name = "SCORE")]
        threshold: Option<f64>,

        /// Name column to resolve (repeatable; disables header detection)
        #[arg(long = "columns", value_name = "HEADER")]
        columns: Vec<String>,

        /// Report path (default `<stem>_spokesperson_report_<ts>.csv`)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Print the full result as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Exit 6 when any name is not found or ambiguous
        #[arg(long)]
        strict: bool,
    },

    /// Load a reference table and report identifiers, keys and collisions
    #[command(after_help = "\
Examples:
  portavoz check porta_vozes.xlsx
  portavoz check porta_vozes.csv --json")]
    Check {
        /// Reference table (.csv, .xlsx, .json)
        lookup: PathBuf,

        /// TOML config file
        #[arg(long, short = 'c', env = "PORTAVOZ_CONFIG")]
        config: Option<PathBuf>,

        /// Output JSON to stdout instead of the human summary
        #[arg(long)]
        json: bool,
    },

    /// Print the default configuration as TOML
    Config,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  portavoz-resolve ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            eprintln!("Usage: portavoz <command> [options]");
            eprintln!("       portavoz --help for more information");
            Err(CliError { code: EXIT_USAGE, message: String::new(), hint: None })
        }
        Some(Commands::Resolve {
            input,
            lookup,
            config,
            in_place,
            threshold,
            columns,
            report,
            json,
            strict,
        }) => resolve::cmd_resolve(resolve::ResolveArgs {
            input,
            lookup,
            config,
            in_place,
            threshold,
            columns,
            report,
            json,
            strict,
        }),
        Some(Commands::Check { lookup, config, json }) => resolve::cmd_check(lookup, config, json),
        Some(Commands::Config) => resolve::cmd_config(),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Create error from an engine/IO error with its registry exit code.
    pub fn from_resolve(err: ResolveError) -> Self {
        let code = exit_codes::resolve_exit_code(&err);
        let hint = match err.requirement() {
            Some(Requirement::IdentifierColumn) => Some(
                "set [reference] id_columns in the config to the reference table's ID header"
                    .to_string(),
            ),
            Some(Requirement::NameColumn) => Some(
                "pass --columns <header>, or set [reference] name_columns / [columns] names \
                 in the config"
                    .to_string(),
            ),
            None => match &err {
                ResolveError::ConfigParse(_) | ResolveError::ConfigValidation(_) => {
                    Some("`portavoz config` prints a valid default config".to_string())
                }
                _ => None,
            },
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ResolveError> for CliError {
    fn from(err: ResolveError) -> Self {
        Self::from_resolve(err)
    }
}
