//! `portavoz resolve`, `portavoz check`, `portavoz config`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use portavoz_io::Format;
use portavoz_resolve::engine::build_lookup;
use portavoz_resolve::{LookupTable, ResolveConfig, ResolveResult};

use crate::exit_codes::EXIT_UNRESOLVED;
use crate::CliError;

pub struct ResolveArgs {
    pub input: PathBuf,
    pub lookup: PathBuf,
    pub config: Option<PathBuf>,
    pub in_place: bool,
    pub threshold: Option<f64>,
    pub columns: Vec<String>,
    pub report: Option<PathBuf>,
    pub json: bool,
    pub strict: bool,
}

/// Load the config file (or defaults). Validation happens after CLI overrides.
fn load_config(path: Option<&Path>) -> Result<ResolveConfig, CliError> {
    let Some(path) = path else {
        return Ok(ResolveConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    debug!(path = %path.display(), "config loaded");
    Ok(ResolveConfig::from_toml(&text)?)
}

fn check_format(path: &Path) -> Result<(), CliError> {
    if Format::from_path(path).is_none() {
        return Err(CliError::usage(format!("{}: unsupported file type", path.display()))
            .with_hint("use a .csv, .xlsx or .json file"));
    }
    Ok(())
}

pub fn cmd_resolve(args: ResolveArgs) -> Result<(), CliError> {
    check_format(&args.input)?;
    check_format(&args.lookup)?;

    let mut config = load_config(args.config.as_deref())?;
    if let Some(threshold) = args.threshold {
        config.matching.ambiguous_threshold = threshold;
    }
    if !args.columns.is_empty() {
        config.columns.names = args.columns;
    }
    if args.in_place {
        config.output.in_place = true;
    }
    if let Some(report) = &args.report {
        config.output.report = Some(report.to_string_lossy().into_owned());
    }
    config.validate()?;

    let reference = portavoz_io::read_table(&args.lookup)?;
    let mut table = portavoz_io::read_table(&args.input)?;

    let result = portavoz_resolve::run(&config, &mut table, &reference)?;

    let ts = portavoz_io::timestamp();
    let output = portavoz_io::output_path(&args.input, config.output.in_place, &ts);
    portavoz_io::write_table(&table, &output)?;

    let report = match &config.output.report {
        Some(path) => PathBuf::from(path),
        None => portavoz_io::report_path(&args.input, &ts),
    };
    let report_written = portavoz_io::write_report(&result.records, &report)?;

    if args.json {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::internal(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    print_summary(&result, &output, report_written.then_some(report.as_path()));

    if args.strict && result.summary.unresolved() > 0 {
        return Err(CliError {
            code: EXIT_UNRESOLVED,
            message: format!("{} name(s) left unresolved", result.summary.unresolved()),
            hint: None,
        });
    }
    Ok(())
}

fn print_summary(result: &ResolveResult, output: &Path, report: Option<&Path>) {
    let s = &result.summary;
    eprintln!(
        "{} rows, {} names in {} column(s): {} resolved ({} exact, {} similar), \
         {} not found, {} ambiguous",
        s.rows,
        s.names_total,
        result.meta.name_columns.len(),
        s.resolved(),
        s.resolved_exact,
        s.resolved_similar,
        s.not_found,
        s.ambiguous,
    );
    if s.malformed_cells > 0 {
        eprintln!("{} unreadable cell(s)", s.malformed_cells);
    }
    if s.collision_keys > 0 {
        eprintln!(
            "{} reference name(s) claimed by more than one identifier: {}",
            s.collision_keys,
            result.collisions.join(", ")
        );
    }
    eprintln!("wrote {}", output.display());
    if let Some(report) = report {
        eprintln!("report {}", report.display());
    }
}

#[derive(Debug, Serialize)]
struct CheckReport {
    identifiers: usize,
    keys: usize,
    collisions: Vec<CollisionReport>,
}

#[derive(Debug, Serialize)]
struct CollisionReport {
    key: String,
    identifiers: Vec<String>,
    /// Distinct reference groups of the claimants, in claimant order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    groups: Vec<String>,
}

fn collision_report(table: &LookupTable, key: &str) -> CollisionReport {
    let claimants = table.claimants(key);
    let mut groups: Vec<String> = Vec::new();
    for group in claimants.iter().filter_map(|e| e.group.as_deref()) {
        if !group.is_empty() && !groups.iter().any(|g| g == group) {
            groups.push(group.to_string());
        }
    }
    CollisionReport {
        key: key.to_string(),
        identifiers: claimants.iter().map(|e| e.identifier.clone()).collect(),
        groups,
    }
}

pub fn cmd_check(lookup: PathBuf, config: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    check_format(&lookup)?;
    let config = load_config(config.as_deref())?;
    config.validate()?;

    let reference = portavoz_io::read_table(&lookup)?;
    let table = build_lookup(&config, &reference)?;

    let report = CheckReport {
        identifiers: table.identifier_count(),
        keys: table.key_count(),
        collisions: table
            .collisions()
            .iter()
            .map(|key| collision_report(&table, key))
            .collect(),
    };

    if json {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::internal(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        println!(
            "{} identifiers, {} name keys, {} collisions",
            report.identifiers,
            report.keys,
            report.collisions.len()
        );
        for c in &report.collisions {
            if c.groups.is_empty() {
                println!("  {:<30} {}", c.key, c.identifiers.join(", "));
            } else {
                println!(
                    "  {:<30} {} ({})",
                    c.key,
                    c.identifiers.join(", "),
                    c.groups.join(", ")
                );
            }
        }
    }
    Ok(())
}

pub fn cmd_config() -> Result<(), CliError> {
    print!("{}", ResolveConfig::default_toml());
    Ok(())
}
