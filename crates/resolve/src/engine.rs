use tracing::{debug, warn};

use crate::config::ResolveConfig;
use crate::detect::name_columns;
use crate::error::ResolveError;
use crate::lookup::{reference_rows, LookupTable};
use crate::model::{ResolveMeta, ResolveResult};
use crate::report::apply;
use crate::resolve::Resolver;
use crate::split::Splitter;
use crate::table::Table;

/// Run one resolution pass: build the lookup from `reference`, resolve the
/// name columns of `table` in place, and return records + summary.
pub fn run(
    config: &ResolveConfig,
    table: &mut Table,
    reference: &Table,
) -> Result<ResolveResult, ResolveError> {
    let splitter = Splitter::new(config.split.clone());

    let rows = reference_rows(reference, &config.reference, &splitter)?;
    let lookup = LookupTable::build(&rows)?;

    let columns = name_columns(table.headers(), &config.columns);
    if columns.is_empty() {
        warn!(
            pattern = %config.columns.detect_pattern,
            "no name-bearing column detected in input table"
        );
    }
    debug!(columns = ?columns, "name columns selected");

    let resolver = Resolver::new(&lookup, config.matching);
    let output = apply(table, &columns, &config.columns, &resolver, &splitter)?;

    let mut summary = output.summary;
    summary.collision_keys = lookup.collisions().len();

    debug!(
        names = summary.names_total,
        resolved = summary.resolved(),
        not_found = summary.not_found,
        ambiguous = summary.ambiguous,
        "resolution finished"
    );

    Ok(ResolveResult {
        meta: ResolveMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            name_columns: columns,
            matching: config.matching,
        },
        summary,
        records: output.records,
        collisions: lookup.collisions().iter().cloned().collect(),
    })
}

/// Build the lookup alone, for inspecting a reference table.
pub fn build_lookup(
    config: &ResolveConfig,
    reference: &Table,
) -> Result<LookupTable, ResolveError> {
    let splitter = Splitter::new(config.split.clone());
    let rows = reference_rows(reference, &config.reference, &splitter)?;
    LookupTable::build(&rows)
}
