//! Writes resolved identifiers into companion columns and collects
//! reconciliation records for everything that did not resolve.

use tracing::debug;

use crate::cell::RawCell;
use crate::config::ColumnsConfig;
use crate::error::ResolveError;
use crate::model::{OutcomeKind, ReconciliationRecord, ResolutionOutcome, ResolveSummary};
use crate::normalize::normalize;
use crate::resolve::Resolver;
use crate::split::Splitter;
use crate::table::{CellValue, Table};

pub const UNREADABLE_CELL: &str = "unreadable cell";

#[derive(Debug, Default)]
pub struct ReportOutput {
    pub records: Vec<ReconciliationRecord>,
    pub summary: ResolveSummary,
}

/// Resolve every name in `name_columns` and write `ID <column>` cells.
///
/// Existing companion columns are overwritten. A column listed twice is
/// processed once. Fails when no name column is given, a given column is
/// absent from the table, or a companion column would land on a name column.
pub fn apply(
    table: &mut Table,
    name_columns: &[String],
    columns: &ColumnsConfig,
    resolver: &Resolver<'_>,
    splitter: &Splitter,
) -> Result<ReportOutput, ResolveError> {
    if name_columns.is_empty() {
        return Err(ResolveError::missing_names(
            "no name-bearing column selected in the input table",
        ));
    }

    let mut sources: Vec<(&str, usize)> = Vec::with_capacity(name_columns.len());
    for label in name_columns {
        if sources.iter().any(|(seen, _)| *seen == label.as_str()) {
            continue;
        }
        let companion = columns.id_column_for(label);
        if name_columns.contains(&companion) {
            return Err(ResolveError::missing_names(format!(
                "companion column '{companion}' would overwrite a name column"
            )));
        }
        let idx = table.column_index(label).ok_or_else(|| {
            ResolveError::missing_names(format!("input table has no column '{label}'"))
        })?;
        sources.push((label.as_str(), idx));
    }

    let mut out = ReportOutput::default();
    out.summary.rows = table.row_count();

    for (label, src_idx) in sources {
        let id_idx = table.ensure_column(&columns.id_column_for(label));
        debug!(column = label, "resolving column");

        for row in 0..table.row_count() {
            let shape = cell_shape(table.cell(row, src_idx), splitter, resolver);
            let ids = resolve_cell(row, label, &shape, resolver, &mut out);

            let value = if ids.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(splitter.join(&ids))
            };
            table.set_cell(row, id_idx, value);
        }
    }

    Ok(out)
}

/// A text cell whose whole content is a known reference name stays one name,
/// so aliases written as "Silva, João" are not split on the comma.
fn cell_shape(value: &CellValue, splitter: &Splitter, resolver: &Resolver<'_>) -> RawCell {
    if let CellValue::Text(text) = value {
        let whole = text.trim();
        if !whole.is_empty() && resolver.is_exact(&normalize(whole)) {
            return RawCell::Single(whole.to_string());
        }
    }
    RawCell::from_value(value, splitter)
}

/// Resolve one cell; returns identifiers in name order.
fn resolve_cell(
    row: usize,
    column: &str,
    shape: &RawCell,
    resolver: &Resolver<'_>,
    out: &mut ReportOutput,
) -> Vec<String> {
    if let RawCell::Empty = shape {
        return Vec::new();
    }
    out.summary.cells_scanned += 1;

    if let RawCell::Malformed(text) = shape {
        out.summary.malformed_cells += 1;
        out.summary.not_found += 1;
        out.records.push(ReconciliationRecord {
            row,
            column: column.to_string(),
            name: text.clone(),
            kind: OutcomeKind::NotFound,
            candidates: Vec::new(),
            note: Some(UNREADABLE_CELL.into()),
        });
        return Vec::new();
    }

    let mut ids = Vec::new();
    for name in shape.names() {
        let key = normalize(name);
        if key.is_empty() {
            continue;
        }
        out.summary.names_total += 1;

        match resolver.resolve_key(&key) {
            ResolutionOutcome::Resolved { identifier, score } => {
                if score >= 1.0 {
                    out.summary.resolved_exact += 1;
                } else {
                    out.summary.resolved_similar += 1;
                }
                ids.push(identifier);
            }
            ResolutionOutcome::NotFound => {
                out.summary.not_found += 1;
                out.records.push(ReconciliationRecord {
                    row,
                    column: column.to_string(),
                    name: name.clone(),
                    kind: OutcomeKind::NotFound,
                    candidates: Vec::new(),
                    note: None,
                });
            }
            ResolutionOutcome::Ambiguous(candidates) => {
                out.summary.ambiguous += 1;
                out.records.push(ReconciliationRecord {
                    row,
                    column: column.to_string(),
                    name: name.clone(),
                    kind: OutcomeKind::Ambiguous,
                    candidates,
                    note: None,
                });
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchPolicy;
    use crate::error::Requirement;
    use crate::lookup::{LookupTable, ReferenceRow};

    fn lookup(pairs: &[(&str, &str)]) -> LookupTable {
        let rows: Vec<ReferenceRow> =
            pairs.iter().map(|(id, n)| ReferenceRow::new(*id, *n)).collect();
        LookupTable::build(&rows).unwrap()
    }

    fn run(
        table: &mut Table,
        cols: &[&str],
        lk: &LookupTable,
    ) -> Result<ReportOutput, ResolveError> {
        run_with(table, cols, lk, &ColumnsConfig::default())
    }

    fn run_with(
        table: &mut Table,
        cols: &[&str],
        lk: &LookupTable,
        columns: &ColumnsConfig,
    ) -> Result<ReportOutput, ResolveError> {
        let cols: Vec<String> = cols.iter().map(|c| c.to_string()).collect();
        let resolver = Resolver::new(lk, MatchPolicy::default());
        apply(table, &cols, columns, &resolver, &Splitter::default())
    }

    #[test]
    fn single_name_resolved() {
        let lk = lookup(&[("1", "João Silva")]);
        let mut t = Table::from_strings(&["name"], &[&["João Silva"]]);
        let out = run(&mut t, &["name"], &lk).unwrap();
        assert!(out.records.is_empty());
        assert_eq!(t.column_display("ID name").unwrap(), vec!["1"]);
        assert_eq!(out.summary.resolved_exact, 1);
    }

    #[test]
    fn multiple_names_joined_in_order() {
        let lk = lookup(&[("1", "João Silva"), ("2", "Maria Souza")]);
        let mut t = Table::from_strings(&["name"], &[&["Maria Souza, João Silva"]]);
        run(&mut t, &["name"], &lk).unwrap();
        assert_eq!(t.column_display("ID name").unwrap(), vec!["2, 1"]);
    }

    #[test]
    fn partial_cell_keeps_resolved_ids() {
        let lk = lookup(&[("1", "João Silva")]);
        let mut t = Table::from_strings(&["name"], &[&["João Silva; Fulano Desconhecido"]]);
        let out = run(&mut t, &["name"], &lk).unwrap();
        assert_eq!(t.column_display("ID name").unwrap(), vec!["1"]);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].name, "Fulano Desconhecido");
        assert_eq!(out.records[0].kind, OutcomeKind::NotFound);
    }

    #[test]
    fn empty_cell_writes_nothing_and_reports_nothing() {
        let lk = lookup(&[("1", "Ana")]);
        let mut t = Table::from_strings(&["name"], &[&[""], &["  "]]);
        let out = run(&mut t, &["name"], &lk).unwrap();
        assert!(out.records.is_empty());
        assert_eq!(t.column_display("ID name").unwrap(), vec!["", ""]);
        assert_eq!(out.summary.cells_scanned, 0);
    }

    #[test]
    fn existing_id_column_overwritten() {
        let lk = lookup(&[("1", "Ana Lima")]);
        let mut t = Table::from_strings(
            &["name", "ID name"],
            &[&["Ana Lima", "stale"], &["Nobody Here", "stale"]],
        );
        run(&mut t, &["name"], &lk).unwrap();
        assert_eq!(t.headers().len(), 2);
        assert_eq!(t.column_display("ID name").unwrap(), vec!["1", ""]);
    }

    #[test]
    fn malformed_cell_is_isolated() {
        let lk = lookup(&[("1", "Ana Lima")]);
        let mut t = Table::new(vec!["name".into()]);
        t.push_row(vec![CellValue::Error("#N/A".into())]);
        t.push_row(vec![CellValue::text("Ana Lima")]);
        let out = run(&mut t, &["name"], &lk).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].row, 0);
        assert_eq!(out.records[0].note.as_deref(), Some(UNREADABLE_CELL));
        assert_eq!(out.summary.malformed_cells, 1);
        assert_eq!(t.column_display("ID name").unwrap(), vec!["", "1"]);
    }

    #[test]
    fn ambiguous_record_carries_candidates() {
        let lk = lookup(&[("1", "João Silva")]);
        let mut t = Table::from_strings(&["name"], &[&["João Silvaa"]]);
        let out = run(&mut t, &["name"], &lk).unwrap();
        assert_eq!(out.records.len(), 1);
        let rec = &out.records[0];
        assert_eq!(rec.kind, OutcomeKind::Ambiguous);
        assert_eq!(rec.candidates.len(), 1);
        assert_eq!(rec.candidates[0].identifier, "1");
        assert_eq!(t.column_display("ID name").unwrap(), vec![""]);
    }

    #[test]
    fn no_columns_is_configuration_error() {
        let lk = lookup(&[("1", "Ana")]);
        let mut t = Table::from_strings(&["name"], &[&["Ana"]]);
        let err = run(&mut t, &[], &lk).unwrap_err();
        assert_eq!(err.requirement(), Some(Requirement::NameColumn));
    }

    #[test]
    fn unknown_column_is_configuration_error() {
        let lk = lookup(&[("1", "Ana")]);
        let mut t = Table::from_strings(&["name"], &[&["Ana"]]);
        let err = run(&mut t, &["Porta-vozes"], &lk).unwrap_err();
        assert_eq!(err.requirement(), Some(Requirement::NameColumn));
        assert!(err.to_string().contains("Porta-vozes"));
    }

    #[test]
    fn two_columns_get_two_id_columns() {
        let lk = lookup(&[("101", "João Silva"), ("103", "Pedro Costa")]);
        let mut t = Table::from_strings(
            &["A", "B"],
            &[&["João Silva", "Pedro Costa"], &["", "João Silva"]],
        );
        run(&mut t, &["A", "B"], &lk).unwrap();
        assert_eq!(t.headers(), &["A", "B", "ID A", "ID B"]);
        assert_eq!(t.column_display("ID A").unwrap(), vec!["101", ""]);
        assert_eq!(t.column_display("ID B").unwrap(), vec!["103", "101"]);
    }

    #[test]
    fn repeated_column_processed_once() {
        let lk = lookup(&[("1", "Ana Lima")]);
        let mut t = Table::from_strings(&["name"], &[&["Fulano de Tal"], &["Ana Lima"]]);
        let out = run(&mut t, &["name", "name"], &lk).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.summary.names_total, 2);
        assert_eq!(out.summary.not_found, 1);
        assert_eq!(t.headers(), &["name", "ID name"]);
        assert_eq!(t.column_display("ID name").unwrap(), vec!["", "1"]);
    }

    #[test]
    fn companion_landing_on_name_column_is_rejected() {
        let lk = lookup(&[("1", "Ana Lima")]);
        let mut t = Table::from_strings(&["name", "ID name"], &[&["Ana Lima", "Rui Costa"]]);
        let err = run(&mut t, &["name", "ID name"], &lk).unwrap_err();
        assert_eq!(err.requirement(), Some(Requirement::NameColumn));
        assert!(err.to_string().contains("ID name"));
        // names untouched
        assert_eq!(t.column_display("ID name").unwrap(), vec!["Rui Costa"]);
    }

    #[test]
    fn companion_equal_to_source_is_rejected() {
        let lk = lookup(&[("1", "Ana Lima")]);
        let mut t = Table::from_strings(&["name"], &[&["Ana Lima"]]);
        let columns = ColumnsConfig { id_prefix: String::new(), ..ColumnsConfig::default() };
        let err = run_with(&mut t, &["name"], &lk, &columns).unwrap_err();
        assert_eq!(err.requirement(), Some(Requirement::NameColumn));
        assert_eq!(t.column_display("name").unwrap(), vec!["Ana Lima"]);
    }

    #[test]
    fn reference_name_with_comma_is_kept_whole() {
        let lk = lookup(&[("1", "Silva, João"), ("2", "Maria Souza")]);
        let mut t = Table::from_strings(
            &["name"],
            &[&["Silva, João"], &["  silva, joao "], &["Maria Souza, Silva"]],
        );
        let out = run(&mut t, &["name"], &lk).unwrap();
        assert_eq!(t.column_display("ID name").unwrap(), vec!["1", "1", "2"]);
        // the third cell is not a reference name, so it splits
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].row, 2);
        assert_eq!(out.records[0].name, "Silva");
    }
}
