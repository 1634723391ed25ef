// Reconciliation report (CSV)

use std::path::Path;

use portavoz_resolve::model::Candidate;
use portavoz_resolve::ReconciliationRecord;

pub const REPORT_HEADERS: [&str; 6] = ["row", "column", "name", "kind", "candidates", "note"];

/// `101 (João Silva) 0.909 [Porta-vozes iFood] | 102 (João Silveira) 0.870`
pub fn render_candidates(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| match &c.group {
            Some(group) => format!("{} ({}) {:.3} [{group}]", c.identifier, c.alias, c.score),
            None => format!("{} ({}) {:.3}", c.identifier, c.alias, c.score),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Write one line per record. Rows are the 0-based data row indices the
/// engine reports, so they line up with the output table.
pub fn export(records: &[ReconciliationRecord], path: &Path) -> Result<(), String> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| e.to_string())?;
    writer.write_record(REPORT_HEADERS).map_err(|e| e.to_string())?;

    for record in records {
        writer
            .write_record([
                record.row.to_string(),
                record.column.clone(),
                record.name.clone(),
                record.kind.to_string(),
                render_candidates(&record.candidates),
                record.note.clone().unwrap_or_default(),
            ])
            .map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portavoz_resolve::OutcomeKind;
    use std::fs;
    use tempfile::tempdir;

    fn record(kind: OutcomeKind, candidates: Vec<Candidate>) -> ReconciliationRecord {
        ReconciliationRecord {
            row: 3,
            column: "Porta-vozes".into(),
            name: "João Silvaa".into(),
            kind,
            candidates,
            note: None,
        }
    }

    fn candidate(id: &str, alias: &str, group: Option<&str>, score: f64) -> Candidate {
        Candidate {
            identifier: id.into(),
            alias: alias.into(),
            group: group.map(str::to_string),
            score,
        }
    }

    #[test]
    fn test_render_candidates() {
        let cands = vec![
            candidate("1", "joao silva", None, 0.9090909),
            candidate("2", "joao silveira", Some("Porta-vozes iFood"), 0.87),
        ];
        assert_eq!(
            render_candidates(&cands),
            "1 (joao silva) 0.909 | 2 (joao silveira) 0.870 [Porta-vozes iFood]"
        );
        assert_eq!(render_candidates(&[]), "");
    }

    #[test]
    fn test_report_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let records = vec![
            record(
                OutcomeKind::Ambiguous,
                vec![candidate("1", "joao silva", None, 0.9)],
            ),
            record(OutcomeKind::NotFound, vec![]),
        ];

        export(&records, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "row,column,name,kind,candidates,note");
        assert_eq!(lines[1], "3,Porta-vozes,João Silvaa,ambiguous,1 (joao silva) 0.900,");
        assert_eq!(lines[2], "3,Porta-vozes,João Silvaa,not_found,,");
    }
}
