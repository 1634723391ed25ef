//! Reference lookup: normalized alias → canonical identifier.
//!
//! Built once per run and never mutated afterwards. Keys claimed by two
//! different identifiers are collisions: they stay in the table so the
//! similarity scan can surface every claimant, but they never resolve
//! through the exact path.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ReferenceConfig;
use crate::error::ResolveError;
use crate::normalize::normalize;
use crate::split::Splitter;
use crate::table::Table;

/// One reference-table row: an identifier and the names it is known by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRow {
    pub identifier: String,
    pub aliases: Vec<String>,
    pub group: Option<String>,
}

impl ReferenceRow {
    pub fn new(identifier: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            aliases: vec![alias.into()],
            group: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupEntry {
    pub identifier: String,
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Clone)]
enum KeySlot {
    Unique(LookupEntry),
    /// Every distinct identifier claiming the key, ordered by identifier.
    Collision(BTreeMap<String, LookupEntry>),
}

#[derive(Debug, Clone)]
pub struct LookupTable {
    slots: BTreeMap<String, KeySlot>,
    collisions: BTreeSet<String>,
    identifiers: usize,
}

impl LookupTable {
    /// Build from reference rows.
    ///
    /// Rows with a blank identifier and blank aliases are skipped. Fails when
    /// no row yields a usable identifier.
    pub fn build(rows: &[ReferenceRow]) -> Result<Self, ResolveError> {
        let mut slots: BTreeMap<String, KeySlot> = BTreeMap::new();
        let mut collisions = BTreeSet::new();
        let mut identifiers = BTreeSet::new();

        for row in rows {
            let identifier = row.identifier.trim();
            if identifier.is_empty() {
                continue;
            }

            for alias in &row.aliases {
                let key = normalize(alias);
                if key.is_empty() {
                    continue;
                }
                identifiers.insert(identifier.to_string());

                let entry = LookupEntry {
                    identifier: identifier.to_string(),
                    alias: alias.trim().to_string(),
                    group: row.group.clone(),
                };

                match slots.get_mut(&key) {
                    None => {
                        slots.insert(key, KeySlot::Unique(entry));
                    }
                    Some(KeySlot::Unique(existing)) => {
                        if existing.identifier == entry.identifier {
                            continue;
                        }
                        warn!(
                            key = %key,
                            first = %existing.identifier,
                            second = %entry.identifier,
                            "alias collision: key excluded from exact matching"
                        );
                        let mut claimants = BTreeMap::new();
                        claimants.insert(existing.identifier.clone(), existing.clone());
                        claimants.insert(entry.identifier.clone(), entry);
                        collisions.insert(key.clone());
                        slots.insert(key, KeySlot::Collision(claimants));
                    }
                    Some(KeySlot::Collision(claimants)) => {
                        if !claimants.contains_key(&entry.identifier) {
                            warn!(
                                key = %key,
                                identifier = %entry.identifier,
                                "additional collision claimant"
                            );
                            claimants.insert(entry.identifier.clone(), entry);
                        }
                    }
                }
            }
        }

        if identifiers.is_empty() {
            return Err(ResolveError::missing_identifiers(format!(
                "reference table has no usable identifier values ({} rows)",
                rows.len()
            )));
        }

        debug!(
            keys = slots.len(),
            identifiers = identifiers.len(),
            collisions = collisions.len(),
            "lookup table built"
        );

        Ok(Self {
            slots,
            collisions,
            identifiers: identifiers.len(),
        })
    }

    /// Exact lookup on a normalized key. Collision keys return `None`.
    pub fn exact(&self, key: &str) -> Option<&LookupEntry> {
        match self.slots.get(key)? {
            KeySlot::Unique(entry) => Some(entry),
            KeySlot::Collision(_) => None,
        }
    }

    pub fn is_collision(&self, key: &str) -> bool {
        self.collisions.contains(key)
    }

    pub fn collisions(&self) -> &BTreeSet<String> {
        &self.collisions
    }

    /// Every `(key, entry, collided)` triple in key order. Collision keys
    /// yield one triple per claimant.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &LookupEntry, bool)> {
        self.slots.iter().flat_map(|(key, slot)| {
            let items: Vec<(&str, &LookupEntry, bool)> = match slot {
                KeySlot::Unique(entry) => vec![(key.as_str(), entry, false)],
                KeySlot::Collision(claimants) => {
                    claimants.values().map(|e| (key.as_str(), e, true)).collect()
                }
            };
            items
        })
    }

    /// Claimants of a collision key, ordered by identifier.
    pub fn claimants(&self, key: &str) -> Vec<&LookupEntry> {
        match self.slots.get(key) {
            Some(KeySlot::Collision(claimants)) => claimants.values().collect(),
            _ => Vec::new(),
        }
    }

    pub fn key_count(&self) -> usize {
        self.slots.len()
    }

    pub fn identifier_count(&self) -> usize {
        self.identifiers
    }
}

// ---------------------------------------------------------------------------
// Reference table → rows
// ---------------------------------------------------------------------------

/// Extract reference rows from a loaded reference table.
///
/// Column labels are matched accent/case-insensitively; the first configured
/// label present in the table wins.
pub fn reference_rows(
    table: &Table,
    config: &ReferenceConfig,
    splitter: &Splitter,
) -> Result<Vec<ReferenceRow>, ResolveError> {
    let name_idx = find_column(table, &config.name_columns).ok_or_else(|| {
        ResolveError::missing_names(format!(
            "reference table has none of {}",
            quote_list(&config.name_columns)
        ))
    })?;
    let id_idx = find_column(table, &config.id_columns).ok_or_else(|| {
        ResolveError::missing_identifiers(format!(
            "reference table has none of {}",
            quote_list(&config.id_columns)
        ))
    })?;
    let alias_idxs: Vec<usize> = config
        .alias_columns
        .iter()
        .filter_map(|label| find_column(table, std::slice::from_ref(label)))
        .filter(|idx| *idx != name_idx)
        .collect();
    let group_idx = config
        .group_column
        .as_ref()
        .and_then(|label| find_column(table, std::slice::from_ref(label)));

    debug!(
        name_column = %table.headers()[name_idx],
        id_column = %table.headers()[id_idx],
        alias_columns = alias_idxs.len(),
        "reference columns selected"
    );

    let mut rows = Vec::with_capacity(table.row_count());
    for (i, _) in table.rows().iter().enumerate() {
        let name = table.cell(i, name_idx).display();
        let mut aliases = Vec::new();
        if !name.trim().is_empty() {
            aliases.push(name.trim().to_string());
        }
        for &ai in &alias_idxs {
            aliases.extend(splitter.split(&table.cell(i, ai).display()));
        }
        if aliases.is_empty() {
            continue;
        }

        let group = group_idx
            .map(|gi| table.cell(i, gi).display())
            .filter(|g| !g.trim().is_empty());

        rows.push(ReferenceRow {
            identifier: table.cell(i, id_idx).display().trim().to_string(),
            aliases,
            group,
        });
    }

    Ok(rows)
}

fn find_column(table: &Table, labels: &[String]) -> Option<usize> {
    labels.iter().find_map(|label| {
        let want = normalize(label);
        table.headers().iter().position(|h| normalize(h) == want)
    })
}

fn quote_list(labels: &[String]) -> String {
    labels
        .iter()
        .map(|l| format!("'{l}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Requirement;
    use crate::table::CellValue;

    fn rows(pairs: &[(&str, &str)]) -> Vec<ReferenceRow> {
        pairs.iter().map(|(id, name)| ReferenceRow::new(*id, *name)).collect()
    }

    fn read_rows(table: &Table) -> Result<Vec<ReferenceRow>, ResolveError> {
        reference_rows(table, &ReferenceConfig::default(), &Splitter::default())
    }

    #[test]
    fn builds_normalized_keys() {
        let table =
            LookupTable::build(&rows(&[("101", "João Silva"), ("102", "Maria Santos")])).unwrap();
        assert_eq!(table.exact("joao silva").unwrap().identifier, "101");
        assert_eq!(table.exact("maria santos").unwrap().identifier, "102");
        assert_eq!(table.key_count(), 2);
        assert_eq!(table.identifier_count(), 2);
        assert!(table.collisions().is_empty());
    }

    #[test]
    fn multiple_aliases_per_identifier() {
        let row = ReferenceRow {
            identifier: "7".into(),
            aliases: vec!["Luiz Inácio".into(), "Lula".into()],
            group: None,
        };
        let table = LookupTable::build(&[row]).unwrap();
        assert_eq!(table.exact("lula").unwrap().identifier, "7");
        assert_eq!(table.exact("luiz inacio").unwrap().identifier, "7");
        assert_eq!(table.identifier_count(), 1);
    }

    #[test]
    fn collision_excluded_from_exact() {
        let table = LookupTable::build(&rows(&[("1", "Ana"), ("2", "ana")])).unwrap();
        assert!(table.exact("ana").is_none());
        assert!(table.is_collision("ana"));
        let claimants: Vec<_> =
            table.claimants("ana").iter().map(|e| e.identifier.clone()).collect();
        assert_eq!(claimants, vec!["1", "2"]);
    }

    #[test]
    fn same_identifier_twice_is_not_a_collision() {
        let table = LookupTable::build(&rows(&[("1", "Ana"), ("1", "ANA")])).unwrap();
        assert_eq!(table.exact("ana").unwrap().identifier, "1");
        assert!(table.collisions().is_empty());
    }

    #[test]
    fn third_claimant_joins_collision() {
        let table =
            LookupTable::build(&rows(&[("1", "Ana"), ("2", "ana"), ("3", "ÁNA")])).unwrap();
        assert_eq!(table.claimants("ana").len(), 3);
        assert_eq!(table.collisions().len(), 1);
    }

    #[test]
    fn blank_identifiers_and_names_skipped() {
        let table = LookupTable::build(&rows(&[("", "Ana"), ("2", "  "), ("3", "Rui")])).unwrap();
        assert!(table.exact("ana").is_none());
        assert_eq!(table.key_count(), 1);
    }

    #[test]
    fn no_identifiers_is_configuration_error() {
        let err = LookupTable::build(&rows(&[("", "Ana"), (" ", "Rui")])).unwrap_err();
        assert_eq!(err.requirement(), Some(Requirement::IdentifierColumn));
        let err = LookupTable::build(&[]).unwrap_err();
        assert_eq!(err.requirement(), Some(Requirement::IdentifierColumn));
    }

    #[test]
    fn entries_are_key_ordered() {
        let table =
            LookupTable::build(&rows(&[("2", "Zeca"), ("1", "Ana"), ("3", "ana")])).unwrap();
        let keys: Vec<_> = table
            .entries()
            .map(|(k, e, c)| (k.to_string(), e.identifier.clone(), c))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("ana".to_string(), "1".to_string(), true),
                ("ana".to_string(), "3".to_string(), true),
                ("zeca".to_string(), "2".to_string(), false),
            ]
        );
    }

    #[test]
    fn reference_rows_from_survey_layout() {
        let table = Table::from_strings(
            &["Coluna/Opção Adicional", "ID Resposta", "Resposta"],
            &[
                &["Porta-vozes iFood", "101", "João Silva"],
                &["Porta-vozes Rappi", "102", "Maria Santos"],
                &["Porta-vozes Rappi", "103", ""],
            ],
        );
        let rows = read_rows(&table).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].identifier, "101");
        assert_eq!(rows[0].aliases, vec!["João Silva"]);
        assert_eq!(rows[0].group.as_deref(), Some("Porta-vozes iFood"));
    }

    #[test]
    fn reference_rows_header_match_ignores_case_and_accents() {
        let table = Table::from_strings(&["nome", "id"], &[&["Ana", "1"]]);
        let rows = read_rows(&table).unwrap();
        assert_eq!(rows, vec![ReferenceRow::new("1", "Ana")]);
    }

    #[test]
    fn reference_rows_numeric_identifiers() {
        let mut table = Table::new(vec!["ID".into(), "Nome".into()]);
        table.push_row(vec![CellValue::Number(101.0), CellValue::text("Ana")]);
        let rows = read_rows(&table).unwrap();
        assert_eq!(rows[0].identifier, "101");
    }

    #[test]
    fn reference_rows_alias_column() {
        let table = Table::from_strings(
            &["ID", "Nome", "Apelidos"],
            &[&["7", "Luiz Inácio", "Lula; Presidente Lula"]],
        );
        let rows = read_rows(&table).unwrap();
        assert_eq!(rows[0].aliases, vec!["Luiz Inácio", "Lula", "Presidente Lula"]);
    }

    #[test]
    fn reference_rows_missing_columns() {
        let table = Table::from_strings(&["ID", "Cargo"], &[&["1", "CEO"]]);
        let err = read_rows(&table).unwrap_err();
        assert_eq!(err.requirement(), Some(Requirement::NameColumn));

        let table = Table::from_strings(&["Nome", "Cargo"], &[&["Ana", "CEO"]]);
        let err = read_rows(&table).unwrap_err();
        assert_eq!(err.requirement(), Some(Requirement::IdentifierColumn));
        assert!(err.to_string().contains("'ID Resposta'"));
    }
}
