use std::fmt;

use serde::Serialize;

use crate::config::MatchPolicy;

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// A similarity candidate for an unresolved name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub identifier: String,
    pub alias: String,
    /// Reference group of the identifier (e.g. "Porta-vozes iFood"), when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    /// Exact key match (score 1.0) or a single candidate at the accept threshold.
    Resolved { identifier: String, score: f64 },
    NotFound,
    /// Candidates within the ambiguous band, best first.
    Ambiguous(Vec<Candidate>),
}

impl ResolutionOutcome {
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Resolved { identifier, .. } => Some(identifier),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Reconciliation records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    NotFound,
    Ambiguous,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Ambiguous => write!(f, "ambiguous"),
        }
    }
}

/// One unresolved or ambiguous name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationRecord {
    /// 0-based data row (header excluded).
    pub row: usize,
    pub column: String,
    pub name: String,
    pub kind: OutcomeKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolveSummary {
    pub rows: usize,
    pub cells_scanned: usize,
    pub names_total: usize,
    pub resolved_exact: usize,
    pub resolved_similar: usize,
    pub not_found: usize,
    pub ambiguous: usize,
    pub malformed_cells: usize,
    pub collision_keys: usize,
}

impl ResolveSummary {
    pub fn resolved(&self) -> usize {
        self.resolved_exact + self.resolved_similar
    }

    pub fn unresolved(&self) -> usize {
        self.not_found + self.ambiguous
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveMeta {
    pub engine_version: String,
    pub run_at: String,
    pub name_columns: Vec<String>,
    pub matching: MatchPolicy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveResult {
    pub meta: ResolveMeta,
    pub summary: ResolveSummary,
    pub records: Vec<ReconciliationRecord>,
    pub collisions: Vec<String>,
}
