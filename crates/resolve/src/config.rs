use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::split::SplitPolicy;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    pub matching: MatchPolicy,
    pub split: SplitPolicy,
    pub columns: ColumnsConfig,
    pub reference: ReferenceConfig,
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Similarity acceptance band.
///
/// A similarity candidate at or above `accept_threshold` resolves directly;
/// one in `[ambiguous_threshold, accept_threshold)` is reported as ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MatchPolicy {
    pub ambiguous_threshold: f64,
    pub accept_threshold: f64,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            ambiguous_threshold: 0.85,
            accept_threshold: 0.999,
        }
    }
}

// ---------------------------------------------------------------------------
// Columns (batch table)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    /// Explicit name-bearing columns. When empty, columns are detected.
    pub names: Vec<String>,
    /// Header substring marking a name-bearing column (accent/case-insensitive).
    pub detect_pattern: String,
    /// Prefix of companion identifier columns; also excluded from detection.
    pub id_prefix: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            detect_pattern: "porta".into(),
            id_prefix: "ID ".into(),
        }
    }
}

impl ColumnsConfig {
    pub fn id_column_for(&self, column: &str) -> String {
        format!("{}{column}", self.id_prefix)
    }
}

// ---------------------------------------------------------------------------
// Reference table
// ---------------------------------------------------------------------------

/// Header labels searched in the reference table, first present wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    pub id_columns: Vec<String>,
    pub name_columns: Vec<String>,
    /// Optional columns holding extra aliases (split like batch cells).
    pub alias_columns: Vec<String>,
    pub group_column: Option<String>,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            id_columns: vec!["ID Resposta".into(), "ID_Porta_Voz".into(), "ID".into()],
            name_columns: vec!["Resposta".into(), "Porta_Voz".into(), "Nome".into()],
            alias_columns: vec!["Apelidos".into()],
            group_column: Some("Coluna/Opção Adicional".into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Overwrite the input file instead of writing a timestamped copy.
    pub in_place: bool,
    /// Explicit report path. Defaults to a timestamped file next to the input.
    pub report: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ResolveConfig {
    pub fn from_toml(input: &str) -> Result<Self, ResolveError> {
        let config: ResolveConfig =
            toml::from_str(input).map_err(|e| ResolveError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ResolveError> {
        let m = &self.matching;
        if !(m.ambiguous_threshold > 0.0 && m.ambiguous_threshold <= 1.0) {
            return Err(ResolveError::ConfigValidation(format!(
                "ambiguous_threshold must be in (0, 1], got {}",
                m.ambiguous_threshold
            )));
        }
        if !(m.accept_threshold > 0.0 && m.accept_threshold <= 1.0) {
            return Err(ResolveError::ConfigValidation(format!(
                "accept_threshold must be in (0, 1], got {}",
                m.accept_threshold
            )));
        }
        if m.ambiguous_threshold > m.accept_threshold {
            return Err(ResolveError::ConfigValidation(format!(
                "ambiguous_threshold ({}) must not exceed accept_threshold ({})",
                m.ambiguous_threshold, m.accept_threshold
            )));
        }

        if self.split.join_with.is_empty() {
            return Err(ResolveError::ConfigValidation(
                "split.join_with must not be empty".into(),
            ));
        }

        if self.reference.id_columns.is_empty() {
            return Err(ResolveError::ConfigValidation(
                "reference.id_columns must list at least one label".into(),
            ));
        }
        if self.reference.name_columns.is_empty() {
            return Err(ResolveError::ConfigValidation(
                "reference.name_columns must list at least one label".into(),
            ));
        }

        if self.columns.names.is_empty() && self.columns.detect_pattern.trim().is_empty() {
            return Err(ResolveError::ConfigValidation(
                "columns.detect_pattern must not be empty when columns.names is unset".into(),
            ));
        }

        // An empty prefix would make every companion column its own name column.
        if self.columns.id_prefix.trim().is_empty() {
            return Err(ResolveError::ConfigValidation(
                "columns.id_prefix must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Default configuration rendered as TOML.
    pub fn default_toml() -> &'static str {
        DEFAULT_TOML
    }
}

const DEFAULT_TOML: &str = r#"[matching]
ambiguous_threshold = 0.85
accept_threshold = 0.999

[split]
delimiters = [",", ";", "|", "\n"]
conjunctions = ["e", "and", "&"]
join_with = ", "

[columns]
names = []
detect_pattern = "porta"
id_prefix = "ID "

[reference]
id_columns = ["ID Resposta", "ID_Porta_Voz", "ID"]
name_columns = ["Resposta", "Porta_Voz", "Nome"]
alias_columns = ["Apelidos"]
group_column = "Coluna/Opção Adicional"

[output]
in_place = false
"#;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
