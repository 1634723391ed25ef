use std::fmt;

/// Which input requirement a configuration error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// A column holding canonical identifiers (reference table).
    IdentifierColumn,
    /// A column holding names (reference table or batch table).
    NameColumn,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentifierColumn => write!(f, "identifier column"),
            Self::NameColumn => write!(f, "name column"),
        }
    }
}

#[derive(Debug)]
pub enum ResolveError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (threshold out of range, empty separator, etc.).
    ConfigValidation(String),
    /// Fatal: a required column is missing or unusable.
    Configuration { requirement: Requirement, detail: String },
    /// IO error (file read, write, unsupported format).
    Io(String),
}

impl ResolveError {
    pub fn missing_identifiers(detail: impl Into<String>) -> Self {
        Self::Configuration {
            requirement: Requirement::IdentifierColumn,
            detail: detail.into(),
        }
    }

    pub fn missing_names(detail: impl Into<String>) -> Self {
        Self::Configuration {
            requirement: Requirement::NameColumn,
            detail: detail.into(),
        }
    }

    /// The unmet requirement, if this is a configuration error.
    pub fn requirement(&self) -> Option<Requirement> {
        match self {
            Self::Configuration { requirement, .. } => Some(*requirement),
            _ => None,
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Configuration { requirement, detail } => {
                write!(f, "configuration error: no usable {requirement}: {detail}")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ResolveError {}
